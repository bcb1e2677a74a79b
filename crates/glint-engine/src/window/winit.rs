use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Fullscreen, Window, WindowId};

use crate::input::InputState;
use crate::input::platform::winit::translate_window_event;

use super::{Platform, Polled, WindowConfig};

/// How many startup pumps to wait for the platform to deliver `resumed`.
const STARTUP_PUMPS: usize = 200;
const STARTUP_PUMP_TIMEOUT: Duration = Duration::from_millis(5);

/// `Platform` backed by a winit event loop that is pumped once per frame.
pub struct WinitPlatform {
    event_loop: EventLoop<()>,
    window: Arc<Window>,
    aspect: Option<f32>,
    fullscreen: bool,
    close_requested: bool,
}

impl WinitPlatform {
    /// Creates the event loop and the window. Any failure here is fatal.
    pub fn new(config: WindowConfig) -> Result<Self> {
        let mut event_loop = EventLoop::new().context("failed to create winit EventLoop")?;

        let mut boot = Bootstrap {
            config: &config,
            window: None,
            error: None,
        };

        for _ in 0..STARTUP_PUMPS {
            let status = event_loop.pump_app_events(Some(STARTUP_PUMP_TIMEOUT), &mut boot);
            if let Some(err) = boot.error.take() {
                return Err(err);
            }
            if let PumpStatus::Exit(code) = status {
                bail!("event loop exited during startup (code {code})");
            }
            if boot.window.is_some() {
                break;
            }
        }

        let window = boot
            .window
            .context("window system never became ready to create a window")?;

        let size = window.inner_size();
        log::info!(
            "window created: \"{}\" {}x{} (scale factor {})",
            config.title,
            size.width,
            size.height,
            window.scale_factor()
        );

        Ok(Self {
            event_loop,
            window,
            aspect: config.fixed_aspect.then(|| config.aspect()).flatten(),
            fullscreen: false,
            close_requested: false,
        })
    }

    /// Shared handle to the window, for creating a GPU surface.
    pub fn window(&self) -> Arc<Window> {
        self.window.clone()
    }
}

impl Platform for WinitPlatform {
    fn poll_events(&mut self, input: &mut InputState) -> Result<Polled> {
        let mut handler = PumpHandler {
            window: &self.window,
            input,
            aspect: if self.fullscreen { None } else { self.aspect },
            polled: Polled::default(),
            close_requested: false,
        };

        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut handler);

        let polled = handler.polled;
        if handler.close_requested {
            self.close_requested = true;
        }

        match status {
            PumpStatus::Continue => {}
            PumpStatus::Exit(0) => self.close_requested = true,
            PumpStatus::Exit(code) => bail!("window system reported an error (exit code {code})"),
        }

        Ok(polled)
    }

    fn window_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
        self.window
            .set_fullscreen(self.fullscreen.then_some(Fullscreen::Borderless(None)));
        log::debug!("fullscreen: {}", self.fullscreen);
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn request_close(&mut self) {
        self.close_requested = true;
    }

    fn should_close(&self) -> bool {
        self.close_requested
    }
}

/// Handler used only until the window exists.
struct Bootstrap<'a> {
    config: &'a WindowConfig,
    window: Option<Arc<Window>>,
    error: Option<anyhow::Error>,
}

impl ApplicationHandler for Bootstrap<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.width.max(1) as f64,
                self.config.height.max(1) as f64,
            ));

        match event_loop.create_window(attrs) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => {
                log::error!("failed to create window: {e}");
                self.error = Some(anyhow::Error::new(e).context("failed to create window"));
            }
        }
    }

    fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, _: WindowEvent) {}
}

/// Per-pump handler; borrows the loop's input state for the duration of one poll.
struct PumpHandler<'a> {
    window: &'a Window,
    input: &'a mut InputState,
    aspect: Option<f32>,
    polled: Polled,
    close_requested: bool,
}

impl PumpHandler<'_> {
    fn enforce_aspect(&self, size: PhysicalSize<u32>) {
        let Some(aspect) = self.aspect else { return };
        if size.width == 0 || size.height == 0 {
            return;
        }
        let wanted = (size.width as f32 / aspect).round() as u32;
        if wanted.abs_diff(size.height) > 1 {
            let _ = self
                .window
                .request_inner_size(PhysicalSize::new(size.width, wanted.max(1)));
        }
    }
}

impl ApplicationHandler for PumpHandler<'_> {
    fn resumed(&mut self, _: &ActiveEventLoop) {}

    fn window_event(&mut self, _: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if window_id != self.window.id() {
            return;
        }

        match &event {
            WindowEvent::CloseRequested => self.close_requested = true,
            WindowEvent::Resized(size) => {
                self.polled.resized = Some((size.width, size.height));
                self.enforce_aspect(*size);
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = self.window.inner_size();
                self.polled.resized = Some((size.width, size.height));
            }
            _ => {
                if let Some(ev) = translate_window_event(&event) {
                    self.input.apply_event(ev);
                }
            }
        }
    }
}
