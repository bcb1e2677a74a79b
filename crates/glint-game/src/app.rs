//! The application loop.
//!
//! One iteration is `pre_update` → `update` → `post_update` → `draw`:
//! - `pre_update` pumps the platform (the only place input is written) and
//!   fires edge-triggered actions
//! - `update` moves the camera from held keys and updates the level
//! - `post_update` commits the view to the backend, rotates input and
//!   advances the timer
//! - `draw` records the level through the submission gate
//!
//! A deferred submission of frame N may still be running while frame N+1 is
//! simulated. It is always retired before the next frame is recorded, before a
//! resize reaches the backend and before the loop is torn down.

use std::time::Instant;

use anyhow::{Context, Result};

use glint_engine::camera::Camera;
use glint_engine::coords::{CoordinateCorrector, Vec2, Viewport};
use glint_engine::input::InputState;
use glint_engine::render::{FrameStatus, RenderBackend};
use glint_engine::submit::SubmissionGate;
use glint_engine::time::{Clock, FrameTimer, SystemClock};
use glint_engine::window::Platform;

use crate::assets::Assets;
use crate::controls::{Action, Controls};
use crate::scene::{Element, Level};
use crate::settings::{CameraSettings, DebugSettings, Settings};

/// Why a frame was not drawn. None of these are errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The window is minimised.
    ZeroArea,
    /// The previous submission is still running and the busy policy is `skip`.
    Busy,
    /// The surface could not provide a frame this time.
    Surface,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    Drawn,
    Skipped(SkipReason),
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub updates: u64,
    pub frames_drawn: u64,
    pub skipped_busy: u64,
    pub skipped_zero_area: u64,
    pub skipped_surface: u64,
}

pub struct App<P: Platform, R: RenderBackend> {
    // Dropped first: joins any outstanding submission before the backend goes away.
    gate: SubmissionGate,
    backend: R,
    platform: P,

    input: InputState,
    controls: Controls,
    timer: FrameTimer,

    camera: Camera,
    camera_settings: CameraSettings,
    corrector: CoordinateCorrector,
    /// Framebuffer size in physical pixels.
    window: Viewport,

    level: Level,
    debug: DebugSettings,
    stats: FrameStats,
}

impl<P: Platform, R: RenderBackend> App<P, R> {
    pub fn new(platform: P, backend: R, settings: &Settings) -> Result<Self> {
        Self::with_clock(platform, backend, settings, Box::new(SystemClock))
    }

    /// Builds the loop with an explicit time source.
    ///
    /// Loads the level's assets through `backend`; any failure is fatal.
    pub fn with_clock(
        platform: P,
        mut backend: R,
        settings: &Settings,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        let assets = Assets::load(&mut backend, settings).context("failed to load assets")?;
        let level = Level::new(&settings.level, &assets, settings.debug.show_mirror_points)
            .context("failed to build level")?;

        let (width, height) = platform.window_size();
        let window = Viewport::from_pixels(width, height);
        let target = settings.target.viewport();
        let corrector = CoordinateCorrector::new(target);

        let cam = settings.camera;
        let mut camera = Camera::new(target.unwrap_or(window)).with_scale_limits(cam.min_scale, cam.max_scale);
        camera.set_scale(cam.initial_scale);
        camera.set_bounds(level.map_rect());
        camera.look_at(level.map_rect().center());
        camera.update();

        let strategy = settings
            .render
            .submission
            .select(backend.supports_deferred_submission());
        let gate = SubmissionGate::new(strategy, settings.render.busy_policy);
        log::info!(
            "submission: {} (busy policy {:?})",
            gate.strategy_name(),
            gate.policy()
        );

        Ok(Self {
            gate,
            backend,
            platform,
            input: InputState::new(),
            controls: Controls::new(settings.controls.clone()),
            timer: FrameTimer::with_clock(clock),
            camera,
            camera_settings: cam,
            corrector,
            window,
            level,
            debug: settings.debug,
            stats: FrameStats::default(),
        })
    }

    /// Runs until the platform reports a close request, then retires the last submission.
    pub fn run(&mut self) -> Result<()> {
        log::info!("entering main loop");
        while !self.platform.should_close() {
            if let Err(e) = self.iterate() {
                log::error!("main loop failed: {e:#}");
                return Err(e);
            }
        }
        self.gate.retire()?;
        log::info!(
            "main loop finished after {} update(s), {} frame(s) drawn",
            self.stats.updates,
            self.stats.frames_drawn
        );
        Ok(())
    }

    /// One loop iteration: exactly one update, and one draw attempt.
    pub fn iterate(&mut self) -> Result<DrawOutcome> {
        let started = Instant::now();
        self.pre_update()?;
        self.update();
        self.post_update();
        let updated = Instant::now();

        let outcome = self.draw()?;

        if self.debug.log_frame_timing {
            log::trace!(
                "update {}us, draw {}us ({:?})",
                updated.duration_since(started).as_micros(),
                updated.elapsed().as_micros(),
                outcome
            );
        }
        Ok(outcome)
    }

    /// Polls the platform and fires press-edge actions.
    pub fn pre_update(&mut self) -> Result<()> {
        let polled = self
            .platform
            .poll_events(&mut self.input)
            .context("window system error")?;
        if let Some((width, height)) = polled.resized {
            self.resize(width, height)?;
        }

        let pointer = self.pointer_in_view();
        self.controls.update(&self.input, pointer, self.camera.offset());

        if self.controls.pressed(Action::ToggleFullscreen) {
            self.platform.toggle_fullscreen();
        }
        if self.controls.pressed(Action::Quit) {
            log::info!("quit requested");
            self.platform.request_close();
        }
        Ok(())
    }

    /// Applies held camera controls scaled by the previous frame's duration,
    /// then updates the level against the new view.
    pub fn update(&mut self) {
        let dt = self.timer.frame_elapsed_secs();
        let cam = self.camera_settings;

        let mut direction = Vec2::zero();
        if self.controls.held(Action::PanUp) {
            direction.y -= 1.0;
        }
        if self.controls.held(Action::PanDown) {
            direction.y += 1.0;
        }
        if self.controls.held(Action::PanLeft) {
            direction.x -= 1.0;
        }
        if self.controls.held(Action::PanRight) {
            direction.x += 1.0;
        }

        let mut zoom = 0.0;
        if self.controls.held(Action::ZoomOut) {
            zoom += cam.zoom_speed * dt;
        }
        if self.controls.held(Action::ZoomIn) {
            zoom -= cam.zoom_speed * dt;
        }
        zoom -= self.controls.scroll() * cam.wheel_zoom_step;

        if zoom != 0.0 {
            self.camera.set_scale(self.camera.scale() + zoom);
        }
        let pan = direction * (cam.pan_speed * self.camera.scale() * dt);
        if zoom != 0.0 || pan != Vec2::zero() {
            self.camera.look_at(self.camera.target() + pan);
        }
        self.camera.update();

        self.level
            .update(self.camera.view_rect(), &self.controls, &self.timer);
    }

    /// Commits the view, rotates input buffers and advances the timer.
    pub fn post_update(&mut self) {
        self.backend
            .commit_view(self.camera.view_matrix(), self.camera.scale());
        self.input.end_frame();
        self.timer.update();
        self.stats.updates += 1;
    }

    /// Records and submits one frame, unless there is nothing to draw into or
    /// the busy policy says to skip.
    pub fn draw(&mut self) -> Result<DrawOutcome> {
        if !self.window.has_area() {
            self.stats.skipped_zero_area += 1;
            return Ok(DrawOutcome::Skipped(SkipReason::ZeroArea));
        }

        let Some(ticket) = self.gate.acquire()? else {
            self.stats.skipped_busy += 1;
            log::debug!("previous submission still running; frame skipped");
            return Ok(DrawOutcome::Skipped(SkipReason::Busy));
        };

        match self.backend.begin_frame() {
            Ok(FrameStatus::Ready) => {}
            Ok(FrameStatus::Skipped) => {
                self.gate.cancel(ticket)?;
                self.stats.skipped_surface += 1;
                return Ok(DrawOutcome::Skipped(SkipReason::Surface));
            }
            Err(e) => {
                self.gate.cancel(ticket)?;
                return Err(e.context("failed to begin frame"));
            }
        }

        self.level.draw(&mut self.backend);

        let job = match self.backend.end_frame() {
            Ok(job) => job,
            Err(e) => {
                self.gate.cancel(ticket)?;
                return Err(e.context("failed to end frame"));
            }
        };
        self.gate.submit(ticket, job)?;
        self.stats.frames_drawn += 1;
        Ok(DrawOutcome::Drawn)
    }

    /// Handles a framebuffer resize in physical pixels.
    ///
    /// A zero-area size suspends drawing; updates keep running.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.gate.retire()?;
        self.window = Viewport::from_pixels(width, height);
        log::debug!("framebuffer resized to {width}x{height}");

        if !self.window.has_area() {
            return Ok(());
        }
        if self.corrector.target().is_none() {
            self.camera.set_view_size(self.window);
            self.camera.update();
        }
        self.backend
            .framebuffer_resized(width, height)
            .context("failed to resize framebuffer")
    }

    /// Maps a window-pixel position into logical target space.
    pub fn corrected_pos(&self, pos: Vec2) -> Vec2 {
        self.corrector.correct(pos, self.window, self.camera.scale())
    }

    /// Cursor relative to the top-left of the view, in world units.
    fn pointer_in_view(&self) -> Vec2 {
        let corrected = self.corrected_pos(self.input.cursor());
        match self.corrector.target() {
            Some(_) => corrected,
            None => corrected * self.camera.scale(),
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn backend(&self) -> &R {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut R {
        &mut self.backend
    }

    pub fn is_submission_outstanding(&self) -> bool {
        self.gate.is_outstanding()
    }

    pub fn is_submission_busy(&self) -> bool {
        self.gate.is_busy()
    }
}
