use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use glam::Mat4;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::coords::Viewport;
use crate::device::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
use crate::paint::Color;
use crate::submit::SubmitJob;

use super::{
    Font, FontStore, FrameStatus, Quad, QuadSink, RenderBackend, RenderCtx, SpriteRenderer, Texture,
    TextureStore, projection,
};

const CLEAR_COLOR: Color = Color::rgba(0.05, 0.05, 0.08, 1.0);

/// `RenderBackend` on top of wgpu.
///
/// Recording happens on the loop thread inside `end_frame`; the returned job
/// owns the command buffer and surface texture, submits them, waits for the
/// device to finish and presents. The job only holds clones of the queue and
/// device, so it can run on a worker thread.
pub struct WgpuBackend {
    gpu: Gpu,
    sprites: SpriteRenderer,
    textures: TextureStore,
    fonts: FontStore,

    /// Logical size of the view at scale 1. Follows the window when no
    /// fixed target resolution is set.
    logical_size: Viewport,
    follow_window: bool,

    view: Mat4,
    scale: f32,

    quads: Vec<Quad>,
    frame: Option<GpuFrame>,
}

impl WgpuBackend {
    /// Creates the backend for `window`. `target` is the fixed logical
    /// resolution, if any.
    pub fn new(window: Arc<Window>, target: Option<Viewport>, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        let gpu = pollster::block_on(Gpu::new(window, init)).context("GPU initialization failed")?;
        let sprites = SpriteRenderer::new(gpu.device(), gpu.surface_format());

        let mut textures = TextureStore::new();
        textures.upload(gpu.device(), gpu.queue(), sprites.texture_layout(), sprites.sampler());

        log::info!(
            "wgpu backend ready: surface {:?}, {}x{}",
            gpu.surface_format(),
            size.width,
            size.height
        );

        Ok(Self {
            gpu,
            sprites,
            textures,
            fonts: FontStore::new(),
            logical_size: target.unwrap_or(Viewport::from_pixels(size.width, size.height)),
            follow_window: target.is_none(),
            view: Mat4::IDENTITY,
            scale: 1.0,
            quads: Vec::new(),
            frame: None,
        })
    }

    pub fn logical_size(&self) -> Viewport {
        self.logical_size
    }
}

impl QuadSink for WgpuBackend {
    fn record_quad(&mut self, quad: Quad) {
        if self.frame.is_some() {
            self.quads.push(quad);
        }
    }
}

impl RenderBackend for WgpuBackend {
    fn supports_deferred_submission(&self) -> bool {
        true
    }

    fn load_font(&mut self, path: &Path) -> Result<Font> {
        self.fonts.load(path)
    }

    fn load_texture(&mut self, path: &Path) -> Result<Texture> {
        self.textures.load(path)
    }

    fn finish_resource_load(&mut self) -> Result<()> {
        let count = self.textures.pending_uploads();
        self.textures.upload(
            self.gpu.device(),
            self.gpu.queue(),
            self.sprites.texture_layout(),
            self.sprites.sampler(),
        );
        log::info!("uploaded {count} texture(s)");
        Ok(())
    }

    fn commit_view(&mut self, view: Mat4, scale: f32) {
        self.view = view;
        self.scale = scale;
    }

    fn framebuffer_resized(&mut self, width: u32, height: u32) -> Result<()> {
        anyhow::ensure!(self.frame.is_none(), "resize while a frame is being recorded");
        self.gpu.resize(PhysicalSize::new(width, height));
        if self.follow_window && width > 0 && height > 0 {
            self.logical_size = Viewport::from_pixels(width, height);
        }
        Ok(())
    }

    fn begin_frame(&mut self) -> Result<FrameStatus> {
        anyhow::ensure!(self.frame.is_none(), "begin_frame while a frame is open");
        self.quads.clear();

        if !self.gpu.has_area() {
            return Ok(FrameStatus::Skipped);
        }

        match self.gpu.begin_frame() {
            Ok(frame) => {
                self.frame = Some(frame);
                Ok(FrameStatus::Ready)
            }
            Err(err) => match self.gpu.handle_surface_error(err.clone()) {
                SurfaceErrorAction::Fatal => bail!("surface acquisition failed fatally: {err}"),
                action => {
                    log::debug!("surface unavailable ({err}); {action:?}");
                    Ok(FrameStatus::Skipped)
                }
            },
        }
    }

    fn end_frame(&mut self) -> Result<SubmitJob> {
        let Some(frame) = self.frame.take() else {
            bail!("end_frame without an open frame");
        };
        let GpuFrame {
            surface_texture,
            view,
            mut encoder,
        } = frame;

        let mut ctx = RenderCtx {
            device: self.gpu.device(),
            queue: self.gpu.queue(),
            encoder: &mut encoder,
            color_view: &view,
            view_proj: projection(self.logical_size, self.scale) * self.view,
            clear: CLEAR_COLOR,
        };
        self.sprites.render(&mut ctx, &self.quads, &self.textures);
        let commands = encoder.finish();
        drop(view);
        self.quads.clear();

        let device = self.gpu.device().clone();
        let queue = self.gpu.queue().clone();

        Ok(Box::new(move || {
            let index = queue.submit(std::iter::once(commands));
            device
                .poll(wgpu::PollType::Wait {
                    submission_index: Some(index),
                    timeout: None,
                })
                .context("waiting for frame submission")?;
            surface_texture.present();
            Ok(())
        }))
    }
}
