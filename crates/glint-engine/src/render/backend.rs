use std::path::Path;

use anyhow::Result;
use glam::Mat4;

use crate::coords::{Rect, Vec2};
use crate::paint::Color;
use crate::submit::SubmitJob;

/// Handle to a texture owned by a backend.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

impl TextureId {
    /// Built-in 1x1 opaque white texture, always available.
    pub const BLANK: TextureId = TextureId(0);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Texture {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub const BLANK: Texture = Texture {
        id: TextureId::BLANK,
        width: 1,
        height: 1,
    };

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// Handle to a font owned by a backend.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct FontId(pub u32);

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Font {
    pub id: FontId,
    /// Design units per em, for scaling font metrics to pixel sizes.
    pub units_per_em: f32,
}

/// One textured quad: the unit square mapped through `model`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quad {
    pub texture: TextureId,
    pub model: Mat4,
    /// Normalized sub-rect of the texture to sample.
    pub uv: Rect,
    pub tint: Color,
}

impl Quad {
    /// Depth stored in the model translation; lower values are drawn first.
    pub fn depth(&self) -> f32 {
        self.model.w_axis.z
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameStatus {
    /// A frame is open for recording.
    Ready,
    /// No frame could be acquired this time; nothing should be recorded.
    Skipped,
}

/// Something quads can be recorded into.
pub trait QuadSink {
    fn record_quad(&mut self, quad: Quad);
}

/// Graphics backend consumed by the game loop.
///
/// A frame goes `begin_frame` → `record_quad`* → `end_frame`. The returned
/// job may run on another thread while the loop simulates the next frame, so
/// `commit_view` must only touch state the job does not own.
pub trait RenderBackend: QuadSink {
    /// Whether `end_frame` jobs may run off the loop thread.
    fn supports_deferred_submission(&self) -> bool;

    /// Loads a TrueType or OpenType font.
    fn load_font(&mut self, path: &Path) -> Result<Font>;

    /// Loads a texture. It becomes drawable after `finish_resource_load`.
    fn load_texture(&mut self, path: &Path) -> Result<Texture>;

    /// Uploads everything loaded since the last call.
    fn finish_resource_load(&mut self) -> Result<()>;

    /// Stores the view matrix and zoom scale used by the next recorded frame.
    fn commit_view(&mut self, view: Mat4, scale: f32);

    /// Reallocates framebuffer-dependent resources. Never called while a
    /// submission is outstanding.
    fn framebuffer_resized(&mut self, width: u32, height: u32) -> Result<()>;

    fn begin_frame(&mut self) -> Result<FrameStatus>;

    /// Closes the frame and returns the job that submits and presents it.
    fn end_frame(&mut self) -> Result<SubmitJob>;
}
