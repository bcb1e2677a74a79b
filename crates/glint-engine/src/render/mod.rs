//! Rendering.
//!
//! The game talks to a `RenderBackend`: it records textured quads between
//! `begin_frame` and `end_frame`, and gets back a job that submits the frame.
//! `WgpuBackend` is the GPU implementation.
//!
//! Convention:
//! - quad geometry is a unit square transformed by a model matrix into world
//!   space (logical pixels, top-left origin, +Y down)
//! - the vertex shader applies projection * view from the last committed view

mod backend;
mod ctx;
mod fonts;
mod sprite;
mod textures;
mod transform;
mod wgpu_backend;

pub use backend::{Font, FontId, FrameStatus, Quad, QuadSink, RenderBackend, Texture, TextureId};
pub use ctx::RenderCtx;
pub use fonts::FontStore;
pub use sprite::SpriteRenderer;
pub use textures::TextureStore;
pub use transform::{model_matrix, projection};
pub use wgpu_backend::WgpuBackend;
