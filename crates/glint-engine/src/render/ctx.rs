use glam::Mat4;

use crate::paint::Color;

/// One frame's worth of GPU handles and view state for a sprite pass.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    /// World to clip space.
    pub view_proj: Mat4,
    pub clear: Color,
}
