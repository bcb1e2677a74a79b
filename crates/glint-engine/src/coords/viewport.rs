use super::Vec2;

/// Size of a drawable area.
///
/// Used both for the fixed target resolution (logical pixels) and for the
/// window framebuffer (physical pixels); the owner decides which.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }

    /// A minimised window reports a zero-area viewport; nothing may be drawn into it.
    #[inline]
    pub fn has_area(self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    #[inline]
    pub fn size(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}
