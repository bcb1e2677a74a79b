/// Straight-alpha RGBA tint, multiplied with the sampled texel in the sprite shader.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    /// Highlight applied to an interactive element under the pointer.
    pub const HOVER_GRAY: Color = Color::rgba(0.5, 0.5, 0.5, 1.0);

    /// Highlight applied to an interactive element while it is being dragged.
    pub const DRAG_YELLOW: Color = Color::rgba(0.8, 0.8, 0.2, 1.0);

    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}
