use glint_engine::coords::Rect;
use glint_engine::paint::Color;
use glint_engine::render::{Quad, QuadSink, Texture, model_matrix};

/// A textured rect with rotation, tint and draw depth.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    texture: Texture,
    rect: Rect,
    uv: Rect,
    /// Degrees, about the rect centre.
    rotation: f32,
    tint: Color,
    depth: f32,
    visible: bool,
}

impl Sprite {
    pub fn new(texture: Texture, rect: Rect) -> Self {
        Self {
            texture,
            rect,
            uv: Rect::unit(),
            rotation: 0.0,
            tint: Color::WHITE,
            depth: 0.0,
            visible: true,
        }
    }

    pub fn with_uv(mut self, uv: Rect) -> Self {
        self.uv = uv;
        self
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn texture(&self) -> Texture {
        self.texture
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn uv(&self) -> Rect {
        self.uv
    }

    pub fn set_uv(&mut self, uv: Rect) {
        self.uv = uv;
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
    }

    pub fn tint(&self) -> Color {
        self.tint
    }

    pub fn set_tint(&mut self, tint: Color) {
        self.tint = tint;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Culls against the visible world rect, accounting for rotation.
    pub fn update(&mut self, view: Rect) {
        self.visible = self.rect.rotated_bounds(self.rotation).intersects(view);
    }

    pub fn quad(&self) -> Quad {
        Quad {
            texture: self.texture.id,
            model: model_matrix(self.rect, self.rotation, self.depth),
            uv: self.uv,
            tint: self.tint,
        }
    }

    pub fn draw(&self, sink: &mut dyn QuadSink) {
        if self.visible {
            sink.record_quad(self.quad());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_engine::render::TextureId;

    #[derive(Default)]
    struct Quads(Vec<Quad>);

    impl QuadSink for Quads {
        fn record_quad(&mut self, quad: Quad) {
            self.0.push(quad);
        }
    }

    fn sprite(rect: Rect) -> Sprite {
        let texture = Texture { id: TextureId(3), width: 8, height: 8 };
        Sprite::new(texture, rect)
    }

    #[test]
    fn culled_when_outside_view() {
        let mut s = sprite(Rect::new(500.0, 500.0, 10.0, 10.0));
        s.update(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!(!s.is_visible());

        let mut sink = Quads::default();
        s.draw(&mut sink);
        assert!(sink.0.is_empty());
    }

    #[test]
    fn rotation_can_bring_a_sprite_into_view() {
        // A long thin sprite just below the view; stood upright it reaches into it.
        let view = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut s = sprite(Rect::new(-50.0, 145.0, 200.0, 10.0));
        s.update(view);
        assert!(!s.is_visible());

        s.set_rotation(90.0);
        s.update(view);
        assert!(s.is_visible());
    }

    #[test]
    fn visible_sprite_records_one_quad() {
        let mut s = sprite(Rect::new(10.0, 10.0, 10.0, 10.0)).with_depth(2.0);
        s.set_tint(Color::HOVER_GRAY);
        s.update(Rect::new(0.0, 0.0, 100.0, 100.0));

        let mut sink = Quads::default();
        s.draw(&mut sink);
        assert_eq!(sink.0.len(), 1);
        let q = sink.0[0];
        assert_eq!(q.texture, TextureId(3));
        assert_eq!(q.tint, Color::HOVER_GRAY);
        assert_eq!(q.depth(), 2.0);
    }
}
