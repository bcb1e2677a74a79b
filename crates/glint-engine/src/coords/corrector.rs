use super::{Vec2, Viewport};

/// Maps raw window-space pointer positions into the logical target space.
///
/// With a fixed target resolution, each axis is scaled by
/// `target * zoom / window`, so widgets laid out in logical pixels keep
/// responding to the same spots whatever the real window size. Without one the
/// mapping is the identity.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct CoordinateCorrector {
    target: Option<Viewport>,
}

impl CoordinateCorrector {
    pub const fn new(target: Option<Viewport>) -> Self {
        Self { target }
    }

    pub const fn identity() -> Self {
        Self { target: None }
    }

    pub fn target(&self) -> Option<Viewport> {
        self.target
    }

    /// Corrects `pos` (window pixels) for the current window size and camera zoom.
    ///
    /// A zero-area window has no meaningful mapping; `pos` is returned unchanged.
    pub fn correct(&self, pos: Vec2, window: Viewport, zoom: f32) -> Vec2 {
        match self.target {
            Some(target) if window.has_area() => Vec2::new(
                pos.x * (target.width * zoom / window.width),
                pos.y * (target.height * zoom / window.height),
            ),
            _ => pos,
        }
    }
}
