//! 2D camera.
//!
//! The camera looks at a `target` point in world space (logical pixels). The
//! visible region is `view_size * scale` centred on the target, so a larger
//! scale shows more of the world ("zoomed out").

use glam::{Mat4, Vec3};

use crate::coords::{Rect, Vec2, Viewport};

pub const DEFAULT_MIN_SCALE: f32 = 0.25;
pub const DEFAULT_MAX_SCALE: f32 = 4.0;

#[derive(Debug, Clone)]
pub struct Camera {
    target: Vec2,
    scale: f32,
    min_scale: f32,
    max_scale: f32,
    view_size: Viewport,
    bounds: Option<Rect>,
    view: Mat4,
}

impl Camera {
    pub fn new(view_size: Viewport) -> Self {
        let mut camera = Self {
            target: view_size.size() * 0.5,
            scale: 1.0,
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            view_size,
            bounds: None,
            view: Mat4::IDENTITY,
        };
        camera.update();
        camera
    }

    /// Sets the allowed scale range. `min` and `max` are swapped if given in reverse.
    pub fn with_scale_limits(mut self, min: f32, max: f32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.min_scale = min.max(f32::EPSILON);
        self.max_scale = max.max(self.min_scale);
        self.scale = self.scale.clamp(self.min_scale, self.max_scale);
        self
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn view_size(&self) -> Viewport {
        self.view_size
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Restricts the camera to `bounds` (usually the map rect). Empty bounds disable clamping.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = if bounds.is_empty() { None } else { Some(bounds) };
        self.look_at(self.target);
    }

    pub fn set_view_size(&mut self, view_size: Viewport) {
        self.view_size = view_size;
        self.look_at(self.target);
    }

    pub fn set_scale(&mut self, scale: f32) {
        if scale.is_finite() {
            self.scale = scale.clamp(self.min_scale, self.max_scale);
        }
    }

    /// Moves the target, clamped so the visible region stays inside the bounds.
    ///
    /// On an axis where the visible region is larger than the bounds the
    /// camera centres on the bounds instead.
    pub fn look_at(&mut self, target: Vec2) {
        if !target.is_finite() {
            return;
        }
        let Some(bounds) = self.bounds else {
            self.target = target;
            return;
        };

        let half = self.visible_size() * 0.5;
        let center = bounds.center();
        let min = bounds.min();
        let max = bounds.max();

        let clamp_axis = |t: f32, half: f32, lo: f32, hi: f32, c: f32| {
            if hi - lo <= half * 2.0 {
                c
            } else {
                t.clamp(lo + half, hi - half)
            }
        };

        self.target = Vec2::new(
            clamp_axis(target.x, half.x, min.x, max.x, center.x),
            clamp_axis(target.y, half.y, min.y, max.y, center.y),
        );
    }

    /// Recomputes the cached view matrix from target and scale.
    pub fn update(&mut self) {
        let offset = self.offset();
        self.view = Mat4::from_translation(Vec3::new(-offset.x, -offset.y, 0.0));
    }

    /// World-space size of the visible region.
    pub fn visible_size(&self) -> Vec2 {
        self.view_size.size() * self.scale
    }

    /// World-space rect currently in view.
    pub fn view_rect(&self) -> Rect {
        Rect::from_center(self.target, self.visible_size())
    }

    /// World position of the top-left corner of the view.
    pub fn offset(&self) -> Vec2 {
        self.view_rect().origin
    }

    /// View matrix as of the last `update`.
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }
}
