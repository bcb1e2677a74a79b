use glam::{Mat4, Vec3};

use crate::coords::{Rect, Viewport};

/// Maps the unit square onto `rect`, rotated by `rotation_degrees` about the
/// rect centre (clockwise on screen), at `depth`.
pub fn model_matrix(rect: Rect, rotation_degrees: f32, depth: f32) -> Mat4 {
    let c = rect.center();
    Mat4::from_translation(Vec3::new(c.x, c.y, depth))
        * Mat4::from_rotation_z(rotation_degrees.to_radians())
        * Mat4::from_scale(Vec3::new(rect.size.x, rect.size.y, 1.0))
        * Mat4::from_translation(Vec3::new(-0.5, -0.5, 0.0))
}

/// Orthographic projection over the logical view size times the zoom scale.
///
/// Top-left of the view maps to NDC (-1, 1). Depths within +-1000 stay inside
/// the clip volume.
pub fn projection(view_size: Viewport, scale: f32) -> Mat4 {
    let w = (view_size.width * scale).max(1.0);
    let h = (view_size.height * scale).max(1.0);
    Mat4::orthographic_rh(0.0, w, h, 0.0, -1000.0, 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn apply(m: Mat4, x: f32, y: f32) -> (f32, f32) {
        let p = m.transform_point3(Vec3::new(x, y, 0.0));
        (p.x, p.y)
    }

    #[test]
    fn unrotated_quad_covers_rect() {
        let m = model_matrix(Rect::new(10.0, 20.0, 4.0, 2.0), 0.0, 0.0);
        let (x0, y0) = apply(m, 0.0, 0.0);
        let (x1, y1) = apply(m, 1.0, 1.0);
        assert_abs_diff_eq!(x0, 10.0, epsilon = 1e-5);
        assert_abs_diff_eq!(y0, 20.0, epsilon = 1e-5);
        assert_abs_diff_eq!(x1, 14.0, epsilon = 1e-5);
        assert_abs_diff_eq!(y1, 22.0, epsilon = 1e-5);
    }

    #[test]
    fn rotation_is_about_the_centre() {
        let m = model_matrix(Rect::new(10.0, 20.0, 4.0, 2.0), 90.0, 0.0);
        let (cx, cy) = apply(m, 0.5, 0.5);
        assert_abs_diff_eq!(cx, 12.0, epsilon = 1e-4);
        assert_abs_diff_eq!(cy, 21.0, epsilon = 1e-4);

        // Top-left corner (-2, -1) from the centre turns to (1, -2).
        let (x, y) = apply(m, 0.0, 0.0);
        assert_abs_diff_eq!(x, 13.0, epsilon = 1e-4);
        assert_abs_diff_eq!(y, 19.0, epsilon = 1e-4);
    }

    #[test]
    fn depth_lands_in_translation() {
        let m = model_matrix(Rect::new(0.0, 0.0, 1.0, 1.0), 0.0, 3.5);
        assert_eq!(m.w_axis.z, 3.5);
    }

    #[test]
    fn projection_maps_view_corners_to_ndc() {
        let p = projection(Viewport::new(800.0, 600.0), 2.0);
        let (x0, y0) = apply(p, 0.0, 0.0);
        let (x1, y1) = apply(p, 1600.0, 1200.0);
        assert_abs_diff_eq!(x0, -1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(y0, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(x1, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(y1, -1.0, epsilon = 1e-5);
    }
}
