use glam::{Mat4, Vec2, Vec3};

use crate::config::{CAMERA_FAR, CAMERA_FOV_DEGREES, CAMERA_NEAR, CAMERA_Z};

/// Output surface size and the fixed perspective camera looking down -z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// World-space height visible at the origin plane.
    pub fn visible_height(&self) -> f32 {
        2.0 * (CAMERA_FOV_DEGREES.to_radians() / 2.0).tan() * CAMERA_Z
    }

    /// Convert a page scroll offset in pixels to a world-space vertical shift.
    pub fn scroll_to_world(&self, scroll_px: f32) -> f32 {
        scroll_px * self.visible_height() / self.height as f32
    }

    /// Map a cursor position in physical pixels to [-1, 1] with y up.
    pub fn normalize_cursor(&self, x: f64, y: f64) -> Vec2 {
        Vec2::new(
            (x / self.width as f64) as f32 * 2.0 - 1.0,
            -((y / self.height as f64) as f32 * 2.0 - 1.0),
        )
    }

    pub fn view_proj(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(
            CAMERA_FOV_DEGREES.to_radians(),
            self.aspect(),
            CAMERA_NEAR,
            CAMERA_FAR,
        );
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, CAMERA_Z), Vec3::ZERO, Vec3::Y);
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_cursor_corners() {
        let viewport = Viewport::new(800, 600);
        assert_eq!(viewport.normalize_cursor(0.0, 0.0), Vec2::new(-1.0, 1.0));
        assert_eq!(viewport.normalize_cursor(800.0, 600.0), Vec2::new(1.0, -1.0));
        assert_eq!(viewport.normalize_cursor(400.0, 300.0), Vec2::ZERO);
    }

    #[test]
    fn test_scroll_of_one_screen_is_visible_height() {
        let viewport = Viewport::new(800, 600);
        let shift = viewport.scroll_to_world(600.0);
        assert!((shift - viewport.visible_height()).abs() < 1e-4);
    }

    #[test]
    fn test_visible_height_at_camera_distance() {
        let viewport = Viewport::new(800, 600);
        // 2 * tan(37.5°) * 35
        assert!((viewport.visible_height() - 53.71).abs() < 0.01);
    }

    #[test]
    fn test_origin_projects_to_center() {
        let viewport = Viewport::new(1280, 800);
        let clip = viewport.view_proj() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((clip.x / clip.w).abs() < 1e-6);
        assert!((clip.y / clip.w).abs() < 1e-6);
    }

    #[test]
    fn test_zero_size_is_clamped() {
        let viewport = Viewport::new(0, 0);
        assert_eq!(viewport.aspect(), 1.0);
    }
}
