// src/editor/camera.rs

use glam::{Mat4, Vec3};

use super::settings::EditorSettings;

/// What the picking service and the label projection need from a camera.
pub trait Camera {
    fn view_projection(&self) -> Mat4;
    fn position(&self) -> Vec3;
    fn target(&self) -> Vec3;
    /// Recomputes the viewport-derived projection parameters.
    fn set_aspect(&mut self, aspect: f32);
    /// Restores the initial framing.
    fn reset(&mut self);
}

/// Orthographic top-down camera of the plan view, looking down -Z with +Y up.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanCamera {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
    pub zoom: f32,
    pub position: Vec3,
    pub target: Vec3,
    frustum_size: f32,
    aspect: f32,
    initial_position: Vec3,
}

impl PlanCamera {
    pub fn new(settings: &EditorSettings, aspect: f32) -> Self {
        let mut camera = Self {
            left: 0.0,
            right: 0.0,
            top: 0.0,
            bottom: 0.0,
            near: settings.plan_near,
            far: settings.plan_far,
            zoom: 1.0,
            position: settings.plan_camera_position,
            target: Vec3::new(settings.plan_camera_position.x, settings.plan_camera_position.y, 0.0),
            frustum_size: settings.frustum_size,
            aspect,
            initial_position: settings.plan_camera_position,
        };
        camera.set_aspect(aspect);
        camera
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Visible world width, zoom included.
    pub fn visible_width(&self) -> f32 {
        (self.right - self.left) / self.zoom
    }

    pub fn visible_height(&self) -> f32 {
        (self.top - self.bottom) / self.zoom
    }

    pub fn projection(&self) -> Mat4 {
        let cx = (self.left + self.right) * 0.5;
        let cy = (self.top + self.bottom) * 0.5;
        let hw = self.visible_width() * 0.5;
        let hh = self.visible_height() * 0.5;
        Mat4::orthographic_rh(cx - hw, cx + hw, cy - hh, cy + hh, self.near, self.far)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }
}

impl Camera for PlanCamera {
    fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn target(&self) -> Vec3 {
        self.target
    }

    fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.left = -self.frustum_size * aspect / 2.0;
        self.right = self.frustum_size * aspect / 2.0;
        self.top = self.frustum_size / 2.0;
        self.bottom = -self.frustum_size / 2.0;
    }

    fn reset(&mut self) {
        self.position = self.initial_position;
        self.target = Vec3::new(self.initial_position.x, self.initial_position.y, 0.0);
        self.zoom = 1.0;
        self.set_aspect(self.aspect);
    }
}

/// Perspective camera of the elevation view, Y up.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationCamera {
    pub fov_y_radians: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    initial_position: Vec3,
}

impl ElevationCamera {
    pub fn new(settings: &EditorSettings, aspect: f32) -> Self {
        Self {
            fov_y_radians: settings.elevation_fov_degrees.to_radians(),
            aspect,
            near: settings.elevation_near,
            far: settings.elevation_far,
            position: settings.elevation_camera_position,
            target: Vec3::ZERO,
            initial_position: settings.elevation_camera_position,
        }
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_radians, self.aspect, self.near, self.far)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }
}

impl Camera for ElevationCamera {
    fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn target(&self) -> Vec3 {
        self.target
    }

    fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    fn reset(&mut self) {
        self.position = self.initial_position;
        self.target = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_plan_bounds_follow_aspect() {
        let mut camera = PlanCamera::new(&EditorSettings::default(), 2.0);
        assert_approx_eq!(camera.left, -100.0);
        assert_approx_eq!(camera.right, 100.0);
        assert_approx_eq!(camera.top, 50.0);
        assert_approx_eq!(camera.bottom, -50.0);
        camera.set_aspect(1.0);
        assert_approx_eq!(camera.right, 50.0);
    }

    #[test]
    fn test_plan_zoom_shrinks_visible_area() {
        let mut camera = PlanCamera::new(&EditorSettings::default(), 1.0);
        camera.zoom = 2.0;
        assert_approx_eq!(camera.visible_width(), 50.0);
    }

    #[test]
    fn test_plan_reset_restores_framing() {
        let mut camera = PlanCamera::new(&EditorSettings::default(), 1.5);
        let initial = camera.clone();
        camera.position += Vec3::new(10.0, -4.0, 0.0);
        camera.target += Vec3::new(10.0, -4.0, 0.0);
        camera.zoom = 3.0;
        camera.left = -7.0;
        camera.reset();
        assert_eq!(camera, initial);
    }

    #[test]
    fn test_elevation_reset_restores_framing() {
        let mut camera = ElevationCamera::new(&EditorSettings::default(), 1.0);
        camera.position = Vec3::new(1.0, 2.0, 3.0);
        camera.target = Vec3::ONE;
        camera.reset();
        assert_eq!(camera.position, Vec3::splat(50.0));
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_elevation_aspect_changes_projection() {
        let mut camera = ElevationCamera::new(&EditorSettings::default(), 1.0);
        let before = camera.view_projection();
        camera.set_aspect(2.0);
        assert_ne!(before, camera.view_projection());
    }
}
