// src/editor/controls.rs

use egui::{Rect, Vec2};
use glam::Vec3;

use super::camera::{Camera, ElevationCamera, PlanCamera};
use super::settings::EditorSettings;

/// Share of the pending input applied per frame when damping is on.
const DAMPING_FACTOR: f32 = 0.25;
const ZOOM_SENSITIVITY: f32 = 0.001;
const MIN_ZOOM: f32 = 0.05;
const MAX_ZOOM: f32 = 20.0;
const MIN_DISTANCE: f32 = 0.5;
const POLAR_LIMIT: f32 = 1e-3;

/// Camera framing captured when the rig is built and restored by `reset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigState {
    pub position: Vec3,
    pub target: Vec3,
    pub zoom: f32,
}

/// A pan/zoom/orbit rig bound to one camera.
///
/// Host input only accumulates; the camera moves in `update`, which the
/// render loop calls once per frame for the active view.
pub trait ControlRig {
    fn camera(&self) -> &dyn Camera;
    fn pan(&mut self, delta: Vec2);
    fn zoom(&mut self, scroll: f32);
    fn orbit(&mut self, delta: Vec2);
    /// Applies pending input. Returns true if the camera moved.
    fn update(&mut self, viewport: Rect) -> bool;
    /// Restores the saved reference state and drops pending input.
    fn reset(&mut self);
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PendingInput {
    pan: Vec2,
    zoom: f32,
    orbit: Vec2,
}

impl PendingInput {
    /// Takes the share of pending input to apply this frame.
    fn take(&mut self, damping: bool) -> PendingInput {
        let factor = if damping { DAMPING_FACTOR } else { 1.0 };
        let step = PendingInput {
            pan: self.pan * factor,
            zoom: self.zoom * factor,
            orbit: self.orbit * factor,
        };
        self.pan -= step.pan;
        self.zoom -= step.zoom;
        self.orbit -= step.orbit;
        if self.pan.length_sq() < 1e-4 && self.zoom.abs() < 1e-3 && self.orbit.length_sq() < 1e-4 {
            *self = PendingInput::default();
        }
        step
    }
}

/// Plan rig: rotation disabled, pan and zoom only.
#[derive(Debug, Clone)]
pub struct PanZoomControls {
    pub camera: PlanCamera,
    pan_speed: f32,
    zoom_speed: f32,
    damping: bool,
    pending: PendingInput,
    saved: RigState,
}

impl PanZoomControls {
    pub fn new(camera: PlanCamera, settings: &EditorSettings) -> Self {
        let saved = RigState {
            position: camera.position,
            target: camera.target,
            zoom: camera.zoom,
        };
        Self {
            camera,
            pan_speed: settings.pan_speed,
            zoom_speed: settings.zoom_speed,
            damping: settings.damping,
            pending: PendingInput::default(),
            saved,
        }
    }

    /// Moves camera and target together.
    pub fn look_at(&mut self, target: Vec3) {
        let offset = self.camera.position - self.camera.target;
        self.camera.target = target;
        self.camera.position = target + offset;
    }

    /// Centres on `center` and zooms so a `width` by `height` area fits.
    pub fn frame(&mut self, center: Vec3, width: f32, height: f32) {
        let fit = |visible: f32, wanted: f32| {
            if wanted > f32::EPSILON {
                visible / wanted
            } else {
                f32::INFINITY
            }
        };
        let zoom = fit(self.camera.right - self.camera.left, width)
            .min(fit(self.camera.top - self.camera.bottom, height));
        if zoom.is_finite() {
            self.camera.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
        self.look_at(Vec3::new(center.x, center.y, self.camera.target.z));
        self.pending = PendingInput::default();
    }
}

impl ControlRig for PanZoomControls {
    fn camera(&self) -> &dyn Camera {
        &self.camera
    }

    fn pan(&mut self, delta: Vec2) {
        self.pending.pan += delta;
    }

    fn zoom(&mut self, scroll: f32) {
        self.pending.zoom += scroll;
    }

    fn orbit(&mut self, _delta: Vec2) {}

    fn update(&mut self, viewport: Rect) -> bool {
        let step = self.pending.take(self.damping);
        let mut changed = false;

        if step.pan != Vec2::ZERO && viewport.width() > 0.0 && viewport.height() > 0.0 {
            let units_x = self.camera.visible_width() / viewport.width();
            let units_y = self.camera.visible_height() / viewport.height();
            let shift = Vec3::new(-step.pan.x * units_x, step.pan.y * units_y, 0.0) * self.pan_speed;
            self.camera.position += shift;
            self.camera.target += shift;
            changed = true;
        }
        if step.zoom != 0.0 {
            let factor = 1.0 + step.zoom * ZOOM_SENSITIVITY * self.zoom_speed;
            self.camera.zoom = (self.camera.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
            changed = true;
        }
        changed
    }

    fn reset(&mut self) {
        self.camera.reset();
        self.camera.position = self.saved.position;
        self.camera.target = self.saved.target;
        self.camera.zoom = self.saved.zoom;
        self.pending = PendingInput::default();
    }
}

/// Elevation rig: orbit about the target, pan in the view plane, dolly zoom.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub camera: ElevationCamera,
    pan_speed: f32,
    zoom_speed: f32,
    rotate_speed: f32,
    damping: bool,
    pending: PendingInput,
    saved: RigState,
}

impl OrbitControls {
    pub fn new(camera: ElevationCamera, settings: &EditorSettings) -> Self {
        let saved = RigState {
            position: camera.position,
            target: camera.target,
            zoom: 1.0,
        };
        Self {
            camera,
            pan_speed: settings.pan_speed,
            zoom_speed: settings.zoom_speed,
            rotate_speed: settings.rotate_speed,
            damping: settings.damping,
            pending: PendingInput::default(),
            saved,
        }
    }

    pub fn look_at(&mut self, position: Vec3, target: Vec3) {
        self.camera.position = position;
        self.camera.target = target;
    }
}

impl ControlRig for OrbitControls {
    fn camera(&self) -> &dyn Camera {
        &self.camera
    }

    fn pan(&mut self, delta: Vec2) {
        self.pending.pan += delta;
    }

    fn zoom(&mut self, scroll: f32) {
        self.pending.zoom += scroll;
    }

    fn orbit(&mut self, delta: Vec2) {
        self.pending.orbit += delta;
    }

    fn update(&mut self, viewport: Rect) -> bool {
        let step = self.pending.take(self.damping);
        let height = viewport.height().max(1.0);
        let mut offset = self.camera.position - self.camera.target;
        let mut changed = false;

        if step.orbit != Vec2::ZERO {
            let radius = offset.length();
            let mut theta = offset.x.atan2(offset.z);
            let mut phi = (offset.y / radius.max(f32::EPSILON)).clamp(-1.0, 1.0).acos();
            theta -= std::f32::consts::TAU * step.orbit.x / height * self.rotate_speed;
            phi -= std::f32::consts::TAU * step.orbit.y / height * self.rotate_speed;
            phi = phi.clamp(POLAR_LIMIT, std::f32::consts::PI - POLAR_LIMIT);
            offset = Vec3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );
            changed = true;
        }
        if step.zoom != 0.0 {
            let factor = 1.0 - step.zoom * ZOOM_SENSITIVITY * self.zoom_speed;
            let distance = (offset.length() * factor.max(0.05)).max(MIN_DISTANCE);
            offset = offset.normalize_or_zero() * distance;
            changed = true;
        }
        if step.pan != Vec2::ZERO {
            let forward = (-offset).normalize_or_zero();
            let right = forward.cross(Vec3::Y).normalize_or_zero();
            let up = right.cross(forward);
            let units = 2.0 * offset.length() * (self.camera.fov_y_radians * 0.5).tan() / height;
            let shift = (-right * step.pan.x + up * step.pan.y) * units * self.pan_speed;
            self.camera.target += shift;
            changed = true;
        }

        if changed {
            self.camera.position = self.camera.target + offset;
        }
        changed
    }

    fn reset(&mut self) {
        self.camera.reset();
        self.camera.position = self.saved.position;
        self.camera.target = self.saved.target;
        self.pending = PendingInput::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn viewport() -> Rect {
        Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(800.0, 400.0))
    }

    fn plan_rig(settings: &EditorSettings) -> PanZoomControls {
        PanZoomControls::new(PlanCamera::new(settings, 2.0), settings)
    }

    #[test]
    fn test_input_only_moves_camera_on_update() {
        let mut rig = plan_rig(&EditorSettings::default());
        rig.pan(egui::vec2(100.0, 0.0));
        assert_eq!(rig.camera.position, Vec3::new(0.0, 0.0, 5.0));
        assert!(rig.update(viewport()));
        assert!(!rig.update(viewport()));
    }

    #[test]
    fn test_plan_pan_moves_against_drag() {
        let settings = EditorSettings { pan_speed: 1.0, ..EditorSettings::default() };
        let mut rig = plan_rig(&settings);
        // 800 px across 200 world units: 4 px per unit.
        rig.pan(egui::vec2(40.0, 0.0));
        rig.update(viewport());
        assert_approx_eq!(rig.camera.position.x, -10.0, 1e-4);
        assert_approx_eq!(rig.camera.target.x, -10.0, 1e-4);
    }

    #[test]
    fn test_plan_zoom_is_clamped() {
        let mut rig = plan_rig(&EditorSettings::default());
        rig.zoom(1.0e6);
        rig.update(viewport());
        assert_eq!(rig.camera.zoom, MAX_ZOOM);
    }

    #[test]
    fn test_plan_orbit_is_ignored() {
        let mut rig = plan_rig(&EditorSettings::default());
        rig.orbit(egui::vec2(50.0, 50.0));
        assert!(!rig.update(viewport()));
    }

    #[test]
    fn test_reset_restores_saved_state() {
        let mut rig = plan_rig(&EditorSettings::default());
        rig.pan(egui::vec2(10.0, 10.0));
        rig.zoom(200.0);
        rig.update(viewport());
        rig.pan(egui::vec2(5.0, 0.0));
        rig.reset();
        assert_eq!(rig.camera.position, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(rig.camera.zoom, 1.0);
        assert!(!rig.update(viewport()));
    }

    #[test]
    fn test_damping_spreads_motion_over_frames() {
        let settings = EditorSettings { damping: true, pan_speed: 1.0, ..EditorSettings::default() };
        let mut rig = plan_rig(&settings);
        rig.pan(egui::vec2(40.0, 0.0));
        rig.update(viewport());
        let first = rig.camera.position.x;
        assert_approx_eq!(first, -2.5, 1e-4);
        rig.update(viewport());
        assert!(rig.camera.position.x < first);
    }

    #[test]
    fn test_frame_fits_area() {
        let mut rig = plan_rig(&EditorSettings::default());
        rig.frame(Vec3::new(10.0, 5.0, 0.0), 50.0, 10.0);
        // 200 wide, 100 tall; width is the tighter fit.
        assert_approx_eq!(rig.camera.zoom, 4.0, 1e-5);
        assert_eq!(rig.camera.target, Vec3::new(10.0, 5.0, 0.0));
        assert_eq!(rig.camera.position, Vec3::new(10.0, 5.0, 5.0));
    }

    #[test]
    fn test_orbit_keeps_distance_to_target() {
        let settings = EditorSettings::default();
        let mut rig = OrbitControls::new(ElevationCamera::new(&settings, 2.0), &settings);
        let before = rig.camera.position.distance(rig.camera.target);
        rig.orbit(egui::vec2(120.0, -30.0));
        assert!(rig.update(viewport()));
        let after = rig.camera.position.distance(rig.camera.target);
        assert_approx_eq!(before, after, 1e-3);
        assert_ne!(rig.camera.position, Vec3::splat(50.0));
    }

    #[test]
    fn test_elevation_zoom_moves_closer() {
        let settings = EditorSettings::default();
        let mut rig = OrbitControls::new(ElevationCamera::new(&settings, 2.0), &settings);
        let before = rig.camera.position.length();
        rig.zoom(100.0);
        rig.update(viewport());
        assert!(rig.camera.position.length() < before);
    }

    #[test]
    fn test_elevation_pan_moves_target() {
        let settings = EditorSettings::default();
        let mut rig = OrbitControls::new(ElevationCamera::new(&settings, 2.0), &settings);
        rig.pan(egui::vec2(30.0, 0.0));
        rig.update(viewport());
        assert_ne!(rig.camera.target, Vec3::ZERO);
        rig.reset();
        assert_eq!(rig.camera.target, Vec3::ZERO);
        assert_eq!(rig.camera.position, Vec3::splat(50.0));
    }
}
