// src/editor/picking.rs

use egui::{Pos2, Rect};
use glam::Vec3;
use log::debug;

use super::camera::Camera;
use super::scene::{ObjectHandle, SceneGraph};
use super::settings::EditorSettings;
use super::tools::Picking;
use super::ViewKind;
use crate::map::WallId;
use crate::utils::geometry::{ray_plane_intersection, screen_to_world_ray, Plane, Ray};

/// Turns pointer positions into draw-plane points and wall hits. Never
/// mutates anything it looks at.
#[derive(Debug, Clone)]
pub struct Picker {
    plan_plane: Plane,
    elevation_plane: Plane,
    line_threshold: f32,
}

impl Picker {
    pub fn new(settings: &EditorSettings) -> Self {
        Self {
            plan_plane: Plane::from_normal_and_offset(Vec3::Z, settings.draw_plane_offset),
            elevation_plane: Plane::from_normal_and_offset(Vec3::Y, settings.draw_plane_offset),
            line_threshold: settings.line_pick_threshold,
        }
    }

    pub fn draw_plane(&self, view: ViewKind) -> &Plane {
        match view {
            ViewKind::Plan => &self.plan_plane,
            ViewKind::Elevation => &self.elevation_plane,
        }
    }

    pub fn ray(&self, pointer: Pos2, camera: &dyn Camera, viewport: Rect) -> Option<Ray> {
        screen_to_world_ray(pointer, camera.view_projection(), viewport)
    }

    pub fn point_on_draw_plane(
        &self,
        pointer: Pos2,
        camera: &dyn Camera,
        viewport: Rect,
        view: ViewKind,
    ) -> Option<Vec3> {
        let ray = self.ray(pointer, camera, viewport)?;
        ray_plane_intersection(&ray, self.draw_plane(view))
    }

    /// Owner of the nearest hit among `candidates`.
    pub fn pick_wall(
        &self,
        pointer: Pos2,
        camera: &dyn Camera,
        viewport: Rect,
        scene: &dyn SceneGraph,
        candidates: &[ObjectHandle],
    ) -> Option<WallId> {
        let ray = self.ray(pointer, camera, viewport)?;
        let hit = scene
            .raycast(&ray, candidates, self.line_threshold)
            .into_iter()
            .find_map(|hit| hit.owner)?;
        debug!("Pointer at {:?} hits {}", pointer, hit);
        Some(hit)
    }
}

/// Picking bound to the active view for one event.
pub struct ActivePicking<'a> {
    pub picker: &'a Picker,
    pub camera: &'a dyn Camera,
    pub viewport: Rect,
    pub view: ViewKind,
    pub scene: &'a dyn SceneGraph,
    pub candidates: Vec<ObjectHandle>,
}

impl Picking for ActivePicking<'_> {
    fn point_on_draw_plane(&self, pointer: Pos2) -> Option<Vec3> {
        self.picker.point_on_draw_plane(pointer, self.camera, self.viewport, self.view)
    }

    fn pick_wall(&self, pointer: Pos2) -> Option<WallId> {
        self.picker.pick_wall(pointer, self.camera, self.viewport, self.scene, &self.candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::editor::camera::{ElevationCamera, PlanCamera};
    use crate::editor::scene::RetainedScene;
    use crate::editor::sync::MeshSynchronizer;
    use crate::utils::geometry::world_to_screen;
    use assert_approx_eq::assert_approx_eq;
    use egui::Color32;

    fn viewport() -> Rect {
        Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(800.0, 400.0))
    }

    #[test]
    fn test_viewport_center_hits_plan_origin() {
        let settings = EditorSettings::default();
        let camera = PlanCamera::new(&settings, 2.0);
        let picker = Picker::new(&settings);
        let point = picker
            .point_on_draw_plane(egui::pos2(400.0, 200.0), &camera, viewport(), ViewKind::Plan)
            .unwrap();
        assert_approx_eq!(point.x, 0.0, 1e-4);
        assert_approx_eq!(point.y, 0.0, 1e-4);
        assert_approx_eq!(point.z, 0.0, 1e-4);
    }

    #[test]
    fn test_plane_point_round_trips_to_pixel() {
        let settings = EditorSettings::default();
        let camera = PlanCamera::new(&settings, 2.0);
        let picker = Picker::new(&settings);
        for pixel in [egui::pos2(13.0, 370.0), egui::pos2(640.5, 22.25)] {
            let point = picker.point_on_draw_plane(pixel, &camera, viewport(), ViewKind::Plan).unwrap();
            let back = world_to_screen(point, camera.view_projection(), viewport()).unwrap();
            assert_approx_eq!(back.x, pixel.x, 1e-2);
            assert_approx_eq!(back.y, pixel.y, 1e-2);
        }
    }

    #[test]
    fn test_offset_plane() {
        let settings = EditorSettings { draw_plane_offset: 2.0, ..EditorSettings::default() };
        let camera = PlanCamera::new(&settings, 2.0);
        let point = Picker::new(&settings)
            .point_on_draw_plane(egui::pos2(100.0, 100.0), &camera, viewport(), ViewKind::Plan)
            .unwrap();
        assert_approx_eq!(point.z, 2.0, 1e-4);
    }

    #[test]
    fn test_pick_line_in_plan() {
        let settings = EditorSettings::default();
        let camera = PlanCamera::new(&settings, 2.0);
        let picker = Picker::new(&settings);
        let mut doc = Document::new();
        let mut sync = MeshSynchronizer::new(&settings);
        let mut scene = RetainedScene::new(Color32::WHITE);
        let wall = doc.create_wall(Vec3::new(-20.0, 0.0, 0.0), Vec3::new(20.0, 0.0, 0.0)).unwrap();
        sync.sync_wall(&wall, false, ViewKind::Plan, &mut scene);
        let candidates = sync.pick_candidates(ViewKind::Plan);

        let on_wall = world_to_screen(Vec3::new(5.0, 0.4, 0.0), camera.view_projection(), viewport()).unwrap();
        assert_eq!(picker.pick_wall(on_wall, &camera, viewport(), &scene, &candidates), Some(wall.id()));

        let away = world_to_screen(Vec3::new(5.0, 10.0, 0.0), camera.view_projection(), viewport()).unwrap();
        assert_eq!(picker.pick_wall(away, &camera, viewport(), &scene, &candidates), None);
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_pick_volume_in_elevation() {
        let settings = EditorSettings::default();
        let camera = ElevationCamera::new(&settings, 2.0);
        let picker = Picker::new(&settings);
        let mut doc = Document::new();
        let mut sync = MeshSynchronizer::new(&settings);
        let mut scene = RetainedScene::new(Color32::BLACK);
        let wall = doc.create_wall(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0)).unwrap();
        sync.sync_wall(&wall, false, ViewKind::Elevation, &mut scene);

        let face = world_to_screen(Vec3::new(0.0, 1.5, 0.0), camera.view_projection(), viewport()).unwrap();
        let hit = picker.pick_wall(face, &camera, viewport(), &scene, &sync.pick_candidates(ViewKind::Elevation));
        assert_eq!(hit, Some(wall.id()));
        // Plan candidates do not exist for this wall, so nothing is hit.
        let none = picker.pick_wall(face, &camera, viewport(), &scene, &sync.pick_candidates(ViewKind::Plan));
        assert_eq!(none, None);
    }
}
