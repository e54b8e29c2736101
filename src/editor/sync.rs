// src/editor/sync.rs

//! Keeps the renderable proxies of both scenes in step with the wall list.

use egui::Color32;
use glam::{Quat, Vec3};
use log::debug;
use std::collections::HashMap;
use std::path::PathBuf;

use super::host::LabelId;
use super::scene::{Material, ObjectHandle, SceneGraph, SceneObject, SurfaceFinish};
use super::settings::EditorSettings;
use super::ViewKind;
use crate::document::Document;
use crate::map::{Wall, WallId};

pub const SELECTED_COLOR: Color32 = Color32::from_rgb(0xff, 0x00, 0x00);
pub const HIGHLIGHT_COLOR: Color32 = Color32::from_rgb(0x00, 0xff, 0x00);
pub const PLAN_NEUTRAL_COLOR: Color32 = Color32::from_rgb(0x00, 0x00, 0x00);
pub const ELEVATION_NEUTRAL_COLOR: Color32 = Color32::from_rgb(0xcc, 0xcc, 0xcc);
const SLAB_COLOR: Color32 = Color32::from_rgb(0xcc, 0xcc, 0xcc);
const PLAN_LINE_WIDTH: f32 = 2.0;

/// Appearance precedence: selected, then highlighted, then the view's base tone.
pub fn wall_color(view: ViewKind, selected: bool, highlighted: bool) -> Color32 {
    if selected {
        SELECTED_COLOR
    } else if highlighted {
        HIGHLIGHT_COLOR
    } else {
        match view {
            ViewKind::Plan => PLAN_NEUTRAL_COLOR,
            ViewKind::Elevation => ELEVATION_NEUTRAL_COLOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanProxy {
    pub line: ObjectHandle,
    pub slab: ObjectHandle,
}

/// Per-wall resource handles, one slot per view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallProxies {
    pub plan: Option<PlanProxy>,
    pub elevation: Option<ObjectHandle>,
    pub label: Option<LabelId>,
}

impl WallProxies {
    fn is_empty(&self) -> bool {
        self.plan.is_none() && self.elevation.is_none() && self.label.is_none()
    }
}

#[derive(Debug)]
pub struct MeshSynchronizer {
    proxies: HashMap<WallId, WallProxies>,
    wall_height: f32,
    wall_thickness: f32,
    slab_depth: f32,
    /// Set once the wall texture has loaded; walls stay flat shaded otherwise.
    texture: Option<PathBuf>,
}

impl MeshSynchronizer {
    pub fn new(settings: &EditorSettings) -> Self {
        Self {
            proxies: HashMap::new(),
            wall_height: settings.wall_height,
            wall_thickness: settings.wall_thickness,
            slab_depth: settings.plan_slab_depth,
            texture: None,
        }
    }

    pub fn set_texture(&mut self, texture: Option<PathBuf>) {
        self.texture = texture;
    }

    pub fn proxies(&self, id: WallId) -> Option<&WallProxies> {
        self.proxies.get(&id)
    }

    pub fn has_proxy(&self, id: WallId, view: ViewKind) -> bool {
        self.proxies.get(&id).map_or(false, |p| match view {
            ViewKind::Plan => p.plan.is_some(),
            ViewKind::Elevation => p.elevation.is_some(),
        })
    }

    /// Number of walls that currently have a proxy in `view`.
    pub fn proxy_count(&self, view: ViewKind) -> usize {
        self.proxies.keys().filter(|id| self.has_proxy(**id, view)).count()
    }

    /// Handles the picking service tests in `view`.
    pub fn pick_candidates(&self, view: ViewKind) -> Vec<ObjectHandle> {
        let mut handles = Vec::new();
        for proxies in self.proxies.values() {
            match view {
                ViewKind::Plan => {
                    if let Some(plan) = proxies.plan {
                        handles.push(plan.line);
                        handles.push(plan.slab);
                    }
                }
                ViewKind::Elevation => handles.extend(proxies.elevation),
            }
        }
        handles.sort();
        handles
    }

    pub fn label(&self, id: WallId) -> Option<LabelId> {
        self.proxies.get(&id).and_then(|p| p.label)
    }

    pub fn set_label(&mut self, id: WallId, label: LabelId) {
        self.proxies.entry(id).or_default().label = Some(label);
    }

    /// Creates the proxy for `(wall, view)` or, if it exists, refreshes its
    /// transform and appearance.
    pub fn sync_wall(&mut self, wall: &Wall, highlighted: bool, view: ViewKind, scene: &mut dyn SceneGraph) {
        let color = wall_color(view, wall.selected, highlighted);
        let volume = (view == ViewKind::Elevation).then(|| self.elevation_volume(wall, color));
        let entry = self.proxies.entry(wall.id()).or_default();
        match view {
            ViewKind::Plan => {
                let line = SceneObject::line(wall.start(), wall.end(), PLAN_LINE_WIDTH, Material::solid(color))
                    .with_owner(wall.id());
                let slab = SceneObject::cuboid(
                    Vec3::new(wall.length(), self.wall_thickness, self.slab_depth),
                    wall.midpoint(),
                    Quat::from_rotation_z(wall.angle()),
                    Material::translucent(SLAB_COLOR, 0.5),
                )
                .with_owner(wall.id());
                match entry.plan {
                    Some(proxy) if scene.get(proxy.line).is_some() && scene.get(proxy.slab).is_some() => {
                        replace(scene, proxy.line, line);
                        replace(scene, proxy.slab, slab);
                    }
                    _ => {
                        entry.plan = Some(PlanProxy {
                            line: scene.add(line),
                            slab: scene.add(slab),
                        });
                        debug!("Created plan proxy for {}", wall.id());
                    }
                }
            }
            ViewKind::Elevation => {
                let Some(volume) = volume else {
                    return;
                };
                match entry.elevation {
                    Some(handle) if scene.get(handle).is_some() => replace(scene, handle, volume),
                    _ => {
                        entry.elevation = Some(scene.add(volume));
                        debug!("Created elevation proxy for {}", wall.id());
                    }
                }
            }
        }
    }

    fn elevation_volume(&self, wall: &Wall, color: Color32) -> SceneObject {
        let mid = wall.midpoint();
        let mut material = Material::solid(color);
        material.finish = self.texture.as_ref().map(|texture| SurfaceFinish {
            texture: texture.clone(),
            repeat: (wall.length() / 2.0, self.wall_height / 2.0),
            roughness: 0.7,
            metalness: 0.1,
        });
        SceneObject::cuboid(
            Vec3::new(wall.length(), self.wall_height, self.wall_thickness),
            Vec3::new(mid.x, self.wall_height / 2.0, mid.y),
            Quat::from_rotation_y(-wall.angle()),
            material,
        )
        .with_owner(wall.id())
    }

    /// Recolours the existing proxies of `wall` without creating missing ones.
    pub fn refresh_appearance(&self, wall: &Wall, highlighted: bool, view: ViewKind, scene: &mut dyn SceneGraph) {
        let Some(proxies) = self.proxies.get(&wall.id()) else {
            return;
        };
        let color = wall_color(view, wall.selected, highlighted);
        let handle = match view {
            ViewKind::Plan => proxies.plan.map(|p| p.line),
            ViewKind::Elevation => proxies.elevation,
        };
        if let Some(object) = handle.and_then(|h| scene.get_mut(h)) {
            object.material.color = color;
        }
    }

    /// Releases every proxy of `id` in both scenes and forgets the wall.
    /// Returns its label so the caller can remove it from the label layer.
    pub fn remove_wall(
        &mut self,
        id: WallId,
        plan: &mut dyn SceneGraph,
        elevation: &mut dyn SceneGraph,
    ) -> Option<LabelId> {
        let proxies = self.proxies.remove(&id)?;
        if let Some(proxy) = proxies.plan {
            plan.remove(proxy.line);
            plan.remove(proxy.slab);
        }
        if let Some(handle) = proxies.elevation {
            elevation.remove(handle);
        }
        debug!("Released proxies for {}", id);
        proxies.label
    }

    /// Drops every proxy `view` owns, then recreates them from `document`
    /// in insertion order.
    pub fn rebuild_view(&mut self, view: ViewKind, document: &Document, scene: &mut dyn SceneGraph) {
        for proxies in self.proxies.values_mut() {
            match view {
                ViewKind::Plan => {
                    if let Some(proxy) = proxies.plan.take() {
                        scene.remove(proxy.line);
                        scene.remove(proxy.slab);
                    }
                }
                ViewKind::Elevation => {
                    if let Some(handle) = proxies.elevation.take() {
                        scene.remove(handle);
                    }
                }
            }
        }
        self.proxies.retain(|_, p| !p.is_empty());
        for wall in document.walls() {
            self.sync_wall(wall, document.is_highlighted(wall.id()), view, scene);
        }
        debug!("Rebuilt {:?} view with {} wall proxies", view, self.proxy_count(view));
    }
}

fn replace(scene: &mut dyn SceneGraph, handle: ObjectHandle, object: SceneObject) {
    if let Some(slot) = scene.get_mut(handle) {
        *slot = object;
    }
}
