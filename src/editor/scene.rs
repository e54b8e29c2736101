// src/editor/scene.rs

//! The scene-graph seam. The editor core only talks to `SceneGraph`; the
//! `RetainedScene` below is the in-crate implementation that the desktop
//! frontend paints from and that tests inspect.

use egui::Color32;
use glam::{Mat4, Quat, Vec3};
use log::debug;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::ViewKind;
use crate::map::WallId;
use crate::utils::geometry::{Ray, EPSILON};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle(u64);

/// The one surface finish walls are given in the elevation view.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceFinish {
    pub texture: PathBuf,
    /// Texture repetitions along the wall and up the wall.
    pub repeat: (f32, f32),
    pub roughness: f32,
    pub metalness: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: Color32,
    pub opacity: f32,
    pub finish: Option<SurfaceFinish>,
}

impl Material {
    pub fn solid(color: Color32) -> Self {
        Self {
            color,
            opacity: 1.0,
            finish: None,
        }
    }

    pub fn translucent(color: Color32, opacity: f32) -> Self {
        Self {
            color,
            opacity,
            finish: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridPlane {
    Xy,
    Xz,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    /// A segment given in world space.
    Line { start: Vec3, end: Vec3, width: f32 },
    /// A box centred on the object's position, rotated by its rotation.
    Cuboid { size: Vec3 },
    Grid {
        size: f32,
        divisions: u32,
        plane: GridPlane,
        center_color: Color32,
    },
    Axes { size: f32, z_opacity: f32 },
    AmbientLight { intensity: f32 },
    DirectionalLight { position: Vec3, intensity: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub kind: ObjectKind,
    pub material: Material,
    pub position: Vec3,
    pub rotation: Quat,
    /// Wall this object stands in for, if any.
    pub owner: Option<WallId>,
}

impl SceneObject {
    fn new(kind: ObjectKind, material: Material) -> Self {
        Self {
            kind,
            material,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            owner: None,
        }
    }

    pub fn line(start: Vec3, end: Vec3, width: f32, material: Material) -> Self {
        Self::new(ObjectKind::Line { start, end, width }, material)
    }

    pub fn cuboid(size: Vec3, position: Vec3, rotation: Quat, material: Material) -> Self {
        Self {
            position,
            rotation,
            ..Self::new(ObjectKind::Cuboid { size }, material)
        }
    }

    pub fn grid(size: f32, divisions: u32, plane: GridPlane) -> Self {
        Self::new(
            ObjectKind::Grid {
                size,
                divisions,
                plane,
                center_color: Color32::BLACK,
            },
            Material::translucent(Color32::from_gray(0xcc), 0.5),
        )
    }

    pub fn axes(size: f32, z_opacity: f32) -> Self {
        Self::new(ObjectKind::Axes { size, z_opacity }, Material::solid(Color32::WHITE))
    }

    pub fn ambient_light(intensity: f32) -> Self {
        Self::new(ObjectKind::AmbientLight { intensity }, Material::solid(Color32::WHITE))
    }

    pub fn directional_light(position: Vec3, intensity: f32) -> Self {
        Self::new(
            ObjectKind::DirectionalLight { position, intensity },
            Material::solid(Color32::WHITE),
        )
    }

    pub fn with_owner(mut self, owner: WallId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// World-space corners of a cuboid: bottom face first, then top face,
    /// each counter-clockwise in local coordinates.
    pub fn cuboid_corners(&self) -> Option<[Vec3; 8]> {
        let ObjectKind::Cuboid { size } = self.kind else {
            return None;
        };
        let h = size * 0.5;
        let world = self.world_matrix();
        let local = [
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        Some(local.map(|p| world.transform_point3(p)))
    }

    /// Distance along `ray` at which this object is hit.
    fn intersect(&self, ray: &Ray, line_threshold: f32) -> Option<f32> {
        match self.kind {
            ObjectKind::Line { start, end, .. } => {
                let (dist_sq, t) = ray.distance_sq_to_segment(start, end);
                (dist_sq <= line_threshold * line_threshold).then_some(t)
            }
            ObjectKind::Cuboid { size } => intersect_cuboid(ray, self.world_matrix(), size),
            _ => None,
        }
    }
}

/// Slab test in the cuboid's local frame. The transform is rigid, so local
/// ray parameters equal world distances.
fn intersect_cuboid(ray: &Ray, world: Mat4, size: Vec3) -> Option<f32> {
    let inverse = world.inverse();
    let origin = inverse.transform_point3(ray.origin);
    let direction = inverse.transform_vector3(ray.direction);
    let half = size * 0.5;

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        let (o, d, h) = (origin[axis], direction[axis], half[axis]);
        if d.abs() <= EPSILON {
            if o < -h || o > h {
                return None;
            }
            continue;
        }
        let t1 = (-h - o) / d;
        let t2 = (h - o) / d;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
    }
    if t_max < t_min.max(0.0) {
        return None;
    }
    Some(if t_min >= 0.0 { t_min } else { t_max })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub handle: ObjectHandle,
    pub distance: f32,
    pub owner: Option<WallId>,
}

/// Scene-graph container service.
pub trait SceneGraph {
    fn add(&mut self, object: SceneObject) -> ObjectHandle;
    fn get(&self, handle: ObjectHandle) -> Option<&SceneObject>;
    fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut SceneObject>;
    /// Detaches the object and releases its geometry and material.
    fn remove(&mut self, handle: ObjectHandle) -> Option<SceneObject>;
    /// Hits among `candidates`, nearest first.
    fn raycast(&self, ray: &Ray, candidates: &[ObjectHandle], line_threshold: f32) -> Vec<RayHit>;
    fn for_each(&self, f: &mut dyn FnMut(ObjectHandle, &SceneObject));
    fn len(&self) -> usize;
    fn background(&self) -> Color32;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
pub struct RetainedScene {
    objects: BTreeMap<ObjectHandle, SceneObject>,
    next_handle: u64,
    background: Color32,
    disposed: usize,
}

impl RetainedScene {
    pub fn new(background: Color32) -> Self {
        Self {
            objects: BTreeMap::new(),
            next_handle: 0,
            background,
            disposed: 0,
        }
    }

    /// Number of objects whose resources have been released so far.
    pub fn disposed(&self) -> usize {
        self.disposed
    }

    #[cfg(test)]
    pub fn owned_by(&self, owner: WallId) -> Vec<ObjectHandle> {
        self.objects
            .iter()
            .filter(|(_, o)| o.owner == Some(owner))
            .map(|(h, _)| *h)
            .collect()
    }
}

impl SceneGraph for RetainedScene {
    fn add(&mut self, object: SceneObject) -> ObjectHandle {
        let handle = ObjectHandle(self.next_handle);
        self.next_handle += 1;
        self.objects.insert(handle, object);
        handle
    }

    fn get(&self, handle: ObjectHandle) -> Option<&SceneObject> {
        self.objects.get(&handle)
    }

    fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut SceneObject> {
        self.objects.get_mut(&handle)
    }

    fn remove(&mut self, handle: ObjectHandle) -> Option<SceneObject> {
        let removed = self.objects.remove(&handle);
        if removed.is_some() {
            self.disposed += 1;
        }
        removed
    }

    fn raycast(&self, ray: &Ray, candidates: &[ObjectHandle], line_threshold: f32) -> Vec<RayHit> {
        let mut hits: Vec<RayHit> = candidates
            .iter()
            .filter_map(|handle| {
                let object = self.objects.get(handle)?;
                let distance = object.intersect(ray, line_threshold)?;
                Some(RayHit {
                    handle: *handle,
                    distance,
                    owner: object.owner,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn for_each(&self, f: &mut dyn FnMut(ObjectHandle, &SceneObject)) {
        for (handle, object) in &self.objects {
            f(*handle, object);
        }
    }

    fn len(&self) -> usize {
        self.objects.len()
    }

    fn background(&self) -> Color32 {
        self.background
    }
}

/// Adds the grid, axes and (elevation only) lights a view starts with.
pub fn decorate(scene: &mut dyn SceneGraph, view: ViewKind) {
    match view {
        ViewKind::Plan => {
            scene.add(SceneObject::grid(200.0, 20, GridPlane::Xy));
            scene.add(SceneObject::axes(50.0, 0.3));
        }
        ViewKind::Elevation => {
            scene.add(SceneObject::grid(200.0, 20, GridPlane::Xz));
            scene.add(SceneObject::axes(5.0, 1.0));
            scene.add(SceneObject::ambient_light(0.5));
            scene.add(SceneObject::directional_light(Vec3::new(5.0, 5.0, 5.0), 1.0));
        }
    }
    debug!("Decorated {:?} scene with {} objects", view, scene.len());
}
