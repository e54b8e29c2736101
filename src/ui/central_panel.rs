//! Central panel UI module: paints the active scene through the active camera,
//! draws the floating labels, and forwards pointer, wheel and key input to the
//! viewer.

use std::sync::Arc;
use parking_lot::RwLock;
use eframe::egui::{
    self, epaint, Align2, Color32, Context, Event, FontId, Key, Mesh, Painter, Pos2, Rect, Sense, Shape,
    Stroke, TextureHandle,
};
use glam::{Mat4, Vec3};

use super::texture::SharedTexture;
use crate::editor::camera::Camera;
use crate::editor::host::SharedHost;
use crate::editor::scene::{GridPlane, ObjectKind, SceneGraph, SceneObject};
use crate::editor::tools::PointerButton;
use crate::editor::{Renderer, Viewer, ViewKind};
use crate::utils::geometry::world_to_screen;

/// Upper bound on texture tiles per face edge.
const MAX_TILES: usize = 32;
const FACE_EPSILON: f32 = 1e-4;

/// The `CentralPanel` struct provides the viewport the scenes are drawn into.
pub struct CentralPanel {
    viewer: Arc<RwLock<Viewer>>,
    host: SharedHost,
    texture: SharedTexture,
}

impl CentralPanel {
    pub fn new(viewer: Arc<RwLock<Viewer>>, host: SharedHost, texture: SharedTexture) -> Self {
        Self { viewer, host, texture }
    }

    /// Called each frame to update the central panel.
    pub fn update(&mut self, ctx: &Context) {
        let texture = self.texture.write().handle(ctx);
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let rect = ui.available_rect_before_wrap();
                let response = ui.interact(rect, ui.id().with("viewport"), Sense::click_and_drag());

                self.sync_viewport(rect);
                self.forward_input(ui, &response, rect);

                let painter = ui.painter_at(rect);
                let mut renderer = SceneRenderer {
                    painter: &painter,
                    texture: texture.as_ref(),
                };
                self.viewer.write().render_frame(&mut renderer);
                self.draw_labels(&painter);
            });
        // The render loop runs every display refresh.
        ctx.request_repaint();
    }

    fn sync_viewport(&self, rect: Rect) {
        let changed = {
            let mut host = self.host.write();
            let changed = host.viewport != rect;
            host.viewport = rect;
            changed
        };
        if changed {
            self.viewer.write().on_resize();
        }
    }

    // ============================================================
    // Input Forwarding
    // ============================================================

    fn forward_input(&self, ui: &egui::Ui, response: &egui::Response, rect: Rect) {
        let events = ui.input().events.clone();
        let scroll = ui.input().scroll_delta.y;
        let mut viewer = self.viewer.write();

        for event in events {
            match event {
                Event::PointerMoved(pos) if rect.contains(pos) => viewer.pointer_move(pos),
                Event::PointerButton { pos, button, pressed, .. } if rect.contains(pos) => {
                    let button = match button {
                        egui::PointerButton::Primary => PointerButton::Primary,
                        egui::PointerButton::Secondary => PointerButton::Secondary,
                        _ => continue,
                    };
                    if pressed {
                        viewer.pointer_down(pos, button);
                    } else {
                        viewer.pointer_up(pos, button);
                    }
                }
                Event::Key { key: Key::Escape, pressed: true, .. } => viewer.cancel(),
                Event::Key { key: Key::Delete, pressed: true, .. } => {
                    viewer.delete_selected();
                }
                _ => {}
            }
        }

        if response.hovered() && scroll.abs() > 0.0 {
            viewer.zoom(scroll);
        }
        if response.dragged_by(egui::PointerButton::Middle) {
            viewer.pan(response.drag_delta());
        }
        if response.dragged_by(egui::PointerButton::Secondary) {
            viewer.orbit(response.drag_delta());
        }
    }

    // ============================================================
    // Labels
    // ============================================================

    fn draw_labels(&self, painter: &Painter) {
        let host = self.host.read();
        for label in host.visible_labels() {
            let galley = painter.layout_no_wrap(label.text.clone(), FontId::proportional(12.0), Color32::BLACK);
            let rect = Align2::CENTER_CENTER.anchor_rect(Rect::from_min_size(label.position, galley.size()));
            painter.rect_filled(rect.expand(2.0), 2.0, Color32::from_white_alpha(220));
            painter.galley(rect.min, galley);
        }
    }
}

// ============================================================
// Scene Painting
// ============================================================

#[derive(Debug, Clone, Copy, Default)]
struct Lighting {
    ambient: f32,
    directional: Option<(Vec3, f32)>,
}

impl Lighting {
    fn shade(&self, color: Color32, normal: Vec3) -> Color32 {
        if self.ambient == 0.0 && self.directional.is_none() {
            return color;
        }
        let diffuse = self
            .directional
            .map_or(0.0, |(dir, intensity)| normal.dot(dir).max(0.0) * intensity);
        let factor = (self.ambient + diffuse).min(1.0);
        let scale = |c: u8| (c as f32 * factor) as u8;
        Color32::from_rgba_unmultiplied(scale(color.r()), scale(color.g()), scale(color.b()), color.a())
    }
}

struct Face {
    points: Vec<Pos2>,
    /// Parallelogram corners: origin, along u, along v.
    frame: [Vec3; 3],
    depth: f32,
    color: Color32,
    tiles: Option<(f32, f32)>,
    outline: bool,
}

struct SceneRenderer<'a> {
    painter: &'a Painter,
    texture: Option<&'a TextureHandle>,
}

struct Projector {
    view_proj: Mat4,
    viewport: Rect,
}

impl Projector {
    fn project(&self, point: Vec3) -> Option<Pos2> {
        let clip = self.view_proj * point.extend(1.0);
        if clip.w <= FACE_EPSILON {
            return None;
        }
        world_to_screen(point, self.view_proj, self.viewport)
    }
}

fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), (opacity.clamp(0.0, 1.0) * 255.0) as u8)
}

impl Renderer for SceneRenderer<'_> {
    fn render(&mut self, scene: &dyn SceneGraph, camera: &dyn Camera, viewport: Rect, view: ViewKind) {
        self.painter.rect_filled(viewport, 0.0, scene.background());
        let projector = Projector {
            view_proj: camera.view_projection(),
            viewport,
        };
        let forward = (camera.target() - camera.position()).normalize_or_zero();

        let mut lighting = Lighting::default();
        scene.for_each(&mut |_, object| match object.kind {
            ObjectKind::AmbientLight { intensity } => lighting.ambient += intensity,
            ObjectKind::DirectionalLight { position, intensity } => {
                lighting.directional = Some((position.normalize_or_zero(), intensity));
            }
            _ => {}
        });

        let mut faces = Vec::new();
        let mut lines = Vec::new();
        scene.for_each(&mut |_, object| match object.kind {
            ObjectKind::Grid { .. } | ObjectKind::Axes { .. } => self.paint_helper(object, &projector),
            ObjectKind::Line { start, end, width } => {
                if let (Some(a), Some(b)) = (projector.project(start), projector.project(end)) {
                    let color = with_opacity(object.material.color, object.material.opacity);
                    lines.push(([a, b], Stroke::new(width, color)));
                }
            }
            ObjectKind::Cuboid { .. } => {
                collect_faces(object, camera, view, forward, &lighting, &projector, &mut faces)
            }
            ObjectKind::AmbientLight { .. } | ObjectKind::DirectionalLight { .. } => {}
        });

        // Painter's algorithm: farthest faces first.
        faces.sort_by(|a, b| b.depth.total_cmp(&a.depth));
        for face in faces {
            self.paint_face(face, &projector);
        }
        for (points, stroke) in lines {
            self.painter.line_segment(points, stroke);
        }
    }
}

impl SceneRenderer<'_> {
    fn paint_helper(&self, object: &SceneObject, projector: &Projector) {
        let segment = |a: Vec3, b: Vec3, color: Color32| {
            if let (Some(a), Some(b)) = (projector.project(a), projector.project(b)) {
                self.painter.line_segment([a, b], Stroke::new(1.0, color));
            }
        };
        match object.kind {
            ObjectKind::Grid { size, divisions, plane, center_color } => {
                let half = size / 2.0;
                let step = size / divisions.max(1) as f32;
                let line_color = with_opacity(object.material.color, object.material.opacity);
                for i in 0..=divisions {
                    let c = -half + i as f32 * step;
                    let color = if c.abs() < FACE_EPSILON { center_color } else { line_color };
                    match plane {
                        GridPlane::Xy => {
                            segment(Vec3::new(c, -half, 0.0), Vec3::new(c, half, 0.0), color);
                            segment(Vec3::new(-half, c, 0.0), Vec3::new(half, c, 0.0), color);
                        }
                        GridPlane::Xz => {
                            segment(Vec3::new(c, 0.0, -half), Vec3::new(c, 0.0, half), color);
                            segment(Vec3::new(-half, 0.0, c), Vec3::new(half, 0.0, c), color);
                        }
                    }
                }
            }
            ObjectKind::Axes { size, z_opacity } => {
                segment(Vec3::ZERO, Vec3::X * size, Color32::RED);
                segment(Vec3::ZERO, Vec3::Y * size, Color32::GREEN);
                segment(Vec3::ZERO, Vec3::Z * size, with_opacity(Color32::BLUE, z_opacity));
            }
            _ => {}
        }
    }

    fn paint_face(&self, face: Face, projector: &Projector) {
        if let (Some(texture), Some((ru, rv))) = (self.texture, face.tiles) {
            self.painter.add(Shape::mesh(tiled_mesh(texture, &face, ru, rv, projector)));
            return;
        }
        let stroke = if face.outline {
            Stroke::new(1.0, Color32::from_black_alpha(120))
        } else {
            Stroke::NONE
        };
        self.painter.add(Shape::convex_polygon(face.points, face.color, stroke));
    }
}

/// Indices into `cuboid_corners`: the two long faces first, then the ends,
/// bottom and top. Each face is ordered origin, +u, opposite, +v.
const FACES: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [0, 3, 7, 4],
    [1, 5, 6, 2],
    [0, 4, 5, 1],
    [3, 2, 6, 7],
];

fn collect_faces(
    object: &SceneObject,
    camera: &dyn Camera,
    view: ViewKind,
    forward: Vec3,
    lighting: &Lighting,
    projector: &Projector,
    faces: &mut Vec<Face>,
) {
    let Some(corners) = object.cuboid_corners() else {
        return;
    };
    let center = object.position;
    let base = with_opacity(object.material.color, object.material.opacity);
    for (index, face) in FACES.iter().enumerate() {
        let quad = face.map(|i| corners[i]);
        let face_center = (quad[0] + quad[1] + quad[2] + quad[3]) * 0.25;
        let mut normal = (quad[1] - quad[0]).cross(quad[3] - quad[0]).normalize_or_zero();
        if normal.dot(face_center - center) < 0.0 {
            normal = -normal;
        }
        let to_camera = match view {
            ViewKind::Plan => -forward,
            ViewKind::Elevation => (camera.position() - face_center).normalize_or_zero(),
        };
        if normal.dot(to_camera) <= FACE_EPSILON {
            continue;
        }
        let Some(points) = quad.iter().map(|p| projector.project(*p)).collect::<Option<Vec<_>>>() else {
            continue;
        };
        let tiles = if index < 2 {
            object.material.finish.as_ref().map(|finish| finish.repeat)
        } else {
            None
        };
        faces.push(Face {
            points,
            frame: [quad[0], quad[1], quad[3]],
            depth: (face_center - camera.position()).dot(forward),
            color: lighting.shade(base, normal),
            tiles,
            outline: view == ViewKind::Elevation,
        });
    }
}

/// Covers the face with a grid of texture tiles, at most `MAX_TILES` per edge,
/// each stretched so the grid spans the face exactly.
fn tiled_mesh(texture: &TextureHandle, face: &Face, ru: f32, rv: f32, projector: &Projector) -> Mesh {
    let mut mesh = Mesh::with_texture(texture.id());
    let [origin, along_u, along_v] = face.frame;
    let du = along_u - origin;
    let dv = along_v - origin;
    let ru = ru.max(FACE_EPSILON);
    let rv = rv.max(FACE_EPSILON);
    let nu = (ru.ceil() as usize).clamp(1, MAX_TILES);
    let nv = (rv.ceil() as usize).clamp(1, MAX_TILES);
    let step_u = 1.0 / nu as f32;
    let step_v = 1.0 / nv as f32;
    // Tiles of the capped grid stretch to keep the face covered.
    let tile_u = ru / nu as f32;
    let tile_v = rv / nv as f32;

    for i in 0..nu {
        for j in 0..nv {
            let (s0, s1) = (i as f32 * step_u, (i + 1) as f32 * step_u);
            let (t0, t1) = (j as f32 * step_v, (j + 1) as f32 * step_v);
            let corners = [(s0, t0), (s1, t0), (s1, t1), (s0, t1)];
            let projected: Option<Vec<Pos2>> = corners
                .iter()
                .map(|(s, t)| projector.project(origin + du * *s + dv * *t))
                .collect();
            let Some(projected) = projected else {
                continue;
            };
            let uvs = [
                egui::pos2(0.0, tile_v),
                egui::pos2(tile_u, tile_v),
                egui::pos2(tile_u, 0.0),
                egui::pos2(0.0, 0.0),
            ];
            let first = mesh.vertices.len() as u32;
            for (pos, uv) in projected.into_iter().zip(uvs) {
                mesh.vertices.push(epaint::Vertex { pos, uv, color: face.color });
            }
            mesh.add_triangle(first, first + 1, first + 2);
            mesh.add_triangle(first, first + 2, first + 3);
        }
    }
    mesh
}
