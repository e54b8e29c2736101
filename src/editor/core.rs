// src/editor/core.rs

use egui::{Color32, Pos2, Rect, Vec2};
use glam::Vec3;
use log::{debug, info, warn};
use std::collections::BTreeMap;

use super::camera::{Camera, ElevationCamera, PlanCamera};
use super::controls::{ControlRig, OrbitControls, PanZoomControls};
use super::host::{ActionButton, ButtonRole, Container, DetailsPanel, DetailsReport, HostBindings, LabelId, LabelLayer};
use super::picking::{ActivePicking, Picker};
use super::scene::{decorate, Material, ObjectHandle, ObjectKind, RetainedScene, SceneGraph, SceneObject};
use super::settings::EditorSettings;
use super::sync::MeshSynchronizer;
use super::tools::{InteractionState, Mode, PointerButton, PointerEvent, ToolAction};
use super::{ViewKind, ViewerError};
use crate::document::{Document, PlanSummary};
use crate::map::{WallError, WallId};
use crate::utils::geometry::{distance, midpoint, world_to_screen};
use crate::utils::util::{aspect_ratio, format_length};

const PREVIEW_COLOR: Color32 = Color32::from_rgb(0x00, 0x00, 0xff);
const ALL_BUTTONS: [ButtonRole; 5] = [
    ButtonRole::PlanView,
    ButtonRole::ElevationView,
    ButtonRole::DrawMode,
    ButtonRole::MultiSelect,
    ButtonRole::Delete,
];

/// Host-provided presentation of one frame.
pub trait Renderer {
    fn render(&mut self, scene: &dyn SceneGraph, camera: &dyn Camera, viewport: Rect, view: ViewKind);
}

/// The segment being drawn, with its readout.
#[derive(Debug)]
struct Preview {
    line: ObjectHandle,
    label: Option<LabelId>,
    start: Vec3,
    end: Vec3,
}

/// Owns the plan and both views of it, and routes host events through the
/// interaction state machine.
///
/// Every public mutation leaves the model, both scenes' proxies and the host
/// UI text consistent before it returns.
pub struct Viewer {
    settings: EditorSettings,
    document: Document,
    plan_scene: Box<dyn SceneGraph>,
    elevation_scene: Box<dyn SceneGraph>,
    plan_controls: PanZoomControls,
    elevation_controls: OrbitControls,
    sync: MeshSynchronizer,
    picker: Picker,
    interaction: InteractionState,
    view: ViewKind,
    /// The elevation scene holds wall volumes once it has been entered.
    elevation_built: bool,
    preview: Option<Preview>,

    container: Box<dyn Container>,
    details: Option<Box<dyn DetailsPanel>>,
    buttons: BTreeMap<ButtonRole, Box<dyn ActionButton>>,
    labels: Option<Box<dyn LabelLayer>>,

    pointer_world: Option<Vec3>,
}

impl Viewer {
    pub fn new(
        settings: EditorSettings,
        host: HostBindings,
        mut plan_scene: Box<dyn SceneGraph>,
        mut elevation_scene: Box<dyn SceneGraph>,
    ) -> Result<Self, ViewerError> {
        settings.validate()?;
        if let Ok(json) = serde_json::to_string(&settings) {
            debug!("Viewer settings {}", json);
        }
        let HostBindings {
            container,
            details,
            buttons,
            labels,
            textures,
        } = host;
        let container = container.ok_or(ViewerError::MissingContainer)?;

        if details.is_none() {
            warn!("No details panel bound, summaries will not be shown");
        }
        for role in ALL_BUTTONS {
            if !buttons.contains_key(&role) {
                warn!("No {:?} button bound", role);
            }
        }
        if labels.is_none() {
            warn!("No label layer bound, dimension labels are disabled");
        }

        let rect = container.client_rect();
        let aspect = aspect_ratio(rect.width(), rect.height());
        decorate(plan_scene.as_mut(), ViewKind::Plan);
        decorate(elevation_scene.as_mut(), ViewKind::Elevation);

        let mut sync = MeshSynchronizer::new(&settings);
        match textures {
            Some(mut loader) => match loader.load(&settings.wall_texture) {
                Ok(()) => sync.set_texture(Some(settings.wall_texture.clone())),
                Err(err) => warn!("{}, walls will be flat shaded", err),
            },
            None => warn!("No texture loader bound, walls will be flat shaded"),
        }

        let mut viewer = Self {
            plan_controls: PanZoomControls::new(PlanCamera::new(&settings, aspect), &settings),
            elevation_controls: OrbitControls::new(ElevationCamera::new(&settings, aspect), &settings),
            picker: Picker::new(&settings),
            interaction: InteractionState::new(settings.chain_drawing),
            document: Document::new(),
            plan_scene,
            elevation_scene,
            sync,
            view: ViewKind::Plan,
            elevation_built: false,
            preview: None,
            container,
            details,
            buttons,
            labels,
            pointer_world: None,
            settings,
        };
        viewer.refresh_ui();
        info!("Viewer ready with a {:.0}x{:.0} viewport", rect.width(), rect.height());
        Ok(viewer)
    }

    /// Builds the viewer on the in-crate retained scenes.
    pub fn with_retained_scenes(settings: EditorSettings, host: HostBindings) -> Result<Self, ViewerError> {
        Self::new(
            settings,
            host,
            Box::new(RetainedScene::new(Color32::WHITE)),
            Box::new(RetainedScene::new(Color32::BLACK)),
        )
    }

    // --- Accessors ---

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn view(&self) -> ViewKind {
        self.view
    }

    pub fn mode(&self) -> Mode {
        self.interaction.mode()
    }

    pub fn tool_name(&self) -> &'static str {
        self.interaction.tool_name()
    }

    pub fn summary(&self) -> PlanSummary {
        self.document.summary()
    }

    pub fn scene(&self, view: ViewKind) -> &dyn SceneGraph {
        match view {
            ViewKind::Plan => self.plan_scene.as_ref(),
            ViewKind::Elevation => self.elevation_scene.as_ref(),
        }
    }

    pub fn plan_camera(&self) -> &PlanCamera {
        &self.plan_controls.camera
    }

    pub fn elevation_camera(&self) -> &ElevationCamera {
        &self.elevation_controls.camera
    }

    pub fn active_camera(&self) -> &dyn Camera {
        match self.view {
            ViewKind::Plan => &self.plan_controls.camera,
            ViewKind::Elevation => &self.elevation_controls.camera,
        }
    }

    pub fn sync(&self) -> &MeshSynchronizer {
        &self.sync
    }

    pub fn viewport(&self) -> Rect {
        self.container.client_rect()
    }

    /// Where the last pointer move met the active view's draw plane.
    pub fn pointer_world(&self) -> Option<Vec3> {
        self.pointer_world
    }

    fn active_rig_mut(&mut self) -> &mut dyn ControlRig {
        match self.view {
            ViewKind::Plan => &mut self.plan_controls,
            ViewKind::Elevation => &mut self.elevation_controls,
        }
    }

    // --- Views ---

    /// Switches the active view. Entering the elevation view is refused
    /// while in draw mode.
    pub fn set_view(&mut self, is_plan: bool) -> bool {
        let target = if is_plan { ViewKind::Plan } else { ViewKind::Elevation };
        if target == ViewKind::Elevation && self.interaction.is_drawing() {
            debug!("Staying in the plan view while drawing");
            return false;
        }
        self.view = target;
        let viewport = self.viewport();
        match target {
            ViewKind::Plan => {
                self.plan_controls.update(viewport);
                self.set_labels_visible(true);
                self.position_labels();
            }
            ViewKind::Elevation => {
                self.elevation_controls.update(viewport);
                self.sync
                    .rebuild_view(ViewKind::Elevation, &self.document, self.elevation_scene.as_mut());
                self.elevation_built = true;
                self.set_labels_visible(false);
            }
        }
        self.refresh_buttons();
        info!("Switched to the {} view", target.name());
        true
    }

    /// Restores the active view's initial framing.
    pub fn reset_view(&mut self) {
        self.active_rig_mut().reset();
        if self.view == ViewKind::Plan {
            self.position_labels();
        }
        debug!("Reset the {} view", self.view.name());
    }

    /// Recomputes both cameras from the container size.
    pub fn on_resize(&mut self) {
        let rect = self.viewport();
        let aspect = aspect_ratio(rect.width(), rect.height());
        self.plan_controls.camera.set_aspect(aspect);
        self.elevation_controls.camera.set_aspect(aspect);
        if self.view == ViewKind::Plan {
            self.position_labels();
        }
        debug!("Viewport resized to {:.0}x{:.0}", rect.width(), rect.height());
    }

    /// Per-frame tick: advances the active rig and draws the active scene.
    pub fn render_frame(&mut self, renderer: &mut dyn Renderer) {
        let viewport = self.viewport();
        match self.view {
            ViewKind::Plan => {
                self.plan_controls.update(viewport);
                self.position_labels();
                renderer.render(self.plan_scene.as_ref(), &self.plan_controls.camera, viewport, ViewKind::Plan);
            }
            ViewKind::Elevation => {
                self.elevation_controls.update(viewport);
                renderer.render(
                    self.elevation_scene.as_ref(),
                    &self.elevation_controls.camera,
                    viewport,
                    ViewKind::Elevation,
                );
            }
        }
    }

    /// Fits the active camera to the walls. Returns false when there are none.
    pub fn zoom_to_fit(&mut self) -> bool {
        let Some((min, max)) = self.document.bounding_box() else {
            return false;
        };
        let center = (min + max) * 0.5;
        let size = max - min;
        match self.view {
            ViewKind::Plan => {
                let margin = self.settings.zoom_fit_margin;
                self.plan_controls.frame(center, size.x * margin, size.y * margin);
                self.position_labels();
            }
            ViewKind::Elevation => {
                let height = self.settings.wall_height;
                let target = Vec3::new(center.x, height / 2.0, center.y);
                let extent = Vec3::new(size.x, height, size.y);
                let back = extent.x.max(extent.z).max(extent.y);
                self.elevation_controls
                    .look_at(target + Vec3::new(0.0, extent.y, back), target);
            }
        }
        debug!("Zoomed the {} view to fit {} walls", self.view.name(), self.document.len());
        true
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.active_rig_mut().pan(delta);
    }

    pub fn zoom(&mut self, scroll: f32) {
        self.active_rig_mut().zoom(scroll);
    }

    pub fn orbit(&mut self, delta: Vec2) {
        self.active_rig_mut().orbit(delta);
    }

    // --- Model operations ---

    /// Adds a wall and its proxies. Zero-length walls are declined.
    pub fn create_wall(&mut self, start: Vec3, end: Vec3) -> Result<WallId, WallError> {
        let wall = self.document.create_wall(start, end)?;
        self.sync
            .sync_wall(&wall, false, ViewKind::Plan, self.plan_scene.as_mut());
        if self.elevation_built {
            self.sync
                .sync_wall(&wall, false, ViewKind::Elevation, self.elevation_scene.as_mut());
        }
        let text = format_length(wall.length(), &self.settings.length_unit);
        if let Some(labels) = self.labels.as_mut() {
            let label = labels.create(&text);
            labels.set_visible(label, self.view == ViewKind::Plan);
            self.sync.set_label(wall.id(), label);
        }
        self.position_labels();
        self.refresh_ui();
        info!("Created {} ({})", wall.id(), text);
        Ok(wall.id())
    }

    /// Removes every selected wall with its proxies and label.
    pub fn delete_selected(&mut self) -> usize {
        let removed = self.document.delete_selected();
        if removed.is_empty() {
            return 0;
        }
        for wall in &removed {
            let label = self
                .sync
                .remove_wall(wall.id(), self.plan_scene.as_mut(), self.elevation_scene.as_mut());
            if let (Some(label), Some(labels)) = (label, self.labels.as_mut()) {
                labels.remove(label);
            }
        }
        self.document.set_highlight(None);
        self.refresh_appearance();
        self.refresh_ui();
        info!("Deleted {} walls", removed.len());
        removed.len()
    }

    pub fn set_selection(&mut self, ids: &[WallId], exclusive: bool) {
        self.document.set_selection(ids, exclusive);
        self.refresh_appearance();
        self.refresh_ui();
    }

    pub fn clear_transient_state(&mut self) {
        self.document
            .clear_transient_state(self.interaction.is_multi_select());
        self.refresh_appearance();
        self.refresh_ui();
    }

    // --- Modes ---

    pub fn toggle_draw_mode(&mut self) {
        if self.interaction.is_drawing() {
            let actions = self.interaction.exit_drawing();
            self.apply_all(actions);
            info!("Exited draw mode");
        } else {
            self.interaction.enter_drawing();
            self.document.set_highlight(None);
            self.refresh_appearance();
            info!("Entered draw mode");
            if self.view == ViewKind::Elevation && self.settings.draw_mode_switches_to_plan {
                self.set_view(true);
            }
        }
        self.refresh_buttons();
    }

    /// Leaves draw mode first when it is active.
    pub fn toggle_multi_select(&mut self) {
        if self.interaction.is_drawing() {
            let actions = self.interaction.exit_drawing();
            self.apply_all(actions);
        }
        let multi = !self.interaction.is_multi_select();
        self.interaction.set_multi_select(multi);
        self.refresh_buttons();
        info!("Multi-select {}", if multi { "on" } else { "off" });
    }

    /// Drops a pending segment, or leaves draw mode when nothing is pending.
    pub fn cancel(&mut self) {
        match self.interaction.mode() {
            Mode::Drawing { pending_start: Some(_) } => {
                let actions = self.interaction.cancel_pending();
                self.apply_all(actions);
                debug!("Cancelled the pending wall");
            }
            Mode::Drawing { pending_start: None } => self.toggle_draw_mode(),
            Mode::Idle | Mode::MultiSelect => {}
        }
    }

    // --- Pointer events ---

    pub fn pointer_down(&mut self, pos: Pos2, button: PointerButton) {
        self.dispatch(PointerEvent::Down { pos, button });
    }

    pub fn pointer_move(&mut self, pos: Pos2) {
        self.pointer_world =
            self.picker
                .point_on_draw_plane(pos, self.active_camera(), self.viewport(), self.view);
        self.dispatch(PointerEvent::Move { pos });
    }

    pub fn pointer_up(&mut self, pos: Pos2, button: PointerButton) {
        self.dispatch(PointerEvent::Up { pos, button });
    }

    fn dispatch(&mut self, event: PointerEvent) {
        let viewport = self.viewport();
        let view = self.view;
        let actions = {
            let (camera, scene): (&dyn Camera, &dyn SceneGraph) = match view {
                ViewKind::Plan => (&self.plan_controls.camera, self.plan_scene.as_ref()),
                ViewKind::Elevation => (&self.elevation_controls.camera, self.elevation_scene.as_ref()),
            };
            let picking = ActivePicking {
                picker: &self.picker,
                camera,
                viewport,
                view,
                scene,
                candidates: self.sync.pick_candidates(view),
            };
            self.interaction.handle(&event, view, &picking)
        };
        self.apply_all(actions);
    }

    fn apply_all(&mut self, actions: Vec<ToolAction>) {
        for action in actions {
            self.apply(action);
        }
    }

    fn apply(&mut self, action: ToolAction) {
        match action {
            ToolAction::Select { id, exclusive } => self.set_selection(&[id], exclusive),
            ToolAction::ClearTransient => self.clear_transient_state(),
            ToolAction::Highlight(id) => {
                if self.document.set_highlight(id) {
                    self.refresh_appearance();
                }
            }
            ToolAction::BeginPreview(point) => self.begin_preview(point),
            ToolAction::UpdatePreview { start, end } => self.update_preview(start, end),
            ToolAction::DiscardPreview => self.discard_preview(),
            ToolAction::CreateWall { start, end } => {
                if let Err(err) = self.create_wall(start, end) {
                    debug!("Declined wall: {}", err);
                }
            }
        }
    }

    // --- Preview ---

    fn begin_preview(&mut self, point: Vec3) {
        self.discard_preview();
        let line = self
            .plan_scene
            .add(SceneObject::line(point, point, 2.0, Material::solid(PREVIEW_COLOR)));
        self.preview = Some(Preview {
            line,
            label: None,
            start: point,
            end: point,
        });
    }

    fn update_preview(&mut self, start: Vec3, end: Vec3) {
        let Some(preview) = self.preview.as_mut() else {
            return;
        };
        preview.start = start;
        preview.end = end;
        if let Some(object) = self.plan_scene.get_mut(preview.line) {
            object.kind = ObjectKind::Line { start, end, width: 2.0 };
        }
        let text = format_length(distance(start, end), &self.settings.length_unit);
        if let Some(labels) = self.labels.as_mut() {
            let label = *preview.label.get_or_insert_with(|| labels.create(&text));
            labels.set_text(label, &text);
            if let Some(pos) = world_to_screen(
                midpoint(start, end),
                self.plan_controls.camera.view_projection(),
                self.container.client_rect(),
            ) {
                labels.set_position(label, pos);
            }
        }
    }

    fn discard_preview(&mut self) {
        let Some(preview) = self.preview.take() else {
            return;
        };
        self.plan_scene.remove(preview.line);
        if let (Some(label), Some(labels)) = (preview.label, self.labels.as_mut()) {
            labels.remove(label);
        }
    }

    // --- Derived state ---

    fn refresh_appearance(&mut self) {
        for wall in self.document.walls() {
            let highlighted = self.document.is_highlighted(wall.id());
            self.sync
                .refresh_appearance(wall, highlighted, ViewKind::Plan, self.plan_scene.as_mut());
            if self.elevation_built {
                self.sync
                    .refresh_appearance(wall, highlighted, ViewKind::Elevation, self.elevation_scene.as_mut());
            }
        }
    }

    fn set_labels_visible(&mut self, visible: bool) {
        let Some(labels) = self.labels.as_mut() else {
            return;
        };
        for wall in self.document.walls() {
            if let Some(label) = self.sync.label(wall.id()) {
                labels.set_visible(label, visible);
            }
        }
        if let Some(label) = self.preview.as_ref().and_then(|p| p.label) {
            labels.set_visible(label, visible);
        }
    }

    /// Moves every dimension label to its wall's projected midpoint.
    fn position_labels(&mut self) {
        if self.view != ViewKind::Plan {
            return;
        }
        let Some(labels) = self.labels.as_mut() else {
            return;
        };
        let view_proj = self.plan_controls.camera.view_projection();
        let viewport = self.container.client_rect();
        for wall in self.document.walls() {
            let Some(label) = self.sync.label(wall.id()) else {
                continue;
            };
            if let Some(pos) = world_to_screen(wall.midpoint(), view_proj, viewport) {
                labels.set_position(label, pos);
            }
        }
        if let Some(preview) = &self.preview {
            if let (Some(label), Some(pos)) = (
                preview.label,
                world_to_screen(midpoint(preview.start, preview.end), view_proj, viewport),
            ) {
                labels.set_position(label, pos);
            }
        }
    }

    fn refresh_ui(&mut self) {
        match serde_json::to_string(&self.document.summary()) {
            Ok(json) => debug!("Plan summary {}", json),
            Err(err) => warn!("Could not serialize the plan summary: {}", err),
        }
        if let Some(details) = self.details.as_mut() {
            details.show(&DetailsReport::from_document(&self.document, &self.settings.length_unit));
        }
        self.refresh_buttons();
    }

    fn refresh_buttons(&mut self) {
        let selected = self.document.selected_count();
        let drawing = self.interaction.is_drawing();
        let multi = self.interaction.is_multi_select();
        let view = self.view;
        for (role, button) in self.buttons.iter_mut() {
            match role {
                ButtonRole::PlanView => {
                    button.set_label("2D View");
                    button.set_enabled(true);
                    button.set_active(view == ViewKind::Plan);
                }
                ButtonRole::ElevationView => {
                    button.set_label("3D View");
                    button.set_enabled(!drawing);
                    button.set_active(view == ViewKind::Elevation);
                }
                ButtonRole::DrawMode => {
                    button.set_label(if drawing { "Exit Draw Mode" } else { "Draw Mode" });
                    button.set_enabled(true);
                    button.set_active(drawing);
                }
                ButtonRole::MultiSelect => {
                    button.set_label(if multi { "Finish Selection" } else { "Select Walls" });
                    button.set_enabled(true);
                    button.set_active(multi);
                }
                ButtonRole::Delete => {
                    if selected > 0 {
                        button.set_label(&format!("Delete Walls ({})", selected));
                    } else {
                        button.set_label("Delete Wall");
                    }
                    button.set_enabled(selected > 0);
                    button.set_active(false);
                }
            }
        }
    }
}
