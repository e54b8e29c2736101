// src/editor/host.rs

//! Host collaborators the viewer calls into: the viewport container, the
//! details panel, action buttons, floating labels and the texture loader.
//!
//! `HostState` is an in-memory host shared behind `Arc<RwLock<..>>`. The
//! desktop frontend paints from it and tests inspect it.

use egui::{Pos2, Rect};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::document::{Document, PlanSummary};
use crate::utils::util::format_length;

/// The element the views are drawn into. Required.
pub trait Container {
    /// Client rect in host coordinates; its size drives projection.
    fn client_rect(&self) -> Rect;
}

pub trait DetailsPanel {
    fn show(&mut self, report: &DetailsReport);
}

pub trait ActionButton {
    fn set_label(&mut self, label: &str);
    fn set_enabled(&mut self, enabled: bool);
    fn set_active(&mut self, active: bool);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(pub u64);

pub trait LabelLayer {
    fn create(&mut self, text: &str) -> LabelId;
    fn set_text(&mut self, id: LabelId, text: &str);
    fn set_position(&mut self, id: LabelId, position: Pos2);
    fn set_visible(&mut self, id: LabelId, visible: bool);
    fn remove(&mut self, id: LabelId);
}

#[derive(Debug, Error)]
#[error("failed to load texture {path}: {message}")]
pub struct TextureError {
    pub path: PathBuf,
    pub message: String,
}

pub trait TextureLoader {
    fn load(&mut self, path: &Path) -> Result<(), TextureError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ButtonRole {
    PlanView,
    ElevationView,
    DrawMode,
    MultiSelect,
    Delete,
}

/// Everything the host hands the viewer at construction. Only the
/// container is required.
#[derive(Default)]
pub struct HostBindings {
    pub container: Option<Box<dyn Container>>,
    pub details: Option<Box<dyn DetailsPanel>>,
    pub buttons: BTreeMap<ButtonRole, Box<dyn ActionButton>>,
    pub labels: Option<Box<dyn LabelLayer>>,
    pub textures: Option<Box<dyn TextureLoader>>,
}

impl HostBindings {
    /// Binds every element to `host`. The texture loader is left to the caller.
    pub fn shared(host: &SharedHost) -> Self {
        let buttons = [
            ButtonRole::PlanView,
            ButtonRole::ElevationView,
            ButtonRole::DrawMode,
            ButtonRole::MultiSelect,
            ButtonRole::Delete,
        ]
        .into_iter()
        .map(|role| {
            let button: Box<dyn ActionButton> = Box::new(HostButton {
                host: host.clone(),
                role,
            });
            (role, button)
        })
        .collect();
        Self {
            container: Some(Box::new(HostContainer(host.clone()))),
            details: Some(Box::new(HostDetails(host.clone()))),
            buttons,
            labels: Some(Box::new(HostLabels(host.clone()))),
            textures: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WallLine {
    pub index: usize,
    pub length: f32,
    pub selected: bool,
}

/// What the details panel shows after every mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailsReport {
    pub summary: PlanSummary,
    pub walls: Vec<WallLine>,
    pub unit: String,
}

impl DetailsReport {
    pub fn from_document(document: &Document, unit: &str) -> Self {
        Self {
            summary: document.summary(),
            walls: document
                .walls()
                .iter()
                .enumerate()
                .map(|(i, wall)| WallLine {
                    index: i + 1,
                    length: wall.length(),
                    selected: wall.selected,
                })
                .collect(),
            unit: unit.to_string(),
        }
    }
}

impl fmt::Display for DetailsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Walls Summary")?;
        writeln!(f, "Total Walls: {}", self.summary.count)?;
        writeln!(f, "Selected Walls: {}", self.summary.selected_count)?;
        writeln!(f, "Total Length: {}", format_length(self.summary.total_length, &self.unit))?;
        if !self.walls.is_empty() {
            writeln!(f)?;
            writeln!(f, "Individual Walls:")?;
            for line in &self.walls {
                write!(f, "Wall {}: {}", line.index, format_length(line.length, &self.unit))?;
                if line.selected {
                    write!(f, " (Selected)")?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ButtonState {
    pub label: String,
    pub enabled: bool,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatingLabel {
    pub text: String,
    pub position: Pos2,
    pub visible: bool,
}

#[derive(Debug)]
pub struct HostState {
    pub viewport: Rect,
    pub details: Option<DetailsReport>,
    pub details_updates: usize,
    pub buttons: BTreeMap<ButtonRole, ButtonState>,
    pub labels: BTreeMap<LabelId, FloatingLabel>,
    next_label: u64,
}

pub type SharedHost = Arc<RwLock<HostState>>;

impl HostState {
    pub fn new(viewport: Rect) -> Self {
        Self {
            viewport,
            details: None,
            details_updates: 0,
            buttons: BTreeMap::new(),
            labels: BTreeMap::new(),
            next_label: 0,
        }
    }

    pub fn shared(viewport: Rect) -> SharedHost {
        Arc::new(RwLock::new(Self::new(viewport)))
    }

    pub fn button(&self, role: ButtonRole) -> Option<&ButtonState> {
        self.buttons.get(&role)
    }

    pub fn visible_labels(&self) -> impl Iterator<Item = &FloatingLabel> {
        self.labels.values().filter(|l| l.visible)
    }
}

pub struct HostContainer(pub SharedHost);

impl Container for HostContainer {
    fn client_rect(&self) -> Rect {
        self.0.read().viewport
    }
}

pub struct HostDetails(pub SharedHost);

impl DetailsPanel for HostDetails {
    fn show(&mut self, report: &DetailsReport) {
        let mut host = self.0.write();
        host.details = Some(report.clone());
        host.details_updates += 1;
    }
}

pub struct HostButton {
    pub host: SharedHost,
    pub role: ButtonRole,
}

impl ActionButton for HostButton {
    fn set_label(&mut self, label: &str) {
        self.host.write().buttons.entry(self.role).or_default().label = label.to_string();
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.host.write().buttons.entry(self.role).or_default().enabled = enabled;
    }

    fn set_active(&mut self, active: bool) {
        self.host.write().buttons.entry(self.role).or_default().active = active;
    }
}

pub struct HostLabels(pub SharedHost);

impl LabelLayer for HostLabels {
    fn create(&mut self, text: &str) -> LabelId {
        let mut host = self.0.write();
        let id = LabelId(host.next_label);
        host.next_label += 1;
        host.labels.insert(
            id,
            FloatingLabel {
                text: text.to_string(),
                position: Pos2::ZERO,
                visible: true,
            },
        );
        id
    }

    fn set_text(&mut self, id: LabelId, text: &str) {
        if let Some(label) = self.0.write().labels.get_mut(&id) {
            label.text = text.to_string();
        }
    }

    fn set_position(&mut self, id: LabelId, position: Pos2) {
        if let Some(label) = self.0.write().labels.get_mut(&id) {
            label.position = position;
        }
    }

    fn set_visible(&mut self, id: LabelId, visible: bool) {
        if let Some(label) = self.0.write().labels.get_mut(&id) {
            label.visible = visible;
        }
    }

    fn remove(&mut self, id: LabelId) {
        self.0.write().labels.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_report_text() {
        let mut doc = Document::new();
        let a = doc.create_wall(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)).unwrap();
        doc.create_wall(Vec3::ZERO, Vec3::new(0.0, 2.5, 0.0)).unwrap();
        doc.set_selection(&[a.id()], true);
        let text = DetailsReport::from_document(&doc, "m").to_string();
        assert_eq!(
            text,
            "Walls Summary\nTotal Walls: 2\nSelected Walls: 1\nTotal Length: 12.50 m\n\n\
             Individual Walls:\nWall 1: 10.00 m (Selected)\nWall 2: 2.50 m\n"
        );
    }

    #[test]
    fn test_empty_report_has_no_listing() {
        let text = DetailsReport::from_document(&Document::new(), "m").to_string();
        assert!(!text.contains("Individual Walls"));
        assert!(text.contains("Total Length: 0.00 m"));
    }

    #[test]
    fn test_shared_bindings_write_through() {
        let host = HostState::shared(Rect::from_min_size(Pos2::ZERO, egui::vec2(640.0, 480.0)));
        let mut bindings = HostBindings::shared(&host);
        assert_eq!(bindings.container.as_ref().unwrap().client_rect().width(), 640.0);

        let labels = bindings.labels.as_mut().unwrap();
        let id = labels.create("1.00 m");
        labels.set_visible(id, false);
        assert_eq!(host.read().visible_labels().count(), 0);
        labels.remove(id);
        assert!(host.read().labels.is_empty());

        let delete = bindings.buttons.get_mut(&ButtonRole::Delete).unwrap();
        delete.set_label("Delete Wall");
        delete.set_enabled(false);
        assert_eq!(
            host.read().button(ButtonRole::Delete),
            Some(&ButtonState { label: "Delete Wall".into(), enabled: false, active: false })
        );
    }
}
