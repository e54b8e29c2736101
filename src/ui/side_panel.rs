// src/ui/side_panel.rs

use std::sync::Arc;
use eframe::egui::{self, Color32, Context, RichText, Ui};
use parking_lot::RwLock;

use crate::editor::host::{ButtonRole, ButtonState, SharedHost};
use crate::editor::Viewer;

const ACTIVE_FILL: Color32 = Color32::from_rgb(0x4c, 0xaf, 0x50);

/// Manages the left-side panel with the action buttons and the wall details.
pub struct SidePanel {
    viewer: Arc<RwLock<Viewer>>,
    host: SharedHost,
    pub show_side_panel: bool,
}

impl SidePanel {
    pub fn new(viewer: Arc<RwLock<Viewer>>, host: SharedHost) -> Self {
        Self {
            viewer,
            host,
            show_side_panel: true,
        }
    }

    /// Called each frame, updates the side panel UI if it's visible.
    pub fn update(&mut self, ctx: &Context) {
        if !self.show_side_panel {
            return;
        }

        egui::SidePanel::left("tools_panel")
            .default_width(250.0)
            .resizable(true)
            .show(ctx, |ui| {
                self.show_actions(ui);
                ui.separator();
                self.show_camera(ui);
                ui.separator();
                self.show_details(ui);
            });
    }

    fn show_actions(&self, ui: &mut Ui) {
        ui.heading("Walls");

        ui.horizontal(|ui| {
            if self.button(ui, ButtonRole::PlanView) {
                self.viewer.write().set_view(true);
            }
            if self.button(ui, ButtonRole::ElevationView) {
                self.viewer.write().set_view(false);
            }
        });
        if self.button(ui, ButtonRole::DrawMode) {
            self.viewer.write().toggle_draw_mode();
        }
        if self.button(ui, ButtonRole::MultiSelect) {
            self.viewer.write().toggle_multi_select();
        }
        if self.button(ui, ButtonRole::Delete) {
            self.viewer.write().delete_selected();
        }
    }

    fn show_camera(&self, ui: &mut Ui) {
        ui.heading("Camera");
        ui.horizontal(|ui| {
            if ui.button("Reset").clicked() {
                self.viewer.write().reset_view();
            }
            if ui.button("Zoom to Fit").clicked() {
                self.viewer.write().zoom_to_fit();
            }
        });
    }

    fn show_details(&self, ui: &mut Ui) {
        let report = self.host.read().details.as_ref().map(|d| d.to_string());
        match report {
            Some(text) => {
                ui.label(RichText::new(text).monospace());
            }
            None => {
                ui.label("No walls yet.");
            }
        }
    }

    /// Draws the button as the viewer last left it. Returns whether it was clicked.
    fn button(&self, ui: &mut Ui, role: ButtonRole) -> bool {
        // The host lock is released before the caller touches the viewer.
        let state = self.host.read().button(role).cloned().unwrap_or_else(|| ButtonState {
            label: format!("{role:?}"),
            enabled: false,
            active: false,
        });
        let mut button = egui::Button::new(state.label.as_str());
        if state.active {
            button = button.fill(ACTIVE_FILL);
        }
        ui.add_enabled(state.enabled, button).clicked()
    }
}
