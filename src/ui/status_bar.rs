// src/ui/status_bar.rs

use std::sync::Arc;
use eframe::egui::{self, Context};
use parking_lot::RwLock;

use crate::editor::tools::Mode;
use crate::editor::Viewer;

pub struct StatusBar {
    viewer: Arc<RwLock<Viewer>>,
}

impl StatusBar {
    pub fn new(viewer: Arc<RwLock<Viewer>>) -> Self {
        Self { viewer }
    }

    pub fn update(&mut self, ctx: &Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let viewer = self.viewer.read(); // Keep the read lock short.

            let tool = match viewer.mode() {
                Mode::Drawing { pending_start: Some(_) } => format!("{} (placing end)", viewer.tool_name()),
                _ => viewer.tool_name().to_string(),
            };
            let coord_label = viewer
                .pointer_world()
                .map(|p| format!("({:.2}, {:.2}, {:.2})", p.x, p.y, p.z))
                .unwrap_or_default();

            ui.horizontal(|ui| {
                ui.label(viewer.view().name());
                ui.label(coord_label);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("Tool: {tool}"));
                });
            });
        });
    }
}
