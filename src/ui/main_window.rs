//! # Main Window Module
//!
//! The desktop application around the viewer. `MainWindow` owns the shared
//! host state the viewer writes its UI text into, and lays out the side
//! panel, the status bar and the central viewport each frame.

use eframe::egui::{self, Pos2, Rect, Vec2};
use log::info;
use parking_lot::RwLock;
use std::sync::Arc;

use super::central_panel::CentralPanel;
use super::side_panel::SidePanel;
use super::status_bar::StatusBar;
use super::texture::{ImageTextureLoader, SharedTexture, WallTexture};
use crate::editor::host::{HostBindings, HostState};
use crate::editor::{EditorSettings, Viewer, ViewerError};

/// Viewport size assumed until the first frame reports the real one.
const INITIAL_VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

pub struct MainWindow {
    side_panel: SidePanel,
    status_bar: StatusBar,
    central_panel: CentralPanel,
}

impl MainWindow {
    pub fn new(settings: EditorSettings) -> Result<Self, ViewerError> {
        let host = HostState::shared(Rect::from_min_size(Pos2::ZERO, INITIAL_VIEWPORT));
        let texture: SharedTexture = Arc::new(RwLock::new(WallTexture::default()));

        let mut bindings = HostBindings::shared(&host);
        bindings.textures = Some(Box::new(ImageTextureLoader::new(texture.clone())));

        let viewer = Arc::new(RwLock::new(Viewer::with_retained_scenes(settings, bindings)?));
        info!("Main window created");

        Ok(Self {
            side_panel: SidePanel::new(viewer.clone(), host.clone()),
            status_bar: StatusBar::new(viewer.clone()),
            central_panel: CentralPanel::new(viewer, host, texture),
        })
    }
}

impl eframe::App for MainWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Side and bottom panels claim their space before the central panel.
        self.side_panel.update(ctx);
        self.status_bar.update(ctx);
        self.central_panel.update(ctx);
    }
}
