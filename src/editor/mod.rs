// src/editor/mod.rs

pub mod camera;
pub mod controls;
mod core;
pub mod host;
pub mod picking;
pub mod scene;
pub mod settings;
pub mod sync;
pub mod tools;

pub use self::core::{Renderer, Viewer};
pub use settings::{EditorSettings, SettingsError};

use thiserror::Error;

// --- Enums and Supporting Types ---

/// The two projections of the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// Orthographic top-down editing view.
    Plan,
    /// Perspective view of the extruded walls.
    Elevation,
}

impl ViewKind {
    pub fn name(&self) -> &'static str {
        match self {
            ViewKind::Plan => "2D Plan",
            ViewKind::Elevation => "3D Elevation",
        }
    }
}

#[derive(Debug, Error)]
pub enum ViewerError {
    /// The host provided no container to draw into.
    #[error("no viewport container was provided")]
    MissingContainer,
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
