// src/editor/settings.rs

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit settings file.
pub const SETTINGS_ENV_VAR: &str = "FLOOR_ED_CONFIG";
/// Settings file picked up from the working directory when present.
pub const DEFAULT_SETTINGS_FILE: &str = "floor_ed.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Editor preferences. Every field may be omitted from the settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Vertical extent of the plan camera's orthographic frustum.
    pub frustum_size: f32,
    pub plan_camera_position: Vec3,
    pub plan_near: f32,
    pub plan_far: f32,

    pub elevation_fov_degrees: f32,
    pub elevation_camera_position: Vec3,
    pub elevation_near: f32,
    pub elevation_far: f32,

    pub wall_height: f32,
    pub wall_thickness: f32,
    /// Depth of the flat slab drawn under each plan line.
    pub plan_slab_depth: f32,

    /// Offset of the drawing plane along the view's depth axis.
    pub draw_plane_offset: f32,
    /// World distance within which a plan line counts as hit.
    pub line_pick_threshold: f32,

    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub rotate_speed: f32,
    pub damping: bool,

    /// Finishing a segment immediately starts the next one at its end.
    pub chain_drawing: bool,
    /// Entering draw mode from the elevation view switches to the plan.
    pub draw_mode_switches_to_plan: bool,

    pub length_unit: String,
    pub wall_texture: PathBuf,
    pub zoom_fit_margin: f32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            frustum_size: 100.0,
            plan_camera_position: Vec3::new(0.0, 0.0, 5.0),
            plan_near: 1.0,
            plan_far: 100.0,
            elevation_fov_degrees: 35.0,
            elevation_camera_position: Vec3::new(50.0, 50.0, 50.0),
            elevation_near: 0.1,
            elevation_far: 500.0,
            wall_height: 3.0,
            wall_thickness: 0.2,
            plan_slab_depth: 0.01,
            draw_plane_offset: 0.0,
            line_pick_threshold: 1.0,
            pan_speed: 2.0,
            zoom_speed: 1.0,
            rotate_speed: 1.0,
            damping: false,
            chain_drawing: false,
            draw_mode_switches_to_plan: true,
            length_unit: "m".to_string(),
            wall_texture: PathBuf::from("textures/brick.jpg"),
            zoom_fit_margin: 1.1,
        }
    }
}

impl EditorSettings {
    /// Loads and validates settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&text).map_err(|err| match err {
            SettingsError::Parse { source, .. } => SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        Ok(settings)
    }

    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        let settings: EditorSettings =
            serde_json::from_str(text).map_err(|source| SettingsError::Parse {
                path: PathBuf::new(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// `FLOOR_ED_CONFIG` when set, else `floor_ed.json` when it exists,
    /// else the defaults.
    pub fn from_env() -> Result<Self, SettingsError> {
        if let Some(path) = std::env::var_os(SETTINGS_ENV_VAR) {
            return Self::load(Path::new(&path));
        }
        let local = Path::new(DEFAULT_SETTINGS_FILE);
        if local.exists() {
            return Self::load(local);
        }
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let positive = [
            ("frustum_size", self.frustum_size),
            ("wall_height", self.wall_height),
            ("wall_thickness", self.wall_thickness),
            ("plan_slab_depth", self.plan_slab_depth),
            ("line_pick_threshold", self.line_pick_threshold),
            ("plan_near", self.plan_near),
            ("elevation_near", self.elevation_near),
            ("zoom_fit_margin", self.zoom_fit_margin),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(SettingsError::Invalid(format!("{} must be positive, got {}", name, value)));
            }
        }
        if self.plan_far <= self.plan_near {
            return Err(SettingsError::Invalid("plan_far must exceed plan_near".into()));
        }
        if self.elevation_far <= self.elevation_near {
            return Err(SettingsError::Invalid("elevation_far must exceed elevation_near".into()));
        }
        if !(self.elevation_fov_degrees > 0.0 && self.elevation_fov_degrees < 180.0) {
            return Err(SettingsError::Invalid(format!(
                "elevation_fov_degrees must lie in (0, 180), got {}",
                self.elevation_fov_degrees
            )));
        }
        Ok(())
    }
}
