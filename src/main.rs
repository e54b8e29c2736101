#![warn(non_snake_case)]
//! # floor_ed Main Entry Point
//!
//! floor_ed is an interactive floor-plan editor. Walls are drawn on an
//! orthographic 2D plan and inspected as extruded volumes in a perspective
//! 3D elevation. This file loads the editor settings, builds the main window
//! and runs the eframe event loop.
//!
//! Settings are read from the JSON file named by `FLOOR_ED_CONFIG`, falling
//! back to `floor_ed.json` in the working directory and then to defaults.

use log::{error, info};
use std::error::Error;

use floor_ed::editor::EditorSettings;
use floor_ed::ui::MainWindow;

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging.
    env_logger::init();
    info!("floor_ed starting...");

    let settings = EditorSettings::from_env().map_err(|err| {
        error!("Could not load settings: {}", err);
        err
    })?;
    let window = MainWindow::new(settings).map_err(|err| {
        error!("Could not create the viewer: {}", err);
        err
    })?;

    eframe::run_native(
        "floor_ed",
        eframe::NativeOptions::default(),
        Box::new(move |_cc| Box::new(window)),
    );
    // run_native returns () so we simply return Ok.
    info!("floor_ed exiting.");
    Ok(())
}
