// src/ui/mod.rs
pub mod central_panel;
pub mod main_window;
pub mod side_panel;
pub mod status_bar;
pub mod texture;

pub use main_window::MainWindow;
