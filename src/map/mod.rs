// src/map/mod.rs
pub mod wall;

pub use wall::{Wall, WallError, WallId};
