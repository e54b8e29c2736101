// src/map/wall.rs
use glam::Vec3;
use std::fmt;
use thiserror::Error;

use crate::utils::geometry::{angle_of, distance, midpoint};

/// Stable identifier of a wall. Assigned monotonically, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WallId(pub u64);

impl fmt::Display for WallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wall_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WallError {
    #[error("wall endpoints coincide; zero-length walls are not created")]
    Degenerate,
}

/// A straight wall segment. Geometry is fixed at creation; only the
/// selection flag changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    id: WallId,
    start: Vec3,
    end: Vec3,
    length: f32,
    angle: f32,
    pub selected: bool,
}

impl Wall {
    pub(crate) fn new(id: WallId, start: Vec3, end: Vec3) -> Result<Self, WallError> {
        let length = distance(start, end);
        if length == 0.0 {
            return Err(WallError::Degenerate);
        }
        Ok(Wall {
            id,
            start,
            end,
            length,
            angle: angle_of(start, end),
            selected: false,
        })
    }

    pub fn id(&self) -> WallId {
        self.id
    }

    pub fn start(&self) -> Vec3 {
        self.start
    }

    pub fn end(&self) -> Vec3 {
        self.end
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    /// Plan angle in radians, `(-π, π]`.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn midpoint(&self) -> Vec3 {
        midpoint(self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_wall_derived_fields() {
        let wall = Wall::new(WallId(0), Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)).unwrap();
        assert_approx_eq!(wall.length(), 10.0);
        assert_approx_eq!(wall.angle(), 0.0);
        assert!(!wall.selected);
        assert_eq!(wall.midpoint(), Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_diagonal_wall() {
        let wall = Wall::new(WallId(3), Vec3::new(1.0, 1.0, 0.0), Vec3::new(4.0, 5.0, 0.0)).unwrap();
        assert_approx_eq!(wall.length(), 5.0);
        assert_approx_eq!(wall.angle(), 4f32.atan2(3.0));
    }

    #[test]
    fn test_zero_length_wall_is_rejected() {
        let p = Vec3::new(2.0, 2.0, 0.0);
        assert_eq!(Wall::new(WallId(0), p, p), Err(WallError::Degenerate));
    }

    #[test]
    fn test_wall_id_display() {
        assert_eq!(WallId(7).to_string(), "wall_7");
    }
}
