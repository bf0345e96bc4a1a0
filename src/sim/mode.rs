//! Collision modes
//!
//! The ground angle picks one of four orientations. Ground/ceiling sensors
//! and push sensors switch at slightly different angles so the two sensor
//! sets never flip modes on the same tick.

use serde::{Deserialize, Serialize};

use super::sensor::SensorDirection;
use crate::normalize_angle;

/// Orientation of the actor relative to the surface it stands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CollisionMode {
    #[default]
    Floor,
    RightWall,
    Ceiling,
    LeftWall,
}

/// Which threshold table to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorContext {
    /// A/B ground and C/D ceiling sensors
    Ground,
    /// E/F push sensors
    Push,
}

/// Resolve the collision mode for an angle in degrees
pub fn mode_from_angle(angle: f32, context: SensorContext) -> CollisionMode {
    let angle = normalize_angle(angle);
    match context {
        SensorContext::Ground => {
            if angle <= 45.0 || angle >= 315.0 {
                CollisionMode::Floor
            } else if angle < 135.0 {
                CollisionMode::RightWall
            } else if angle <= 225.0 {
                CollisionMode::Ceiling
            } else {
                CollisionMode::LeftWall
            }
        }
        SensorContext::Push => {
            if angle <= 44.0 || angle >= 316.0 {
                CollisionMode::Floor
            } else if angle <= 135.0 {
                CollisionMode::RightWall
            } else if angle < 225.0 {
                CollisionMode::Ceiling
            } else {
                CollisionMode::LeftWall
            }
        }
    }
}

/// Snap an angle to the cardinal of its ground mode
///
/// Ties follow the ground table, so 45° snaps to 0° and 135° to 180°.
pub fn snap_to_cardinal(angle: f32) -> f32 {
    mode_from_angle(angle, SensorContext::Ground).cardinal_angle()
}

impl CollisionMode {
    /// Angle of a perfectly flat surface in this mode
    pub fn cardinal_angle(self) -> f32 {
        match self {
            CollisionMode::Floor => 0.0,
            CollisionMode::RightWall => 90.0,
            CollisionMode::Ceiling => 180.0,
            CollisionMode::LeftWall => 270.0,
        }
    }

    /// Direction the ground sensors cast (toward the surface)
    pub fn down(self) -> SensorDirection {
        match self {
            CollisionMode::Floor => SensorDirection::Down,
            CollisionMode::RightWall => SensorDirection::Right,
            CollisionMode::Ceiling => SensorDirection::Up,
            CollisionMode::LeftWall => SensorDirection::Left,
        }
    }

    /// Direction of travel for positive ground speed
    pub fn right(self) -> SensorDirection {
        match self {
            CollisionMode::Floor => SensorDirection::Right,
            CollisionMode::RightWall => SensorDirection::Up,
            CollisionMode::Ceiling => SensorDirection::Left,
            CollisionMode::LeftWall => SensorDirection::Down,
        }
    }

    /// Whether ground speed moves the actor along the x axis
    pub fn is_horizontal(self) -> bool {
        matches!(self, CollisionMode::Floor | CollisionMode::Ceiling)
    }
}
