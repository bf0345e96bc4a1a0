//! Sonic Physics - tile sensor platformer physics
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tile grid, sensors, collision modes, integrator, tick)
//! - `tuning`: Per-character physics constants
//! - `error`: Tile/level data loading errors

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::LoadError;
pub use tuning::{CharacterKind, CharacterTuning, Radii};

/// Simulation configuration constants
pub mod consts {
    /// Edge length of a collision tile in world units
    pub const TILE_SIZE: i32 = 16;
    /// Fixed simulation timestep (one tick per 60 Hz frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Distance reported by a sensor that found no surface
    pub const SENSOR_EXTENSION_LIMIT: f32 = 32.0;

    /// Raw tile layout (Tiled-compatible): flip flags in the top three bits
    pub const TILE_ID_MASK: u32 = (1 << 29) - 1;
    pub const FLIP_H_BIT: u32 = 1 << 31;
    pub const FLIP_V_BIT: u32 = 1 << 30;
    pub const FLIP_D_BIT: u32 = 1 << 29;
}

/// Normalize an angle in degrees to [0, 360)
///
/// Non-finite input (NaN, ±inf) resets to 0 instead of propagating.
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut angle = angle % 360.0;
    if angle < 0.0 {
        angle += 360.0;
    }
    // -1e-8 + 360.0 rounds up to 360.0
    if angle >= 360.0 {
        angle -= 360.0;
    }
    angle
}

/// Sine of an angle given in degrees
#[inline]
pub fn sin_deg(angle: f32) -> f32 {
    angle.to_radians().sin()
}

/// Cosine of an angle given in degrees
#[inline]
pub fn cos_deg(angle: f32) -> f32 {
    angle.to_radians().cos()
}

/// Shortest absolute difference between two angles in degrees, in [0, 180]
pub fn angle_difference(a: f32, b: f32) -> f32 {
    let diff = (normalize_angle(a) - normalize_angle(b)).abs();
    diff.min(360.0 - diff)
}

/// Sign of a value with zero mapping to zero (`f32::signum` maps 0 to 1)
#[inline]
pub fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_angle_wraps() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert_eq!(normalize_angle(360.0), 0.0);
        assert_eq!(normalize_angle(-90.0), 270.0);
        assert_eq!(normalize_angle(725.0), 5.0);
        assert_eq!(normalize_angle(f32::NAN), 0.0);
        assert_eq!(normalize_angle(f32::INFINITY), 0.0);
    }

    #[test]
    fn test_angle_difference_wraps() {
        assert_eq!(angle_difference(350.0, 10.0), 20.0);
        assert_eq!(angle_difference(90.0, 270.0), 180.0);
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent_and_in_range(angle in -100_000.0f32..100_000.0) {
            let once = normalize_angle(angle);
            prop_assert!((0.0..360.0).contains(&once));
            prop_assert_eq!(normalize_angle(once), once);
        }
    }
}
