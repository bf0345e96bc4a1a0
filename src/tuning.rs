//! Data-driven character tuning
//!
//! Constants follow the Sonic Physics Guide, in pixels and pixels-per-frame.
//! A `CharacterTuning` is an immutable value chosen per character and passed
//! into the integrator explicitly.

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Playable character types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CharacterKind {
    #[default]
    Sonic,
    Tails,
    Knuckles,
}

impl CharacterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterKind::Sonic => "Sonic",
            CharacterKind::Tails => "Tails",
            CharacterKind::Knuckles => "Knuckles",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sonic" => Some(CharacterKind::Sonic),
            "tails" | "miles" => Some(CharacterKind::Tails),
            "knuckles" | "knux" => Some(CharacterKind::Knuckles),
            _ => None,
        }
    }
}

/// Collision box half-extents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Radii {
    /// Horizontal distance from center to the A/B (C/D) sensors
    pub width: f32,
    /// Vertical distance from center to the feet (and head)
    pub height: f32,
}

impl Radii {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Per-character physics constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterTuning {
    // === Ground ===
    pub acceleration: f32,
    pub deceleration: f32,
    pub friction: f32,
    pub top_speed: f32,
    /// Ground speed assigned when decelerating through zero
    pub turn_speed: f32,

    // === Slopes ===
    pub slope_factor: f32,
    pub slope_factor_roll_up: f32,
    pub slope_factor_roll_down: f32,

    // === Rolling ===
    pub roll_friction: f32,
    pub roll_deceleration: f32,
    pub roll_top_speed: f32,
    /// Minimum |ground speed| to start a roll
    pub roll_min_speed: f32,
    /// Rolling ends below this |ground speed|
    pub unroll_speed: f32,

    // === Slipping ===
    /// Below this |ground speed| steep slopes make the actor slip
    pub slip_speed: f32,
    /// Control lock applied on slip, in ticks
    pub slip_lock_ticks: u32,
    /// Downhill nudge applied on a slip that doesn't detach
    pub slip_nudge: f32,

    // === Air ===
    pub air_acceleration: f32,
    pub gravity: f32,
    /// Jump impulse along the surface normal (negative = away from surface)
    pub jump_force: f32,
    /// Upward speed cap once jump is released
    pub jump_release: f32,
    pub max_fall_speed: f32,

    // === Size ===
    pub standing: Radii,
    pub rolling: Radii,
    /// Distance from center to the E/F push sensors
    pub push_radius: f32,
}

impl Default for CharacterTuning {
    fn default() -> Self {
        Self::sonic()
    }
}

impl CharacterTuning {
    pub fn sonic() -> Self {
        Self {
            acceleration: 0.046875,
            deceleration: 0.5,
            friction: 0.046875,
            top_speed: 6.0,
            turn_speed: 0.5,

            slope_factor: 0.125,
            slope_factor_roll_up: 0.078125,
            slope_factor_roll_down: 0.3125,

            roll_friction: 0.0234375,
            roll_deceleration: 0.125,
            roll_top_speed: 16.0,
            roll_min_speed: 0.5,
            unroll_speed: 0.5,

            slip_speed: 2.5,
            slip_lock_ticks: 30,
            slip_nudge: 0.5,

            air_acceleration: 0.09375,
            gravity: 0.21875,
            jump_force: -6.5,
            jump_release: -4.0,
            max_fall_speed: 16.0,

            standing: Radii::new(9.0, 19.0),
            rolling: Radii::new(7.0, 14.0),
            push_radius: 10.0,
        }
    }

    pub fn tails() -> Self {
        Self {
            standing: Radii::new(9.0, 15.0),
            ..Self::sonic()
        }
    }

    pub fn knuckles() -> Self {
        Self {
            jump_force: -6.0,
            ..Self::sonic()
        }
    }

    /// Select the constant table for a character, optionally in super form
    pub fn for_character(kind: CharacterKind, super_form: bool) -> Self {
        let base = match kind {
            CharacterKind::Sonic => Self::sonic(),
            CharacterKind::Tails => Self::tails(),
            CharacterKind::Knuckles => Self::knuckles(),
        };
        if !super_form {
            return base;
        }

        match kind {
            CharacterKind::Sonic => Self {
                acceleration: 0.1875,
                deceleration: 1.0,
                top_speed: 10.0,
                air_acceleration: 0.375,
                jump_force: -8.0,
                roll_friction: 0.09375,
                ..base
            },
            CharacterKind::Tails | CharacterKind::Knuckles => Self {
                acceleration: 0.09375,
                deceleration: 0.75,
                top_speed: 8.0,
                air_acceleration: 0.1875,
                roll_friction: 0.046875,
                ..base
            },
        }
    }

    /// Radii for the given posture
    pub fn radii(&self, curled: bool) -> Radii {
        if curled { self.rolling } else { self.standing }
    }

    /// Parse a tuning table from JSON; absent fields fall back to Sonic's values
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let tuning = serde_json::from_str(json)?;
        log::debug!("Loaded character tuning override");
        Ok(tuning)
    }
}
