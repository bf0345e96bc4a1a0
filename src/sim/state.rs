//! Actor state
//!
//! Owned by gameplay code and mutated in place once per tick by `advance`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::mode::{CollisionMode, SensorContext, mode_from_angle};
use super::physics::ground_velocity;
use crate::tuning::{CharacterKind, CharacterTuning, Radii};

/// Which way the actor faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// A simulated platformer character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Center of the collision box (world units, +y down)
    pub position: Vec2,
    pub velocity: Vec2,
    /// Speed along the surface; authoritative while grounded
    pub ground_speed: f32,
    /// Surface angle in degrees, [0, 360)
    pub ground_angle: f32,
    pub grounded: bool,
    pub jumping: bool,
    pub rolling: bool,
    pub facing: Facing,
    pub character: CharacterKind,
    pub super_form: bool,
    /// Current collision half-extents
    pub radii: Radii,
    /// Ticks left during which left/right input is ignored
    pub control_lock: u32,
}

impl Actor {
    /// Spawn an airborne actor at rest
    pub fn new(character: CharacterKind, position: Vec2) -> Self {
        let radii = CharacterTuning::for_character(character, false).standing;
        Self {
            position,
            velocity: Vec2::ZERO,
            ground_speed: 0.0,
            ground_angle: 0.0,
            grounded: false,
            jumping: false,
            rolling: false,
            facing: Facing::default(),
            character,
            super_form: false,
            radii,
            control_lock: 0,
        }
    }

    /// Spawn an actor standing on flat ground, with its feet at `feet_y`
    pub fn standing(character: CharacterKind, x: f32, feet_y: f32) -> Self {
        let mut actor = Self::new(character, Vec2::ZERO);
        actor.position = Vec2::new(x, feet_y - actor.radii.height);
        actor.grounded = true;
        actor
    }

    /// Reset motion and posture, keeping character and form
    pub fn reset(&mut self, position: Vec2) {
        *self = Self {
            super_form: self.super_form,
            ..Self::new(self.character, position)
        };
        self.radii = self.tuning().standing;
    }

    /// Constants for the current character and form
    pub fn tuning(&self) -> CharacterTuning {
        CharacterTuning::for_character(self.character, self.super_form)
    }

    /// Mode derived from the ground angle
    pub fn collision_mode(&self) -> CollisionMode {
        mode_from_angle(self.ground_angle, SensorContext::Ground)
    }

    #[inline]
    pub fn is_airborne(&self) -> bool {
        !self.grounded
    }

    /// Change the collision box, keeping the feet in place while grounded
    pub fn set_radii(&mut self, radii: Radii) {
        if self.grounded {
            let shift = self.radii.height - radii.height;
            self.position += self.collision_mode().down().vector() * shift;
        }
        self.radii = radii;
    }

    /// Leave the ground, carrying ground speed over as velocity
    pub fn detach(&mut self) {
        self.velocity = ground_velocity(self.ground_speed, self.ground_angle);
        self.grounded = false;
        log::debug!(
            "Detached at {:?} (speed {}, angle {})",
            self.position,
            self.ground_speed,
            self.ground_angle
        );
    }
}
