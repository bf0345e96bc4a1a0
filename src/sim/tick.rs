//! Fixed timestep simulation tick
//!
//! Advances one actor by one frame. Grounded and airborne phases run fixed
//! step sequences; switching between them happens within the tick.

use serde::{Deserialize, Serialize};

use super::collision::{
    AirMotion, FLAT_PUSH_OFFSET, PushActivation, ceiling_sensors, ground_sensors, push_sensors,
};
use super::mode::{CollisionMode, SensorContext, mode_from_angle, snap_to_cardinal};
use super::physics::{self, RollInput, SlipOutcome};
use super::sensor::{SensorDirection, SensorResult};
use super::state::Actor;
use super::tiles::TileGrid;
use crate::tuning::CharacterTuning;
use crate::{angle_difference, normalize_angle};

/// Ground sensor hits further than this inside the surface are ignored
pub const MAX_SNAP_DEPTH: f32 = 14.0;
/// Ground sensors never snap further down than this
pub const MAX_SNAP_DISTANCE: f32 = 14.0;
/// Jumping needs at least this much headroom
pub const MIN_JUMP_CLEARANCE: f32 = 6.0;
/// Angle changes larger than this snap to a cardinal instead
pub const MAX_ANGLE_STEP: f32 = 45.0;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Jump went down this tick
    pub jump_pressed: bool,
    /// Jump is being held
    pub jump_held: bool,
}

/// Advance an actor one tick with its own character tuning
pub fn advance(actor: &mut Actor, grid: &TileGrid, input: &TickInput) {
    let tuning = actor.tuning();
    advance_with(actor, grid, input, &tuning);
}

/// Advance an actor one tick with explicit tuning
pub fn advance_with(
    actor: &mut Actor,
    grid: &TileGrid,
    input: &TickInput,
    tuning: &CharacterTuning,
) {
    sanitize(actor);
    if actor.grounded {
        grounded_tick(actor, grid, input, tuning);
    } else {
        airborne_tick(actor, grid, input, tuning);
    }
}

/// Reset corrupted scalar state instead of letting NaN spread
fn sanitize(actor: &mut Actor) {
    if !actor.ground_angle.is_finite() {
        log::warn!("Non-finite ground angle, resetting to 0");
    }
    actor.ground_angle = normalize_angle(actor.ground_angle);

    if !actor.ground_speed.is_finite() {
        log::warn!("Non-finite ground speed, resetting to 0");
        actor.ground_speed = 0.0;
    }
    if !actor.velocity.is_finite() {
        log::warn!("Non-finite velocity {:?}, resetting to 0", actor.velocity);
        actor.velocity = glam::Vec2::ZERO;
    }
}

fn grounded_tick(actor: &mut Actor, grid: &TileGrid, input: &TickInput, tuning: &CharacterTuning) {
    if actor.collision_mode() != CollisionMode::Ceiling {
        physics::apply_slope_factor(actor, tuning);
    }

    let (left, right) = if actor.control_lock > 0 {
        (false, false)
    } else {
        (input.left, input.right)
    };
    if actor.rolling {
        physics::apply_roll_input(actor, tuning, left, right);
    } else {
        physics::apply_ground_input(actor, tuning, left, right);
        physics::try_start_roll(
            actor,
            tuning,
            RollInput {
                left,
                right,
                down: input.down,
            },
        );
    }

    match physics::apply_slip(actor, tuning) {
        SlipOutcome::Fell => log::debug!("Fell off steep surface at angle {}", actor.ground_angle),
        SlipOutcome::Slipped => log::debug!("Slipping at angle {}", actor.ground_angle),
        SlipOutcome::Stable | SlipOutcome::Locked => {}
    }

    if actor.grounded && input.jump_pressed && has_jump_clearance(actor, grid) {
        physics::jump(actor, tuning);
    }

    if actor.grounded {
        actor.velocity = physics::ground_velocity(actor.ground_speed, actor.ground_angle);
        resolve_grounded_push(actor, grid, tuning);
    }

    actor.position += actor.velocity;

    if actor.grounded {
        resolve_ground(actor, grid);
    }
}

fn airborne_tick(actor: &mut Actor, grid: &TileGrid, input: &TickInput, tuning: &CharacterTuning) {
    physics::apply_air_input(actor, tuning, input.left, input.right);
    physics::apply_gravity(actor, tuning);
    physics::apply_air_drag(actor);
    physics::apply_jump_release(actor, tuning, input.jump_held);

    actor.position += actor.velocity;

    let motion = AirMotion::from_velocity(actor.velocity);
    resolve_airborne_push(actor, grid, tuning, motion);
    if motion != AirMotion::MostlyDown {
        resolve_ceiling(actor, grid, tuning);
    }
    if motion != AirMotion::MostlyUp && !actor.grounded {
        resolve_landing(actor, grid, tuning, motion);
    }

    if !actor.grounded {
        physics::relax_air_angle(actor);
    }
}

/// Whether the ceiling leaves room to jump
fn has_jump_clearance(actor: &Actor, grid: &TileGrid) -> bool {
    match ceiling_sensors(grid, actor.position, actor.radii, actor.collision_mode()) {
        Some(contact) if contact.result.distance < MIN_JUMP_CLEARANCE => {
            log::trace!("Jump blocked by ceiling {}", contact.result.distance);
            false
        }
        _ => true,
    }
}

/// Grounded push sensors look at where the actor will be after moving
fn resolve_grounded_push(actor: &mut Actor, grid: &TileGrid, tuning: &CharacterTuning) {
    let active = PushActivation::grounded(actor.ground_angle, actor.ground_speed);
    if active == PushActivation::default() {
        return;
    }
    let mode = mode_from_angle(actor.ground_angle, SensorContext::Push);
    let offset = if mode == CollisionMode::Floor && actor.ground_angle == 0.0 {
        FLAT_PUSH_OFFSET
    } else {
        0.0
    };
    let predicted = actor.position + actor.velocity;
    for contact in push_sensors(grid, predicted, tuning.push_radius, mode, active, offset)
        .into_iter()
        .flatten()
    {
        if contact.result.penetrating() {
            // End the tick flush against the wall
            actor.velocity += contact.direction.vector() * contact.result.distance;
            actor.ground_speed = 0.0;
            log::trace!("{:?} pushed out by {}", contact.sensor, contact.result.distance);
        }
    }
}

/// Airborne push sensors correct the position after moving
fn resolve_airborne_push(
    actor: &mut Actor,
    grid: &TileGrid,
    tuning: &CharacterTuning,
    motion: AirMotion,
) {
    let active = PushActivation::airborne(motion);
    for contact in push_sensors(
        grid,
        actor.position,
        tuning.push_radius,
        CollisionMode::Floor,
        active,
        0.0,
    )
    .into_iter()
    .flatten()
    {
        if !contact.result.penetrating() {
            continue;
        }
        let toward_wall = contact.direction.vector();
        actor.position += toward_wall * contact.result.distance;
        if actor.velocity.x * toward_wall.x > 0.0 {
            actor.velocity.x = 0.0;
        }
        log::trace!("{:?} pushed out by {}", contact.sensor, contact.result.distance);
    }
}

/// Snap to the surface under a grounded actor or let it fall
fn resolve_ground(actor: &mut Actor, grid: &TileGrid) {
    let mode = actor.collision_mode();
    let Some(contact) = ground_sensors(grid, actor.position, actor.radii, mode) else {
        actor.detach();
        return;
    };

    let distance = contact.result.distance;
    let axis_speed = if mode.is_horizontal() {
        actor.velocity.x.abs()
    } else {
        actor.velocity.y.abs()
    };
    if distance > (axis_speed + 4.0).min(MAX_SNAP_DISTANCE) {
        actor.detach();
        return;
    }
    if distance < -MAX_SNAP_DEPTH {
        return;
    }

    actor.position += mode.down().vector() * distance;
    actor.ground_angle = next_ground_angle(actor.ground_angle, &contact.result);
}

/// Angle to adopt from a ground contact
fn next_ground_angle(previous: f32, result: &SensorResult) -> f32 {
    if result.flagged || angle_difference(result.angle, previous) > MAX_ANGLE_STEP {
        snap_to_cardinal(previous)
    } else {
        result.angle
    }
}

/// Ceiling contact while airborne: attach to steep ceilings, else bonk
fn resolve_ceiling(actor: &mut Actor, grid: &TileGrid, tuning: &CharacterTuning) {
    let Some(contact) = ceiling_sensors(grid, actor.position, actor.radii, CollisionMode::Floor)
    else {
        return;
    };
    if !contact.result.penetrating() {
        return;
    }

    actor.position += SensorDirection::Up.vector() * contact.result.distance;
    let angle = contact_angle(&contact.result);
    if actor.velocity.y < 0.0 && physics::is_ceiling_landable(angle) {
        actor.ground_speed = physics::ceiling_landing_ground_speed(actor.velocity, angle);
        attach(actor, tuning, angle);
    } else if actor.velocity.y < 0.0 {
        actor.velocity.y = 0.0;
    }
}

/// Floor contact while airborne
fn resolve_landing(
    actor: &mut Actor,
    grid: &TileGrid,
    tuning: &CharacterTuning,
    motion: AirMotion,
) {
    let Some(contact) = ground_sensors(grid, actor.position, actor.radii, CollisionMode::Floor)
    else {
        return;
    };
    let distance = contact.result.distance;
    if distance >= 0.0 {
        return;
    }

    let eligible = if motion.is_horizontal() {
        actor.velocity.y >= 0.0
    } else {
        distance >= -(actor.velocity.y + 8.0)
    };
    if !eligible {
        return;
    }

    actor.position += SensorDirection::Down.vector() * distance;
    let angle = contact_angle(&contact.result);
    actor.ground_speed = physics::landing_ground_speed(actor.velocity, angle);
    attach(actor, tuning, angle);
}

#[inline]
fn contact_angle(result: &SensorResult) -> f32 {
    if result.flagged {
        snap_to_cardinal(result.angle)
    } else {
        result.angle
    }
}

/// Become grounded on a surface at `angle`, restoring standing posture
fn attach(actor: &mut Actor, tuning: &CharacterTuning, angle: f32) {
    actor.ground_angle = angle;
    actor.grounded = true;
    actor.jumping = false;
    if actor.rolling {
        actor.rolling = false;
        actor.set_radii(tuning.radii(false));
    }
    log::debug!(
        "Landed at {:?} on angle {} with ground speed {}",
        actor.position,
        angle,
        actor.ground_speed
    );
}
