//! Movement integration
//!
//! Ground speed drives the actor while grounded; velocity while airborne.
//! All functions take the character's tuning explicitly.

use glam::Vec2;

use super::state::{Actor, Facing};
use crate::tuning::CharacterTuning;
use crate::{cos_deg, normalize_angle, sign, sin_deg};

/// Slope factor below which a stopped actor is left alone
pub const SLOPE_IDLE_THRESHOLD: f32 = 0.05078125;
/// Air drag only applies while rising slower than this
pub const AIR_DRAG_APEX: f32 = -4.0;
/// Minimum |x speed| affected by air drag
pub const AIR_DRAG_MIN_SPEED: f32 = 0.125;
/// Degrees per tick the airborne angle relaxes toward 0
pub const AIR_ANGLE_RELAX: f32 = 2.8125;

/// Angle band (inclusive) where slow actors slip
const SLIP_BAND: (f32, f32) = (35.0, 326.0);
/// Angle band (inclusive) where slow actors fall off entirely
const FALL_BAND: (f32, f32) = (69.0, 293.0);

/// Result of the slip check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlipOutcome {
    /// Nothing happened
    Stable,
    /// Control lock was already running
    Locked,
    /// Nudged downhill and control-locked
    Slipped,
    /// Detached from the surface
    Fell,
}

/// Velocity for a ground speed on a surface angle
#[inline]
pub fn ground_velocity(ground_speed: f32, angle: f32) -> Vec2 {
    Vec2::new(ground_speed * cos_deg(angle), -ground_speed * sin_deg(angle))
}

/// Pull ground speed along the slope
pub fn apply_slope_factor(actor: &mut Actor, tuning: &CharacterTuning) {
    let sine = sin_deg(actor.ground_angle);
    let factor = if actor.rolling {
        if sign(actor.ground_speed) == sign(sine) {
            tuning.slope_factor_roll_up
        } else {
            tuning.slope_factor_roll_down
        }
    } else {
        tuning.slope_factor
    };

    let pull = factor * sine;
    if actor.ground_speed == 0.0 && pull.abs() < SLOPE_IDLE_THRESHOLD {
        return;
    }
    actor.ground_speed -= pull;
}

/// Walking response to left/right input
pub fn apply_ground_input(actor: &mut Actor, tuning: &CharacterTuning, left: bool, right: bool) {
    let speed = actor.ground_speed;
    actor.ground_speed = match (left, right) {
        (true, false) => {
            if speed > 0.0 {
                let slowed = speed - tuning.deceleration;
                if slowed <= 0.0 { -tuning.turn_speed } else { slowed }
            } else {
                actor.facing = Facing::Left;
                if speed > -tuning.top_speed {
                    (speed - tuning.acceleration).max(-tuning.top_speed)
                } else {
                    speed
                }
            }
        }
        (false, true) => {
            if speed < 0.0 {
                let slowed = speed + tuning.deceleration;
                if slowed >= 0.0 { tuning.turn_speed } else { slowed }
            } else {
                actor.facing = Facing::Right;
                if speed < tuning.top_speed {
                    (speed + tuning.acceleration).min(tuning.top_speed)
                } else {
                    speed
                }
            }
        }
        _ => speed - speed.abs().min(tuning.friction) * sign(speed),
    };
}

/// Curl into a roll when down is held at speed
pub fn try_start_roll(actor: &mut Actor, tuning: &CharacterTuning, input: RollInput) -> bool {
    if actor.rolling
        || !input.down
        || input.left
        || input.right
        || actor.ground_speed.abs() < tuning.roll_min_speed
    {
        return false;
    }
    actor.rolling = true;
    actor.set_radii(tuning.rolling);
    log::debug!("Rolling at speed {}", actor.ground_speed);
    true
}

/// Directional input relevant to rolling
#[derive(Debug, Clone, Copy, Default)]
pub struct RollInput {
    pub left: bool,
    pub right: bool,
    pub down: bool,
}

/// Rolling response: input only brakes, friction always applies
pub fn apply_roll_input(actor: &mut Actor, tuning: &CharacterTuning, left: bool, right: bool) {
    let mut speed = actor.ground_speed;
    if left && speed > 0.0 {
        speed = (speed - tuning.roll_deceleration).max(0.0);
    } else if right && speed < 0.0 {
        speed = (speed + tuning.roll_deceleration).min(0.0);
    }
    speed -= speed.abs().min(tuning.roll_friction) * sign(speed);
    actor.ground_speed = speed.clamp(-tuning.roll_top_speed, tuning.roll_top_speed);

    if actor.ground_speed.abs() < tuning.unroll_speed {
        actor.rolling = false;
        actor.set_radii(tuning.standing);
        log::debug!("Unrolled");
    }
}

/// Slip or fall off steep surfaces when too slow
pub fn apply_slip(actor: &mut Actor, tuning: &CharacterTuning) -> SlipOutcome {
    if actor.control_lock > 0 {
        actor.control_lock -= 1;
        return SlipOutcome::Locked;
    }

    let angle = normalize_angle(actor.ground_angle);
    let in_band = |(low, high): (f32, f32)| angle >= low && angle <= high;
    if actor.ground_speed.abs() >= tuning.slip_speed || !in_band(SLIP_BAND) {
        return SlipOutcome::Stable;
    }

    actor.control_lock = tuning.slip_lock_ticks;
    if in_band(FALL_BAND) {
        actor.detach();
        return SlipOutcome::Fell;
    }

    if angle < 180.0 {
        actor.ground_speed -= tuning.slip_nudge;
    } else {
        actor.ground_speed += tuning.slip_nudge;
    }
    SlipOutcome::Slipped
}

/// Leave the ground with the jump impulse directed away from the surface
///
/// With a negative jump force the impulse is `vx += J·sinθ`, `vy += J·cosθ`.
/// Writing the x term as `vx -= J·sinθ` agrees on flat ground but would throw
/// an actor on a wall into the wall, so the x term follows the surface normal.
pub fn jump(actor: &mut Actor, tuning: &CharacterTuning) {
    let angle = actor.ground_angle;
    let mut velocity = ground_velocity(actor.ground_speed, angle);
    velocity.x += tuning.jump_force * sin_deg(angle);
    velocity.y += tuning.jump_force * cos_deg(angle);

    actor.velocity = velocity;
    actor.grounded = false;
    actor.jumping = true;
    actor.rolling = true;
    actor.set_radii(tuning.radii(true));
    log::debug!("Jump from angle {} with velocity {:?}", angle, velocity);
}

/// Ground speed gained when landing on a floor at `angle`
pub fn landing_ground_speed(velocity: Vec2, angle: f32) -> f32 {
    let angle = normalize_angle(angle);
    let horizontal = velocity.x.abs() >= velocity.y.abs();
    let downhill = -sign(sin_deg(angle));

    if angle <= 23.0 || angle >= 339.0 {
        velocity.x
    } else if angle <= 45.0 || angle >= 316.0 {
        if horizontal { velocity.x } else { velocity.y * 0.5 * downhill }
    } else if angle <= 75.0 || angle >= 285.0 {
        if horizontal { velocity.x } else { velocity.y * downhill }
    } else {
        velocity.y * downhill
    }
}

/// Ground speed gained when attaching to a ceiling at `angle`
pub fn ceiling_landing_ground_speed(velocity: Vec2, angle: f32) -> f32 {
    velocity.y * -sign(sin_deg(angle))
}

/// Whether a ceiling at this angle is steep enough to run on
pub fn is_ceiling_landable(angle: f32) -> bool {
    let angle = normalize_angle(angle);
    (91.0..=135.0).contains(&angle) || (225.0..=269.0).contains(&angle)
}

/// Air control toward the held direction, capped at top speed
pub fn apply_air_input(actor: &mut Actor, tuning: &CharacterTuning, left: bool, right: bool) {
    let vx = actor.velocity.x;
    match (left, right) {
        (true, false) => {
            actor.facing = Facing::Left;
            if vx > -tuning.top_speed {
                actor.velocity.x = (vx - tuning.air_acceleration).max(-tuning.top_speed);
            }
        }
        (false, true) => {
            actor.facing = Facing::Right;
            if vx < tuning.top_speed {
                actor.velocity.x = (vx + tuning.air_acceleration).min(tuning.top_speed);
            }
        }
        _ => {}
    }
}

pub fn apply_gravity(actor: &mut Actor, tuning: &CharacterTuning) {
    actor.velocity.y = (actor.velocity.y + tuning.gravity).min(tuning.max_fall_speed);
}

/// Horizontal drag near the top of a jump arc
pub fn apply_air_drag(actor: &mut Actor) {
    let Vec2 { x: vx, y: vy } = actor.velocity;
    if vy < 0.0 && vy > AIR_DRAG_APEX && vx.abs() >= AIR_DRAG_MIN_SPEED {
        actor.velocity.x -= (vx / AIR_DRAG_MIN_SPEED).trunc() / 256.0;
    }
}

/// Cap upward speed once the jump button is let go
pub fn apply_jump_release(actor: &mut Actor, tuning: &CharacterTuning, jump_held: bool) {
    if actor.jumping && !jump_held && actor.velocity.y < tuning.jump_release {
        actor.velocity.y = tuning.jump_release;
    }
}

/// Rotate the airborne angle back toward upright
pub fn relax_air_angle(actor: &mut Actor) {
    let angle = normalize_angle(actor.ground_angle);
    actor.ground_angle = if angle == 0.0 {
        0.0
    } else if angle < 180.0 {
        (angle - AIR_ANGLE_RELAX).max(0.0)
    } else if angle + AIR_ANGLE_RELAX >= 360.0 {
        0.0
    } else {
        angle + AIR_ANGLE_RELAX
    };
}
