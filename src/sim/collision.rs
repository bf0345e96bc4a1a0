//! Sensor pairs: ground (A/B), ceiling (C/D) and push (E/F)
//!
//! Sensor anchors are placed from the actor's center using the collision
//! mode's down and right axes, so the same code serves floors, walls and
//! ceilings.

use glam::Vec2;

use super::mode::CollisionMode;
use super::sensor::{SensorDirection, SensorResult, cast};
use super::tiles::TileGrid;
use crate::tuning::Radii;

/// Extra downward offset of the push sensors on perfectly flat ground
pub const FLAT_PUSH_OFFSET: f32 = 8.0;

/// Sensor labels as used by the Sonic Physics Guide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorId {
    /// Left ground sensor
    A,
    /// Right ground sensor
    B,
    /// Left ceiling sensor
    C,
    /// Right ceiling sensor
    D,
    /// Left push sensor
    E,
    /// Right push sensor
    F,
}

/// Winning result of a sensor pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub sensor: SensorId,
    pub direction: SensorDirection,
    pub result: SensorResult,
}

/// Pick the nearer of two results; the first wins exact ties
pub fn select_nearest(first: Contact, second: Contact) -> Option<Contact> {
    match (first.result.found, second.result.found) {
        (false, false) => None,
        (true, false) => Some(first),
        (false, true) => Some(second),
        (true, true) => {
            if second.result.distance < first.result.distance {
                Some(second)
            } else {
                Some(first)
            }
        }
    }
}

fn cast_pair(
    grid: &TileGrid,
    anchors: [(SensorId, Vec2); 2],
    direction: SensorDirection,
) -> Option<Contact> {
    let [first, second] = anchors.map(|(sensor, anchor)| Contact {
        sensor,
        direction,
        result: cast(grid, anchor, direction),
    });
    select_nearest(first, second)
}

/// Cast A and B toward the surface of `mode`
pub fn ground_sensors(
    grid: &TileGrid,
    position: Vec2,
    radii: Radii,
    mode: CollisionMode,
) -> Option<Contact> {
    let down = mode.down().vector();
    let right = mode.right().vector();
    let feet = position + down * radii.height;
    cast_pair(
        grid,
        [
            (SensorId::A, feet - right * radii.width),
            (SensorId::B, feet + right * radii.width),
        ],
        mode.down(),
    )
}

/// Cast C and D away from the surface of `mode`
pub fn ceiling_sensors(
    grid: &TileGrid,
    position: Vec2,
    radii: Radii,
    mode: CollisionMode,
) -> Option<Contact> {
    let down = mode.down().vector();
    let right = mode.right().vector();
    let head = position - down * radii.height;
    cast_pair(
        grid,
        [
            (SensorId::C, head - right * radii.width),
            (SensorId::D, head + right * radii.width),
        ],
        mode.down().opposite(),
    )
}

/// Dominant direction of airborne motion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirMotion {
    MostlyRight,
    MostlyLeft,
    MostlyUp,
    MostlyDown,
}

impl AirMotion {
    pub fn from_velocity(velocity: Vec2) -> Self {
        if velocity.x.abs() >= velocity.y.abs() {
            if velocity.x > 0.0 {
                AirMotion::MostlyRight
            } else {
                AirMotion::MostlyLeft
            }
        } else if velocity.y > 0.0 {
            AirMotion::MostlyDown
        } else {
            AirMotion::MostlyUp
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, AirMotion::MostlyLeft | AirMotion::MostlyRight)
    }
}

/// Which push sensors take part this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PushActivation {
    /// E, on the negative ground-speed side
    pub left: bool,
    /// F, on the positive ground-speed side
    pub right: bool,
}

impl PushActivation {
    /// Grounded: only on mostly horizontal ground, only toward the motion
    pub fn grounded(angle: f32, ground_speed: f32) -> Self {
        let angle = crate::normalize_angle(angle);
        if !(angle <= 90.0 || angle >= 270.0) {
            return Self::default();
        }
        Self {
            left: ground_speed < 0.0,
            right: ground_speed > 0.0,
        }
    }

    /// Airborne: by dominant axis; vertical motion enables both
    pub fn airborne(motion: AirMotion) -> Self {
        match motion {
            AirMotion::MostlyRight => Self {
                left: false,
                right: true,
            },
            AirMotion::MostlyLeft => Self {
                left: true,
                right: false,
            },
            AirMotion::MostlyUp | AirMotion::MostlyDown => Self {
                left: true,
                right: true,
            },
        }
    }
}

/// Cast the active push sensors; inactive ones report `None`
pub fn push_sensors(
    grid: &TileGrid,
    position: Vec2,
    push_radius: f32,
    mode: CollisionMode,
    active: PushActivation,
    offset_down: f32,
) -> [Option<Contact>; 2] {
    let right = mode.right();
    let center = position + mode.down().vector() * offset_down;
    let sensor = |id: SensorId, direction: SensorDirection| {
        let anchor = center + direction.vector() * push_radius;
        Contact {
            sensor: id,
            direction,
            result: cast(grid, anchor, direction),
        }
    };
    [
        active.left.then(|| sensor(SensorId::E, right.opposite())),
        active.right.then(|| sensor(SensorId::F, right)),
    ]
}
