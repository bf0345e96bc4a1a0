//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only, one tick per frame
//! - No randomness
//! - No rendering or platform dependencies

pub mod collision;
pub mod mode;
pub mod physics;
pub mod sensor;
pub mod state;
pub mod tick;
pub mod tiles;

pub use collision::{
    AirMotion, Contact, PushActivation, SensorId, ceiling_sensors, ground_sensors, push_sensors,
    select_nearest,
};
pub use mode::{CollisionMode, SensorContext, mode_from_angle, snap_to_cardinal};
pub use sensor::{SensorDirection, SensorResult, cast};
pub use state::{Actor, Facing};
pub use tick::{TickInput, advance, advance_with};
pub use tiles::{LevelCollision, RawTileValue, TileGrid, TileProfile, TileProfileStore, TileRef};
