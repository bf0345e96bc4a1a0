//! Single-direction sensor casting against the tile grid
//!
//! A sensor looks at the tile under its anchor. A full tile makes it
//! regress one tile back against the cast direction, an empty tile makes
//! it extend one tile forward. That keeps contact seamless across tile
//! boundaries with at most two lookups per cast.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::tiles::{TileGrid, TileRef};
use crate::consts::{SENSOR_EXTENSION_LIMIT, TILE_SIZE};

/// Largest tile index a sensor will look at, in either direction
const MAX_CELL_INDEX: i32 = 1 << 26;

/// Axis-aligned direction a sensor casts in (screen space, +y is down)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorDirection {
    Down,
    Right,
    Up,
    Left,
}

impl SensorDirection {
    pub fn opposite(self) -> Self {
        match self {
            SensorDirection::Down => SensorDirection::Up,
            SensorDirection::Right => SensorDirection::Left,
            SensorDirection::Up => SensorDirection::Down,
            SensorDirection::Left => SensorDirection::Right,
        }
    }

    /// Unit step in world space
    pub fn vector(self) -> Vec2 {
        match self {
            SensorDirection::Down => Vec2::Y,
            SensorDirection::Right => Vec2::X,
            SensorDirection::Up => Vec2::NEG_Y,
            SensorDirection::Left => Vec2::NEG_X,
        }
    }

    #[inline]
    fn is_vertical(self) -> bool {
        matches!(self, SensorDirection::Down | SensorDirection::Up)
    }

    /// +1 when probing toward increasing coordinates
    #[inline]
    fn sign(self) -> i32 {
        match self {
            SensorDirection::Down | SensorDirection::Right => 1,
            SensorDirection::Up | SensorDirection::Left => -1,
        }
    }
}

/// Outcome of one cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorResult {
    /// Signed distance to the surface: positive ahead, negative embedded
    pub distance: f32,
    /// Surface angle of the tile that produced the hit
    pub angle: f32,
    pub tile_id: u32,
    pub found: bool,
    pub flagged: bool,
}

impl SensorResult {
    pub fn miss() -> Self {
        Self {
            distance: SENSOR_EXTENSION_LIMIT,
            angle: 0.0,
            tile_id: 0,
            found: false,
            flagged: false,
        }
    }

    /// Found and embedded in the surface
    #[inline]
    pub fn penetrating(&self) -> bool {
        self.found && self.distance < 0.0
    }
}

/// A tile examined along the cast axis
#[derive(Debug, Clone, Copy)]
struct Examined {
    /// Tile index along the cast axis
    index: i32,
    tile: TileRef,
    /// Solid depth measured from the far edge (in cast direction)
    depth: i32,
}

/// Cast a sensor from `anchor` in `direction`
pub fn cast(grid: &TileGrid, anchor: Vec2, direction: SensorDirection) -> SensorResult {
    if !anchor.is_finite() {
        return SensorResult::miss();
    }

    let (along, cross) = if direction.is_vertical() {
        (anchor.y, anchor.x)
    } else {
        (anchor.x, anchor.y)
    };
    let size = TILE_SIZE as f32;
    let (along_cell, cross_cell) = ((along / size).floor(), (cross / size).floor());
    // Far outside any level; also keeps the tile arithmetic below from overflowing
    if along_cell.abs() > MAX_CELL_INDEX as f32 || cross_cell.abs() > MAX_CELL_INDEX as f32 {
        return SensorResult::miss();
    }
    let along_index = along_cell as i32;
    let cross_index = cross_cell as i32;
    let local = (cross - cross_cell * size).floor() as i32;
    let step = direction.sign();

    let examine = |index: i32| {
        let raw = if direction.is_vertical() {
            grid.tile_at_cell(cross_index, index)
        } else {
            grid.tile_at_cell(index, cross_index)
        };
        let tile = TileRef::decode(raw);
        Examined {
            index,
            tile,
            depth: surface_depth(grid, tile, local, direction),
        }
    };

    let current = examine(along_index);
    let hit = if current.depth >= TILE_SIZE {
        // Regress; with nothing behind, the current tile's near edge is the surface
        let behind = examine(along_index - step);
        if behind.depth > 0 { behind } else { current }
    } else if current.depth <= 0 {
        let ahead = examine(along_index + step);
        if ahead.depth > 0 {
            ahead
        } else {
            return SensorResult::miss();
        }
    } else {
        current
    };

    let surface = surface_coordinate(hit.index, hit.depth, step);
    let id = hit.tile.id;
    SensorResult {
        distance: (surface - along) * step as f32,
        angle: grid.angle_at(id, hit.tile.flip_h, hit.tile.flip_v),
        tile_id: id,
        found: true,
        flagged: grid.is_flagged(id),
    }
}

/// Solid depth of a tile as seen by a sensor moving in `direction`
///
/// Upward and leftward sensors invert the flip test so they measure from the
/// opposite edge and land on the same face as their downward/rightward pair.
fn surface_depth(grid: &TileGrid, tile: TileRef, local: i32, direction: SensorDirection) -> i32 {
    if tile.is_empty() {
        return 0;
    }
    match direction {
        SensorDirection::Down => grid.height_at(tile.id, local, tile.flip_h, tile.flip_v),
        SensorDirection::Up => grid.height_at(tile.id, local, tile.flip_h, !tile.flip_v),
        SensorDirection::Right => grid.width_at(tile.id, local, tile.flip_h, tile.flip_v),
        SensorDirection::Left => grid.width_at(tile.id, local, !tile.flip_h, tile.flip_v),
    }
}

/// World coordinate of a tile's surface along the cast axis
#[inline]
fn surface_coordinate(index: i32, depth: i32, step: i32) -> f32 {
    if step > 0 {
        ((index + 1) * TILE_SIZE - depth) as f32
    } else {
        (index * TILE_SIZE + depth) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{FLIP_H_BIT, FLIP_V_BIT};
    use crate::sim::tiles::{LevelCollision, TileProfile, TileProfileStore};

    const FULL: u32 = 1;
    const SLOPE: u32 = 2;
    const HALF: u32 = 3;

    fn profiles() -> TileProfileStore {
        let mut slope = [0u8; 16];
        for (c, h) in slope.iter_mut().enumerate() {
            *h = c as u8 + 1;
        }
        TileProfileStore::new()
            .with(FULL, TileProfile::full())
            .and_then(|s| s.with(SLOPE, TileProfile::from_heights(slope, 45.0)))
            .and_then(|s| s.with(HALF, TileProfile::from_heights([8; 16], 0.0)))
            .expect("valid profiles")
    }

    /// 4x4 level with a floor of full blocks on row 2
    fn floor_level() -> LevelCollision {
        let mut level = LevelCollision::empty(4, 4);
        for col in 0..4 {
            level.set(2, col, FULL);
        }
        level
    }

    #[test]
    fn test_cast_down_one_pixel_above_full_block() {
        let profiles = profiles();
        let level = floor_level();
        let grid = TileGrid::new(&level, &profiles);

        let result = cast(&grid, Vec2::new(0.0, 31.0), SensorDirection::Down);
        assert!(result.found);
        assert_eq!(result.distance, 1.0);
        assert_eq!(result.angle, 0.0);
        assert_eq!(result.tile_id, FULL);
        assert!(result.flagged);
    }

    #[test]
    fn test_seam_continuity() {
        let profiles = profiles();
        let level = floor_level();
        let grid = TileGrid::new(&level, &profiles);

        let at_seam = cast(&grid, Vec2::new(16.0, 28.0), SensorDirection::Down);
        let left = cast(&grid, Vec2::new(15.0, 28.0), SensorDirection::Down);
        let right = cast(&grid, Vec2::new(17.0, 28.0), SensorDirection::Down);
        assert_eq!(at_seam.distance, 4.0);
        assert_eq!(left.distance, at_seam.distance);
        assert_eq!(right.distance, at_seam.distance);
    }

    #[test]
    fn test_vertical_continuity_through_regress_and_extend() {
        let profiles = profiles();
        let level = floor_level();
        let grid = TileGrid::new(&level, &profiles);

        // Extend from the empty tile above, then inside the block
        for (y, expected) in [(30.0, 2.0), (31.0, 1.0), (32.0, 0.0), (33.0, -1.0), (40.0, -8.0)] {
            let result = cast(&grid, Vec2::new(8.0, y), SensorDirection::Down);
            assert!(result.found);
            assert_eq!(result.distance, expected, "anchor y = {}", y);
        }
    }

    #[test]
    fn test_regress_uses_partial_tile_behind() {
        let profiles = profiles();
        let mut level = floor_level();
        level.set(1, 0, HALF);
        let grid = TileGrid::new(&level, &profiles);

        // Anchor inside the full block, half tile sits on top of it
        let result = cast(&grid, Vec2::new(4.0, 34.0), SensorDirection::Down);
        assert!(result.found);
        assert_eq!(result.distance, 24.0 - 34.0);
        assert_eq!(result.tile_id, HALF);
    }

    #[test]
    fn test_regress_fallback_pins_current_tile_edge() {
        // A single-tile-thick platform with air above: the near edge of the
        // block itself is the surface, not a miss
        let profiles = profiles();
        let mut level = LevelCollision::empty(1, 4);
        level.set(2, 0, FULL);
        let grid = TileGrid::new(&level, &profiles);

        let result = cast(&grid, Vec2::new(4.0, 45.0), SensorDirection::Down);
        assert!(result.found);
        assert_eq!(result.distance, 32.0 - 45.0);
        assert_eq!(result.tile_id, FULL);
    }

    #[test]
    fn test_not_found_reports_extension_limit() {
        let profiles = profiles();
        let level = floor_level();
        let grid = TileGrid::new(&level, &profiles);

        let result = cast(&grid, Vec2::new(8.0, 4.0), SensorDirection::Down);
        assert!(!result.found);
        assert_eq!(result.distance, SENSOR_EXTENSION_LIMIT);
        assert!(!result.penetrating());
    }

    #[test]
    fn test_cast_onto_slope() {
        let profiles = profiles();
        let mut level = LevelCollision::empty(1, 2);
        level.set(1, 0, SLOPE);
        let grid = TileGrid::new(&level, &profiles);

        // Column 3 is 4 tall: surface at y = 32 - 4
        let result = cast(&grid, Vec2::new(3.5, 20.0), SensorDirection::Down);
        assert!(result.found);
        assert_eq!(result.distance, 8.0);
        assert_eq!(result.angle, 45.0);
        assert!(!result.flagged);
    }

    #[test]
    fn test_flipped_slope_changes_height_and_angle() {
        let profiles = profiles();
        let mut level = LevelCollision::empty(1, 2);
        level.set(1, 0, SLOPE | FLIP_H_BIT);
        let grid = TileGrid::new(&level, &profiles);

        // Column 3 now reads column 12: 13 tall
        let result = cast(&grid, Vec2::new(3.0, 20.0), SensorDirection::Down);
        assert_eq!(result.distance, (32 - 13) as f32 - 20.0);
        assert_eq!(result.angle, 315.0);
    }

    #[test]
    fn test_cast_up_into_ceiling() {
        let profiles = profiles();
        let mut level = LevelCollision::empty(1, 4);
        level.set(0, 0, FULL);
        let grid = TileGrid::new(&level, &profiles);

        let result = cast(&grid, Vec2::new(8.0, 20.0), SensorDirection::Up);
        assert!(result.found);
        assert_eq!(result.distance, 4.0);

        let embedded = cast(&grid, Vec2::new(8.0, 14.0), SensorDirection::Up);
        assert_eq!(embedded.distance, -2.0);
    }

    #[test]
    fn test_cast_up_finds_hanging_slope_underside() {
        let profiles = profiles();
        let mut level = LevelCollision::empty(1, 4);
        level.set(0, 0, SLOPE | FLIP_V_BIT);
        let grid = TileGrid::new(&level, &profiles);

        // Flipped column 3 hangs 4 pixels from the top
        let result = cast(&grid, Vec2::new(3.0, 10.0), SensorDirection::Up);
        assert!(result.found);
        assert_eq!(result.distance, 6.0);
        assert_eq!(result.angle, 135.0);
    }

    #[test]
    fn test_cast_left_and_right_into_walls() {
        let profiles = profiles();
        let mut level = LevelCollision::empty(4, 1);
        level.set(0, 0, FULL);
        level.set(0, 3, FULL);
        let grid = TileGrid::new(&level, &profiles);

        let right = cast(&grid, Vec2::new(40.0, 8.0), SensorDirection::Right);
        assert!(right.found);
        assert_eq!(right.distance, 8.0);

        let left = cast(&grid, Vec2::new(20.0, 8.0), SensorDirection::Left);
        assert!(left.found);
        assert_eq!(left.distance, 4.0);

        let embedded = cast(&grid, Vec2::new(50.0, 8.0), SensorDirection::Right);
        assert_eq!(embedded.distance, -2.0);
    }

    #[test]
    fn test_cast_sideways_hits_slope_face() {
        let profiles = profiles();
        let mut level = LevelCollision::empty(2, 1);
        level.set(0, 1, SLOPE);
        let grid = TileGrid::new(&level, &profiles);

        // Row 7 of the slope is solid from x = 16 + 8
        let right = cast(&grid, Vec2::new(10.0, 7.0), SensorDirection::Right);
        assert!(right.found);
        assert_eq!(right.distance, 14.0);
    }

    #[test]
    fn test_cast_sideways_at_left_half_block() {
        let mut heights = [0u8; 16];
        heights[..8].fill(16);
        let profiles = TileProfileStore::new()
            .with(4, TileProfile::from_heights(heights, 0.0))
            .expect("valid profiles");
        let mut level = LevelCollision::empty(3, 1);
        level.set(0, 1, 4);
        let grid = TileGrid::new(&level, &profiles);

        // Solid over x = 16..24; the leftward sensor meets its right face
        let left = cast(&grid, Vec2::new(40.0, 8.0), SensorDirection::Left);
        assert!(left.found);
        assert_eq!(left.distance, 16.0);

        // Widths carry no alignment, so the rightward face sits at the far edge minus the width
        let right = cast(&grid, Vec2::new(10.0, 8.0), SensorDirection::Right);
        assert!(right.found);
        assert_eq!(right.distance, 14.0);
    }

    #[test]
    fn test_cast_up_into_unflipped_slope_reports_column_top() {
        let profiles = profiles();
        let mut level = LevelCollision::empty(1, 2);
        level.set(0, 0, SLOPE);
        let grid = TileGrid::new(&level, &profiles);

        // Column 3 is solid over y = 12..16; an upward sensor measures to its top
        // face, the same face a downward sensor lands on
        let up = cast(&grid, Vec2::new(3.0, 20.0), SensorDirection::Up);
        assert!(up.found);
        assert_eq!(up.distance, 8.0);

        let down = cast(&grid, Vec2::new(3.0, 4.0), SensorDirection::Down);
        assert_eq!(down.distance, 8.0);
    }

    #[test]
    fn test_far_away_anchor_is_a_miss() {
        let profiles = profiles();
        let level = floor_level();
        let grid = TileGrid::new(&level, &profiles);

        for (anchor, direction) in [
            (Vec2::new(4.0e10, 8.0), SensorDirection::Right),
            (Vec2::new(-4.0e10, 8.0), SensorDirection::Left),
            (Vec2::new(8.0, 4.0e10), SensorDirection::Down),
            (Vec2::new(4.0e10, 8.0), SensorDirection::Up),
            (Vec2::new(8.0, f32::MAX), SensorDirection::Right),
        ] {
            let result = cast(&grid, anchor, direction);
            assert!(!result.found, "{:?} {:?}", anchor, direction);
            assert_eq!(result.distance, SENSOR_EXTENSION_LIMIT);
        }
    }

    #[test]
    fn test_no_level_never_finds() {
        let profiles = profiles();
        let grid = TileGrid::without_level(&profiles);
        for direction in [
            SensorDirection::Down,
            SensorDirection::Up,
            SensorDirection::Left,
            SensorDirection::Right,
        ] {
            assert!(!cast(&grid, Vec2::new(8.0, 8.0), direction).found);
        }
    }
}
