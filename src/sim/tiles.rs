//! Tile collision data and flip-aware lookups
//!
//! A level is a grid of raw tile values. Each nonzero id has a profile with
//! per-column heights, per-row widths and a surface angle. Heights are
//! measured from the tile bottom and widths from the tile's right edge; the
//! flip flags reinterpret both so every sensor direction finds the same face.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::LoadError;
use crate::normalize_angle;

/// Tile id plus flip flags, packed as in the Tiled format
pub type RawTileValue = u32;

const TILE: usize = TILE_SIZE as usize;

/// A decoded raw tile value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileRef {
    pub id: u32,
    pub flip_h: bool,
    pub flip_v: bool,
    /// Carried for the renderer; collision ignores it
    pub flip_d: bool,
}

impl TileRef {
    pub fn decode(raw: RawTileValue) -> Self {
        Self {
            id: raw & TILE_ID_MASK,
            flip_h: raw & FLIP_H_BIT != 0,
            flip_v: raw & FLIP_V_BIT != 0,
            flip_d: raw & FLIP_D_BIT != 0,
        }
    }

    pub fn encode(self) -> RawTileValue {
        let mut raw = self.id & TILE_ID_MASK;
        if self.flip_h {
            raw |= FLIP_H_BIT;
        }
        if self.flip_v {
            raw |= FLIP_V_BIT;
        }
        if self.flip_d {
            raw |= FLIP_D_BIT;
        }
        raw
    }

    /// Id 0 never collides, whatever its flip bits
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.id == 0
    }
}

/// Static collision shape of one tile id
#[derive(Debug, Clone, PartialEq)]
pub struct TileProfile {
    /// Solid height of each column, from the bottom edge
    pub heights: [u8; TILE],
    /// Solid width of each row, from the right edge
    pub widths: [u8; TILE],
    /// Surface angle in degrees
    pub angle: f32,
    /// Angle snaps to the nearest cardinal on contact
    pub flagged: bool,
}

impl TileProfile {
    pub fn new(heights: [u8; TILE], widths: [u8; TILE], angle: f32) -> Self {
        let angle = normalize_angle(angle);
        Self {
            heights,
            widths,
            angle,
            flagged: angle == 0.0,
        }
    }

    /// Build a profile from its height columns, deriving the row widths
    ///
    /// A row's width is its number of solid cells, so the width table is the
    /// height table turned on its side.
    pub fn from_heights(heights: [u8; TILE], angle: f32) -> Self {
        let mut widths = [0u8; TILE];
        for (row, width) in widths.iter_mut().enumerate() {
            // Column c is solid at local row r when its height reaches up to r
            let needed = (TILE - row) as u8;
            *width = heights.iter().filter(|&&h| h >= needed).count() as u8;
        }
        Self::new(heights, widths, angle)
    }

    /// A fully solid block
    pub fn full() -> Self {
        Self::new([TILE_SIZE as u8; TILE], [TILE_SIZE as u8; TILE], 0.0)
    }
}

#[derive(Debug, Deserialize)]
struct ProfileRecord {
    id: u32,
    heights: Vec<u8>,
    #[serde(default)]
    widths: Option<Vec<u8>>,
    angle: f32,
}

#[derive(Debug, Deserialize)]
struct ProfileFile {
    tiles: Vec<ProfileRecord>,
}

/// Read-only profile table keyed by tile id
#[derive(Debug, Clone, Default)]
pub struct TileProfileStore {
    /// Sparse by id; ids may be anywhere in the 29-bit range
    profiles: HashMap<u32, TileProfile>,
}

impl TileProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: HashMap::new(),
        }
    }

    /// Register the profile for a tile id
    pub fn insert(&mut self, id: u32, profile: TileProfile) -> Result<(), LoadError> {
        if id == 0 || id > TILE_ID_MASK {
            return Err(LoadError::InvalidTileId(id));
        }
        if self.profiles.contains_key(&id) {
            return Err(LoadError::DuplicateTile(id));
        }
        self.profiles.insert(id, profile);
        Ok(())
    }

    /// Builder-style insert
    pub fn with(mut self, id: u32, profile: TileProfile) -> Result<Self, LoadError> {
        self.insert(id, profile)?;
        Ok(self)
    }

    #[inline]
    pub fn get(&self, id: u32) -> Option<&TileProfile> {
        self.profiles.get(&id)
    }

    /// Number of registered profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load a profile table from JSON
    ///
    /// Format: `{"tiles": [{"id": 1, "heights": [16 values], "widths": [16 values]?, "angle": 45.0}]}`.
    /// Missing widths are derived from the heights.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let file: ProfileFile = serde_json::from_str(json)?;
        let mut store = Self::new();
        for record in file.tiles {
            let heights = profile_table(record.id, "heights", &record.heights)?;
            let profile = match record.widths {
                Some(widths) => {
                    let widths = profile_table(record.id, "widths", &widths)?;
                    TileProfile::new(heights, widths, record.angle)
                }
                None => TileProfile::from_heights(heights, record.angle),
            };
            store.insert(record.id, profile)?;
        }
        log::info!("Loaded {} tile profiles", store.len());
        Ok(store)
    }
}

fn profile_table(id: u32, table: &'static str, values: &[u8]) -> Result<[u8; TILE], LoadError> {
    let array: [u8; TILE] = values.try_into().map_err(|_| LoadError::ProfileSize {
        id,
        table,
        expected: TILE,
        found: values.len(),
    })?;
    if let Some(&value) = array.iter().find(|&&v| v as i32 > TILE_SIZE) {
        return Err(LoadError::ProfileValue { id, table, value });
    }
    Ok(array)
}

/// Row-major grid of raw tile values for one level
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "LevelRecord")]
pub struct LevelCollision {
    width: usize,
    height: usize,
    cells: Vec<RawTileValue>,
}

#[derive(Deserialize)]
struct LevelRecord {
    width: usize,
    height: usize,
    cells: Vec<RawTileValue>,
}

impl TryFrom<LevelRecord> for LevelCollision {
    type Error = LoadError;

    fn try_from(record: LevelRecord) -> Result<Self, Self::Error> {
        Self::new(record.width, record.height, record.cells)
    }
}

impl LevelCollision {
    pub fn new(width: usize, height: usize, cells: Vec<RawTileValue>) -> Result<Self, LoadError> {
        if width.checked_mul(height) != Some(cells.len()) {
            return Err(LoadError::LevelSize {
                width,
                height,
                found: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// An all-air level
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw value at a cell, 0 outside the grid
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> RawTileValue {
        if row >= self.height || col >= self.width {
            return 0;
        }
        self.cells[row * self.width + col]
    }

    /// Write a cell (level building only; ignored outside the grid)
    pub fn set(&mut self, row: usize, col: usize, value: RawTileValue) {
        if row < self.height && col < self.width {
            self.cells[row * self.width + col] = value;
        }
    }
}

/// Read-only view of a level and its tile profiles used by the sensors
#[derive(Debug, Clone, Copy)]
pub struct TileGrid<'a> {
    level: Option<&'a LevelCollision>,
    profiles: &'a TileProfileStore,
}

impl<'a> TileGrid<'a> {
    pub fn new(level: &'a LevelCollision, profiles: &'a TileProfileStore) -> Self {
        Self {
            level: Some(level),
            profiles,
        }
    }

    /// A grid with no level loaded; every query reports air
    pub fn without_level(profiles: &'a TileProfileStore) -> Self {
        Self {
            level: None,
            profiles,
        }
    }

    /// Raw tile value containing a world position
    pub fn tile_at(&self, x: f32, y: f32) -> RawTileValue {
        if !x.is_finite() || !y.is_finite() {
            return 0;
        }
        let size = TILE_SIZE as f32;
        self.tile_at_cell((x / size).floor() as i32, (y / size).floor() as i32)
    }

    /// Raw tile value at a tile column/row, 0 outside the level
    pub fn tile_at_cell(&self, col: i32, row: i32) -> RawTileValue {
        match self.level {
            Some(level) if col >= 0 && row >= 0 => level.get(row as usize, col as usize),
            _ => 0,
        }
    }

    /// Column height of a tile, from the bottom edge
    ///
    /// `flip_h` mirrors the column; `flip_v` measures a partial column from
    /// the opposite edge.
    pub fn height_at(&self, id: u32, local_x: i32, flip_h: bool, flip_v: bool) -> i32 {
        let Some(profile) = self.profile(id) else {
            return 0;
        };
        let height = profile.heights[mirrored_index(local_x, flip_h)] as i32;
        invert_partial(height, flip_v)
    }

    /// Row width of a tile, from the right edge
    ///
    /// Mirror of `height_at` with the flip roles swapped.
    pub fn width_at(&self, id: u32, local_y: i32, flip_h: bool, flip_v: bool) -> i32 {
        let Some(profile) = self.profile(id) else {
            return 0;
        };
        let width = profile.widths[mirrored_index(local_y, flip_v)] as i32;
        invert_partial(width, flip_h)
    }

    /// Surface angle of a tile after flips
    pub fn angle_at(&self, id: u32, flip_h: bool, flip_v: bool) -> f32 {
        let Some(profile) = self.profile(id) else {
            return 0.0;
        };
        let mut angle = profile.angle;
        if flip_h {
            angle = normalize_angle(360.0 - angle);
        }
        if flip_v {
            angle = normalize_angle(180.0 - angle);
        }
        angle
    }

    /// Whether contact with this tile snaps the angle to a cardinal
    pub fn is_flagged(&self, id: u32) -> bool {
        self.profile(id).is_some_and(|p| p.flagged)
    }

    fn profile(&self, id: u32) -> Option<&'a TileProfile> {
        if id == 0 {
            return None;
        }
        let profile = self.profiles.get(id);
        if profile.is_none() {
            log::trace!("No profile for tile {}, treating as empty", id);
        }
        profile
    }
}

#[inline]
fn mirrored_index(local: i32, flip: bool) -> usize {
    let index = local.clamp(0, TILE_SIZE - 1);
    (if flip { TILE_SIZE - 1 - index } else { index }) as usize
}

#[inline]
fn invert_partial(value: i32, flip: bool) -> i32 {
    if flip && value > 0 && value < TILE_SIZE {
        TILE_SIZE - value
    } else {
        value
    }
}
