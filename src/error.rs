//! Errors raised while loading tile profiles, levels and tuning tables
//!
//! The simulation itself never fails; only data coming in from outside does.

use thiserror::Error;

/// Failure while building collision data or tuning from external input
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tile {id}: expected {expected} {table} entries, found {found}")]
    ProfileSize {
        id: u32,
        table: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("tile {id}: {table} value {value} exceeds tile size")]
    ProfileValue {
        id: u32,
        table: &'static str,
        value: u8,
    },

    #[error("tile id {0} is not a valid profile id")]
    InvalidTileId(u32),

    #[error("tile id {0} defined more than once")]
    DuplicateTile(u32),

    #[error("level is {width}x{height} but has {found} cells")]
    LevelSize {
        width: usize,
        height: usize,
        found: usize,
    },
}
