//! Game configuration from environment variables
//!
//! | Variable | Default |
//! |----------|---------|
//! | `TILE_MATCH_WIDTH` | 6 |
//! | `TILE_MATCH_HEIGHT` | 6 |
//! | `TILE_MATCH_PALETTE` | 30 |
//! | `TILE_MATCH_LEVEL_THRESHOLD` | 1000 |
//! | `TILE_MATCH_SEED` | clock |
//! | `TILE_MATCH_SCORE_PATH` | `tile-match-score.json` |
//!
//! Unparsable values fall back to the default.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

use crate::core::SessionConfig;
use crate::types::{
    DEFAULT_HEIGHT, DEFAULT_LEVEL_THRESHOLD, DEFAULT_PALETTE_SIZE, DEFAULT_WIDTH, MIN_GRID_SIDE,
    MIN_PALETTE_SIZE,
};

pub const DEFAULT_SCORE_PATH: &str = "tile-match-score.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub session: SessionConfig,
    pub score_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            score_path: PathBuf::from(DEFAULT_SCORE_PATH),
        }
    }
}

impl GameConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
            let raw = lookup(key)?;
            let value = raw.trim().parse().ok();
            if value.is_none() {
                warn!(key, value = %raw, "ignoring invalid config value");
            }
            value
        }

        let width = parsed::<u8>(&lookup, "TILE_MATCH_WIDTH")
            .unwrap_or(DEFAULT_WIDTH)
            .max(MIN_GRID_SIDE);
        let height = parsed::<u8>(&lookup, "TILE_MATCH_HEIGHT")
            .unwrap_or(DEFAULT_HEIGHT)
            .max(MIN_GRID_SIDE);
        let palette_size = parsed::<u8>(&lookup, "TILE_MATCH_PALETTE")
            .unwrap_or(DEFAULT_PALETTE_SIZE)
            .clamp(MIN_PALETTE_SIZE, DEFAULT_PALETTE_SIZE);
        let level_threshold = parsed::<u32>(&lookup, "TILE_MATCH_LEVEL_THRESHOLD")
            .filter(|t| *t > 0)
            .unwrap_or(DEFAULT_LEVEL_THRESHOLD);
        let seed = parsed::<u32>(&lookup, "TILE_MATCH_SEED");
        let score_path = lookup("TILE_MATCH_SCORE_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCORE_PATH));

        Self {
            session: SessionConfig {
                width,
                height,
                palette_size,
                level_threshold,
                seed,
                ..SessionConfig::default()
            },
            score_path,
        }
    }
}
