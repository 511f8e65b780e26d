//! Game state module - score, level, kinds in play and power-ups
//!
//! `GameState` is an explicit value owned by the session and passed by
//! reference into every operation that scores. There is no module-level
//! mutable state.

use tracing::info;

use crate::scoring::{award, ScoreResult};
use crate::types::{
    DEFAULT_LEVEL_THRESHOLD, DEFAULT_PALETTE_SIZE, INITIAL_ACTIVE_TILE_TYPES, INITIAL_POWERUPS,
    MIN_PALETTE_SIZE,
};

/// Per-session counters and the leveling policy
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameState {
    score: u32,
    level: u32,
    active_tile_types: u8,
    powerups: u32,
    level_threshold: u32,
    palette_size: u8,
}

impl GameState {
    /// Fresh state. The palette size is clamped to at least
    /// [`MIN_PALETTE_SIZE`] and the threshold to at least 1.
    pub fn new(palette_size: u8, level_threshold: u32) -> Self {
        let palette_size = palette_size.clamp(MIN_PALETTE_SIZE, DEFAULT_PALETTE_SIZE);
        Self {
            score: 0,
            level: 1,
            active_tile_types: INITIAL_ACTIVE_TILE_TYPES.min(palette_size),
            powerups: INITIAL_POWERUPS,
            level_threshold: level_threshold.max(1),
            palette_size,
        }
    }

    /// Rebuild a state from saved counters, e.g. to resume a session.
    /// Values are clamped back into their invariants.
    pub fn from_parts(
        score: u32,
        level: u32,
        active_tile_types: u8,
        powerups: u32,
        level_threshold: u32,
        palette_size: u8,
    ) -> Self {
        let mut state = Self::new(palette_size, level_threshold);
        state.score = score;
        state.level = level.max(1);
        state.active_tile_types = active_tile_types.clamp(1, state.palette_size);
        state.powerups = powerups;
        state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn active_tile_types(&self) -> u8 {
        self.active_tile_types
    }

    pub fn powerups(&self) -> u32 {
        self.powerups
    }

    pub fn level_threshold(&self) -> u32 {
        self.level_threshold
    }

    pub fn palette_size(&self) -> u8 {
        self.palette_size
    }

    /// Award one cleared tile and run the level check
    pub fn award_tile(&mut self) -> ScoreResult {
        let result = award(self.score, self.level_threshold);
        self.score = result.score;
        if result.level_up {
            self.level += 1;
            if self.active_tile_types < self.palette_size {
                self.active_tile_types += 1;
            }
            info!(
                level = self.level,
                active_tile_types = self.active_tile_types,
                score = self.score,
                "level up"
            );
        }
        result
    }

    /// Spend one power-up. Returns false when none remain.
    pub fn consume_powerup(&mut self) -> bool {
        if self.powerups == 0 {
            return false;
        }
        self.powerups -= 1;
        true
    }

    /// Back to level 1 with full power-ups; threshold and palette are kept
    pub fn reset(&mut self) {
        *self = Self::new(self.palette_size, self.level_threshold);
    }

    #[cfg(test)]
    pub(crate) fn set_score(&mut self, score: u32) {
        self.score = score;
    }

    #[cfg(test)]
    pub(crate) fn set_powerups(&mut self, powerups: u32) {
        self.powerups = powerups;
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(DEFAULT_PALETTE_SIZE, DEFAULT_LEVEL_THRESHOLD)
    }
}
