//! Scoring module - per-tile points and level thresholds
//!
//! Every cleared tile is worth a flat [`SCORE_PER_TILE`]. The level check runs
//! after each single award, so a clear that passes over a threshold multiple
//! without landing exactly on it does not level up. Scores move in steps of 10
//! and the default threshold is a multiple of 10, which makes exact landings
//! the norm.

use crate::types::SCORE_PER_TILE;

/// Result of awarding a single tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Points added by this award
    pub points: u32,
    /// Score after the award
    pub score: u32,
    /// Whether this award landed on a level threshold
    pub level_up: bool,
}

/// Level-up rule: score is positive and an exact multiple of the threshold
pub fn is_level_up_score(score: u32, threshold: u32) -> bool {
    threshold > 0 && score > 0 && score % threshold == 0
}

/// Award one tile on top of `score`
pub fn award(score: u32, threshold: u32) -> ScoreResult {
    let score = score.saturating_add(SCORE_PER_TILE);
    ScoreResult {
        points: SCORE_PER_TILE,
        score,
        level_up: is_level_up_score(score, threshold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_award_adds_ten() {
        let r = award(0, 1000);
        assert_eq!(r.points, 10);
        assert_eq!(r.score, 10);
        assert!(!r.level_up);
    }

    #[test]
    fn test_level_up_on_exact_multiple() {
        assert!(award(990, 1000).level_up);
        assert!(award(1990, 1000).level_up);
        assert!(!award(1000, 1000).level_up);
    }

    #[test]
    fn test_odd_threshold_levels_on_even_multiples_only() {
        assert!(!award(0, 15).level_up);
        assert!(!award(10, 15).level_up);
        assert!(award(20, 15).level_up);
    }

    #[test]
    fn test_zero_threshold_never_levels() {
        assert!(!is_level_up_score(1000, 0));
        assert!(!is_level_up_score(0, 1000));
    }
}
