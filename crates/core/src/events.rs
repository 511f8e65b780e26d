//! Events module - ordered log of what a turn did
//!
//! The core settles every turn synchronously. Presentation layers that want
//! to animate the intermediate steps replay this log with their own timing.

use crate::tile::Tile;
use crate::types::{FeedbackKind, Position};

/// One observable step of a turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Two tiles exchanged places
    Swapped { a: Position, b: Position },
    /// A non-productive swap was undone
    SwapReverted { a: Position, b: Position },
    /// Tiles removed from the grid in this step
    TilesCleared(Vec<Position>),
    /// Gravity moves as (from, to), bottom-most first per column
    TilesMoved(Vec<(Position, Position)>),
    /// Tiles created by refill
    TilesSpawned(Vec<Tile>),
    ScoreChanged(u32),
    LevelChanged(u32),
    PowerupsChanged(u32),
    Feedback(FeedbackKind),
    GameOver,
}

/// Outward callbacks; every method defaults to a no-op
pub trait GameObserver {
    fn on_score_changed(&mut self, _score: u32) {}
    fn on_level_changed(&mut self, _level: u32) {}
    fn on_powerups_changed(&mut self, _powerups: u32) {}
    fn on_tiles_cleared(&mut self, _positions: &[Position]) {}
    fn on_game_over(&mut self) {}
    fn on_feedback(&mut self, _kind: FeedbackKind) {}
}

/// Dispatch a log to an observer, in order
pub fn replay(events: &[GameEvent], observer: &mut impl GameObserver) {
    for event in events {
        match event {
            GameEvent::ScoreChanged(score) => observer.on_score_changed(*score),
            GameEvent::LevelChanged(level) => observer.on_level_changed(*level),
            GameEvent::PowerupsChanged(n) => observer.on_powerups_changed(*n),
            GameEvent::TilesCleared(positions) => observer.on_tiles_cleared(positions),
            GameEvent::GameOver => observer.on_game_over(),
            GameEvent::Feedback(kind) => observer.on_feedback(*kind),
            GameEvent::Swapped { .. }
            | GameEvent::SwapReverted { .. }
            | GameEvent::TilesMoved(_)
            | GameEvent::TilesSpawned(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        scores: Vec<u32>,
        cleared: usize,
        feedback: Vec<FeedbackKind>,
        game_over: bool,
    }

    impl GameObserver for Recorder {
        fn on_score_changed(&mut self, score: u32) {
            self.scores.push(score);
        }
        fn on_tiles_cleared(&mut self, positions: &[Position]) {
            self.cleared += positions.len();
        }
        fn on_feedback(&mut self, kind: FeedbackKind) {
            self.feedback.push(kind);
        }
        fn on_game_over(&mut self) {
            self.game_over = true;
        }
    }

    #[test]
    fn test_replay_dispatches_in_order() {
        let events = vec![
            GameEvent::Feedback(FeedbackKind::Match),
            GameEvent::TilesCleared(vec![Position::new(0, 0), Position::new(1, 0)]),
            GameEvent::ScoreChanged(10),
            GameEvent::ScoreChanged(20),
            GameEvent::TilesMoved(vec![]),
            GameEvent::GameOver,
        ];
        let mut rec = Recorder::default();
        replay(&events, &mut rec);
        assert_eq!(rec.scores, vec![10, 20]);
        assert_eq!(rec.cleared, 2);
        assert_eq!(rec.feedback, vec![FeedbackKind::Match]);
        assert!(rec.game_over);
    }
}
