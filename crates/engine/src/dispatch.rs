//! Dispatch module - one controller action against a session
//!
//! Rule rejections travel inside the [`TurnOutcome`]; the only error is a
//! failing score store during reset.

use std::io;

use tracing::debug;

use tile_match_core::session::{Session, TurnOutcome};
use tile_match_core::store::ScoreStore;
use tile_match_types::GameAction;

/// Result of dispatching one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    pub action: GameAction,
    pub outcome: TurnOutcome,
    /// Score written by a reset, if any
    pub persisted: Option<u32>,
}

impl ActionResult {
    pub fn applied(&self) -> bool {
        self.outcome.applied
    }
}

/// Run one action against a session.
///
/// Game-rule rejections come back inside the outcome; only a failing score
/// store produces an error.
pub fn apply_action(
    session: &mut Session,
    action: GameAction,
    store: &mut impl ScoreStore,
) -> io::Result<ActionResult> {
    debug!(action = action.as_str(), "dispatch");
    let (outcome, persisted) = match action {
        GameAction::Swap { from, to } => (session.attempt_swap(from, to), None),
        GameAction::Powerup => (session.activate_powerup(), None),
        GameAction::Reset => {
            let persisted = session.reset(store)?;
            (settled_outcome(session), persisted)
        }
    };
    Ok(ActionResult {
        action,
        outcome,
        persisted,
    })
}

fn settled_outcome(session: &Session) -> TurnOutcome {
    let state = session.state();
    TurnOutcome {
        applied: true,
        rejection: None,
        cleared: Vec::new(),
        points: 0,
        score: state.score(),
        level: state.level(),
        powerups: state.powerups(),
        game_over: session.is_game_over(),
        cascades: 0,
        events: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_match_core::session::SessionConfig;
    use tile_match_core::store::MemoryStore;
    use tile_match_types::{Position, Rejection};

    #[test]
    fn test_reset_reports_fresh_state() {
        let mut session = Session::new(SessionConfig::default().with_seed(7));
        let mut store = MemoryStore::new();
        apply_action(&mut session, GameAction::Powerup, &mut store).unwrap();
        let scored = session.state().score();
        assert!(scored > 0);

        let result = apply_action(&mut session, GameAction::Reset, &mut store).unwrap();
        assert!(result.applied());
        assert_eq!(result.persisted, Some(scored));
        assert_eq!(result.outcome.score, 0);
        assert_eq!(result.outcome.powerups, 3);
    }

    #[test]
    fn test_invalid_swap_is_rejected() {
        let mut session = Session::new(SessionConfig::default().with_seed(7));
        let mut store = MemoryStore::new();
        let action = GameAction::Swap {
            from: Position::new(0, 0),
            to: Position::new(2, 2),
        };
        let result = apply_action(&mut session, action, &mut store).unwrap();
        assert!(!result.applied());
        assert_eq!(result.outcome.rejection, Some(Rejection::InvalidSwap));
    }
}
