//! Driver module - the game-loop side of the adapter
//!
//! Owns the session and the score store, applies inbound commands in
//! arrival order and produces the replies for the server to deliver: an ack
//! or an error for the sender, then an observation broadcast whenever the
//! board was touched.

use tracing::{debug, warn};

use crate::core::{ScoreStore, Session, TurnOutcome};
use crate::engine::{apply_action, hint};
use crate::protocol::{
    create_ack, create_error, AckResult, ActionName, ErrorCode, HintPayload, LastEvent,
    WirePosition,
};
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
use crate::server::build_observation;
use crate::types::GameAction;

fn action_name(action: GameAction) -> ActionName {
    match action {
        GameAction::Swap { .. } => ActionName::Swap,
        GameAction::Powerup => ActionName::Powerup,
        GameAction::Reset => ActionName::Reset,
    }
}

/// Applies controller commands to one session
pub struct Driver<S: ScoreStore> {
    session: Session,
    store: S,
    obs_seq: u64,
    last_event: Option<LastEvent>,
}

impl<S: ScoreStore> Driver<S> {
    pub fn new(session: Session, store: S) -> Self {
        Self {
            session,
            store,
            obs_seq: 0,
            last_event: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn next_obs_seq(&mut self) -> u64 {
        self.obs_seq += 1;
        self.obs_seq
    }

    /// Handle one inbound command
    pub fn handle(&mut self, inbound: InboundCommand) -> Vec<OutboundMessage> {
        let client_id = inbound.client_id;
        let seq = inbound.seq;

        match inbound.payload {
            InboundPayload::SnapshotRequest => {
                let obs_seq = self.next_obs_seq();
                let obs = build_observation(&self.session, obs_seq, self.last_event);
                vec![OutboundMessage::ToClientObservation { client_id, obs }]
            }
            InboundPayload::Command(ClientCommand::Hint) => {
                let state = self.session.state();
                let result = AckResult {
                    applied: false,
                    cleared: 0,
                    cleared_positions: Vec::new(),
                    cascades: 0,
                    score: state.score(),
                    level: state.level(),
                    powerups: state.powerups(),
                    game_over: self.session.is_game_over(),
                    persisted: None,
                    hint: hint(self.session.grid()).map(|h| HintPayload {
                        from: h.from.into(),
                        to: h.to.into(),
                        clears: h.clears as u32,
                    }),
                };
                let ack = create_ack(seq, Some(result));
                vec![OutboundMessage::ToClientAck { client_id, ack }]
            }
            InboundPayload::Command(ClientCommand::Action(action)) => {
                self.apply(client_id, seq, action)
            }
        }
    }

    fn apply(&mut self, client_id: usize, seq: u64, action: GameAction) -> Vec<OutboundMessage> {
        let level_before = self.session.state().level();

        let result = match apply_action(&mut self.session, action, &mut self.store) {
            Ok(r) => r,
            Err(e) => {
                warn!(client_id, seq, error = %e, "score store failed");
                let err = create_error(seq, ErrorCode::StoreUnavailable, &e.to_string());
                return vec![OutboundMessage::ToClientError { client_id, err }];
            }
        };
        let outcome: &TurnOutcome = &result.outcome;
        debug!(
            client_id,
            seq,
            action = action.as_str(),
            applied = outcome.applied,
            score = outcome.score,
            "command applied"
        );

        let touched = outcome.applied || !outcome.events.is_empty();
        let mut out = Vec::with_capacity(2);

        match outcome.rejection {
            Some(rejection) => {
                let err = create_error(seq, ErrorCode::from(rejection), rejection.message());
                out.push(OutboundMessage::ToClientError { client_id, err });
            }
            None => {
                let ack = create_ack(
                    seq,
                    Some(AckResult {
                        applied: outcome.applied,
                        cleared: outcome.cleared.len() as u32,
                        cleared_positions: outcome
                            .cleared
                            .iter()
                            .map(|&p| WirePosition::from(p))
                            .collect(),
                        cascades: outcome.cascades,
                        score: outcome.score,
                        level: outcome.level,
                        powerups: outcome.powerups,
                        game_over: outcome.game_over,
                        persisted: result.persisted,
                        hint: None,
                    }),
                );
                out.push(OutboundMessage::ToClientAck { client_id, ack });
            }
        }

        if touched {
            // Nothing replays the log here, so release playback at once.
            if self.session.awaits_playback() {
                self.session.finish_playback();
            }
            self.last_event = Some(LastEvent {
                action: action_name(action),
                applied: outcome.applied,
                cleared: outcome.cleared.len() as u32,
                cascades: outcome.cascades,
                points: outcome.points,
                level_up: outcome.level > level_before,
            });
            let obs_seq = self.next_obs_seq();
            let obs = build_observation(&self.session, obs_seq, self.last_event);
            out.push(OutboundMessage::BroadcastObservation { obs });
        }

        out
    }
}
