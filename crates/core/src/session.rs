//! Session module - one game, turn by turn
//!
//! A `Session` owns the grid, the game state and the tile source. Every
//! mutating call settles the board completely before it returns and hands
//! back a [`TurnOutcome`] carrying the ordered event log for that turn.
//!
//! The busy flag guards against overlapping turns. By default it is only
//! held during a call. With `await_playback` it stays set after every turn
//! that touched the board (a reverted swap included) until
//! [`Session::finish_playback`] is called, so a presentation layer can replay
//! the log before accepting the next input.

use std::io;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use crate::cascade::{clear_board, resolve, stabilize, CascadeReport};
use crate::events::GameEvent;
use crate::game_state::GameState;
use crate::grid::Grid;
use crate::matcher::has_match;
use crate::moves::any_move_available;
use crate::rng::TileSource;
use crate::store::ScoreStore;
use crate::swap::{apply_swap, can_swap};
use crate::types::{
    Position, Rejection, DEFAULT_HEIGHT, DEFAULT_LEVEL_THRESHOLD, DEFAULT_PALETTE_SIZE,
    DEFAULT_WIDTH, MIN_GRID_SIDE, SCORE_STORE_KEY,
};

/// Session parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub width: u8,
    pub height: u8,
    pub palette_size: u8,
    pub level_threshold: u32,
    /// Fixed seed for reproducible sessions; None seeds from the clock
    pub seed: Option<u32>,
    /// Stay busy after each turn until `finish_playback`
    pub await_playback: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            palette_size: DEFAULT_PALETTE_SIZE,
            level_threshold: DEFAULT_LEVEL_THRESHOLD,
            seed: None,
            await_playback: false,
        }
    }
}

impl SessionConfig {
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ (d.as_secs() as u32))
        .unwrap_or(1)
}

/// Result of one mutating call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// True when the board changed as requested
    pub applied: bool,
    pub rejection: Option<Rejection>,
    /// Every cleared position over the whole turn, pass by pass
    pub cleared: Vec<Position>,
    /// Points scored this turn
    pub points: u32,
    pub score: u32,
    pub level: u32,
    pub powerups: u32,
    pub game_over: bool,
    /// Match passes run by the cascade
    pub cascades: u32,
    pub events: Vec<GameEvent>,
}

/// One game in progress
#[derive(Debug, Clone)]
pub struct Session {
    grid: Grid,
    state: GameState,
    source: TileSource,
    seed: u32,
    busy: bool,
    await_playback: bool,
    game_over: bool,
}

impl Session {
    /// Start a session: random fill, then clear any accidental matches
    pub fn new(config: SessionConfig) -> Self {
        let seed = config.seed.unwrap_or_else(clock_seed);
        let width = config.width.max(MIN_GRID_SIDE);
        let height = config.height.max(MIN_GRID_SIDE);
        let state = GameState::new(config.palette_size, config.level_threshold);
        let source = TileSource::new(seed, state.palette_size());

        let mut session = Self {
            grid: Grid::new(width, height),
            state,
            source,
            seed,
            busy: false,
            await_playback: config.await_playback,
            game_over: false,
        };
        session.rebuild_grid();
        info!(seed, width, height, "session started");
        session
    }

    /// Start from a prebuilt grid and state. The grid is taken as is (no
    /// stabilization); new tiles get ids after the highest one on it.
    pub fn with_grid(config: SessionConfig, grid: Grid, state: GameState) -> Self {
        let seed = config.seed.unwrap_or_else(clock_seed);
        let source =
            TileSource::new(seed, state.palette_size()).continue_after(grid.max_tile_id());
        let mut session = Self {
            grid,
            state,
            source,
            seed,
            busy: false,
            await_playback: config.await_playback,
            game_over: false,
        };
        session.game_over = session.out_of_moves();
        session
    }

    fn rebuild_grid(&mut self) {
        self.grid.clear();
        crate::cascade::refill(&mut self.grid, &self.state, &mut self.source);
        let passes = stabilize(&mut self.grid, &self.state, &mut self.source);
        debug!(passes, "board built");
    }

    fn out_of_moves(&self) -> bool {
        self.state.powerups() == 0 && !any_move_available(&self.grid)
    }

    fn outcome(&self, applied: bool, rejection: Option<Rejection>) -> TurnOutcome {
        TurnOutcome {
            applied,
            rejection,
            cleared: Vec::new(),
            points: 0,
            score: self.state.score(),
            level: self.state.level(),
            powerups: self.state.powerups(),
            game_over: self.game_over,
            cascades: 0,
            events: Vec::new(),
        }
    }

    fn reject(&self, rejection: Rejection) -> TurnOutcome {
        debug!(code = rejection.code(), "turn rejected");
        self.outcome(false, Some(rejection))
    }

    /// Close a turn that touched the board
    fn end_turn(
        &mut self,
        applied: bool,
        rejection: Option<Rejection>,
        report: CascadeReport,
        mut events: Vec<GameEvent>,
    ) -> TurnOutcome {
        if applied && self.out_of_moves() {
            self.game_over = true;
            events.push(GameEvent::GameOver);
            info!(score = self.state.score(), level = self.state.level(), "game over");
        }
        self.busy = self.await_playback;

        let mut outcome = self.outcome(applied, rejection);
        outcome.cascades = report.passes;
        outcome.points = report.points;
        outcome.cleared = report.cleared;
        outcome.events = events;
        outcome
    }

    /// Swap two adjacent tiles. A swap that makes no match is undone.
    pub fn attempt_swap(&mut self, a: Position, b: Position) -> TurnOutcome {
        if self.busy {
            return self.reject(Rejection::EngineBusy);
        }
        if self.game_over {
            return self.reject(Rejection::GameOver);
        }
        if !can_swap(&self.grid, a, b) {
            return self.reject(Rejection::InvalidSwap);
        }

        self.busy = true;
        let mut events = Vec::new();
        apply_swap(&mut self.grid, a, b);
        events.push(GameEvent::Swapped { a, b });

        if !has_match(&self.grid) {
            self.grid.exchange(a, b);
            events.push(GameEvent::SwapReverted { a, b });
            return self.end_turn(false, Some(Rejection::NoMatch), CascadeReport::default(), events);
        }

        let report = resolve(&mut self.grid, &mut self.state, &mut self.source, &mut events);
        debug!(
            %a,
            %b,
            cleared = report.cleared.len(),
            passes = report.passes,
            score = self.state.score(),
            "swap resolved"
        );
        self.end_turn(true, None, report, events)
    }

    /// Spend a power-up: clear the whole board, refill and cascade
    pub fn activate_powerup(&mut self) -> TurnOutcome {
        if self.busy {
            return self.reject(Rejection::EngineBusy);
        }
        if self.state.powerups() == 0 {
            return self.reject(Rejection::NoPowerupsAvailable);
        }

        self.busy = true;
        self.state.consume_powerup();
        let mut events = vec![GameEvent::PowerupsChanged(self.state.powerups())];
        let report = clear_board(&mut self.grid, &mut self.state, &mut self.source, &mut events);
        info!(
            powerups = self.state.powerups(),
            cleared = report.cleared.len(),
            score = self.state.score(),
            "power-up used"
        );
        self.end_turn(true, None, report, events)
    }

    /// Persist the score, then start over on a freshly shuffled palette.
    ///
    /// A zero score is not written. Returns the persisted score, if any. When
    /// the store fails the session is left as it was.
    pub fn reset(&mut self, store: &mut impl ScoreStore) -> io::Result<Option<u32>> {
        let score = self.state.score();
        let persisted = if score > 0 {
            store.set(SCORE_STORE_KEY, score)?;
            info!(score, "score persisted");
            Some(score)
        } else {
            warn!("score is zero, nothing persisted");
            None
        };

        self.state.reset();
        self.source.reshuffle();
        self.rebuild_grid();
        self.busy = false;
        self.game_over = false;
        info!(seed = self.seed, "session reset");
        Ok(persisted)
    }

    /// Release the busy flag held for playback
    pub fn finish_playback(&mut self) {
        self.busy = false;
    }

    /// Last persisted score
    pub fn best_score(&self, store: &impl ScoreStore) -> io::Result<Option<u32>> {
        store.get(SCORE_STORE_KEY)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn palette(&self) -> &crate::rng::Palette {
        self.source.palette()
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn awaits_playback(&self) -> bool {
        self.await_playback
    }
}
