//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the grid, the matching rules, cascade resolution and
//! the session state machine. It has no dependencies on rendering,
//! networking or timers:
//!
//! - **Deterministic**: the same seed produces the same boards and refills
//! - **Synchronous**: every turn is fully settled before the call returns
//! - **Observable**: each turn returns an ordered event log for playback
//!
//! # Module Structure
//!
//! - [`grid`]: fixed-size board of optional tile cells
//! - [`matcher`]: horizontal and vertical run detection
//! - [`swap`]: adjacency checks, swaps and trial swaps
//! - [`cascade`]: clear, compact and refill until stable
//! - [`moves`]: search for any productive swap
//! - [`game_state`] and [`scoring`]: points, levels and power-ups
//! - [`rng`]: seedable LCG, palette shuffle and tile creation
//! - [`session`]: the turn-based facade used by controllers
//! - [`events`] and [`store`]: outward callbacks and score persistence
//!
//! # Game Rules
//!
//! - Swapping two edge-adjacent tiles is kept only if it creates a run of
//!   three or more of one kind; otherwise it is undone
//! - Every cleared tile scores 10; each multiple of the level threshold
//!   raises the level and brings one more kind into play
//! - Tiles fall toward the bottom row and empty cells refill at once
//! - A power-up clears the whole board; the game ends when none are left
//!   and no swap can make a match
//!
//! # Example
//!
//! ```
//! use tile_match_core::{Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::default().with_seed(12345));
//! assert_eq!(session.state().score(), 0);
//!
//! let outcome = session.activate_powerup();
//! assert!(outcome.applied);
//! assert_eq!(outcome.powerups, 2);
//! assert!(outcome.score >= 360);
//! ```

pub mod cascade;
pub mod events;
pub mod game_state;
pub mod grid;
pub mod matcher;
pub mod moves;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod store;
pub mod swap;
pub mod tile;

pub use tile_match_types as types;

// Re-export commonly used types for convenience
pub use cascade::{resolve, CascadeReport, MAX_CASCADE_PASSES};
pub use events::{replay, GameEvent, GameObserver};
pub use game_state::GameState;
pub use grid::Grid;
pub use matcher::{find_matches, has_match, matched_positions, MatchGroup, Orientation};
pub use moves::{any_move_available, productive_swaps};
pub use rng::{Palette, SimpleRng, TileSource};
pub use scoring::ScoreResult;
pub use session::{Session, SessionConfig, TurnOutcome};
pub use store::{MemoryStore, ScoreStore};
pub use swap::{apply_swap, can_swap, trial_swap};
pub use tile::{Tile, TileId};
