//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, controller protocol, presentation layers).
//!
//! # Board Dimensions
//!
//! The default playfield is a 6x6 grid:
//!
//! - **Columns**: indexed 0-5, left to right
//! - **Rows**: indexed 0-5, top to bottom (gravity pulls toward row 5)
//!
//! # Rule Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `SCORE_PER_TILE` | 10 | Points awarded for every cleared tile |
//! | `DEFAULT_LEVEL_THRESHOLD` | 1000 | Score multiple that triggers a level-up |
//! | `INITIAL_ACTIVE_TILE_TYPES` | 4 | Kinds in play at level 1 |
//! | `INITIAL_POWERUPS` | 3 | Clear-all power-ups per session |
//! | `DEFAULT_PALETTE_SIZE` | 30 | Size of the full kind pool |
//!
//! # Examples
//!
//! ```
//! use tile_match_types::{Direction, GameAction, Position, TileKind, DEFAULT_WIDTH};
//!
//! let kind = TileKind::from_name("Panda").unwrap();
//! assert_eq!(kind.name(), "panda");
//!
//! let from = Position::new(2, 3);
//! let to = from.step(Direction::Right).unwrap();
//! assert_eq!(to, Position::new(3, 3));
//!
//! let action = GameAction::Swap { from, to };
//! assert_eq!(action.as_str(), "swap");
//!
//! assert_eq!(DEFAULT_WIDTH, 6);
//! ```

use std::fmt;

/// Default grid width in cells (6 columns)
pub const DEFAULT_WIDTH: u8 = 6;

/// Default grid height in cells (6 rows)
pub const DEFAULT_HEIGHT: u8 = 6;

/// Smallest grid side that can still hold a run of three
pub const MIN_GRID_SIDE: u8 = 3;

/// Smallest palette that makes matching non-trivial
pub const MIN_PALETTE_SIZE: u8 = 3;

/// Full pool of tile kinds
pub const DEFAULT_PALETTE_SIZE: u8 = TILE_NAMES.len() as u8;

/// Number of kinds in play when a session starts
pub const INITIAL_ACTIVE_TILE_TYPES: u8 = 4;

/// Clear-all power-ups granted per session
pub const INITIAL_POWERUPS: u32 = 3;

/// Score multiple at which the level advances
pub const DEFAULT_LEVEL_THRESHOLD: u32 = 1000;

/// Points for each cleared tile
pub const SCORE_PER_TILE: u32 = 10;

/// Minimum run length that counts as a match
pub const MATCH_LENGTH: usize = 3;

/// Key the session score is persisted under
pub const SCORE_STORE_KEY: &str = "score";

/// Names of the full kind pool, indexed by [`TileKind`].
pub const TILE_NAMES: [&str; 30] = [
    "bear",
    "buffalo",
    "chick",
    "chicken",
    "cow",
    "crocodile",
    "dog",
    "duck",
    "elephant",
    "frog",
    "giraffe",
    "goat",
    "gorilla",
    "hippo",
    "horse",
    "monkey",
    "moose",
    "narwhal",
    "owl",
    "panda",
    "parrot",
    "penguin",
    "pig",
    "rabbit",
    "rhino",
    "sloth",
    "snake",
    "walrus",
    "whale",
    "zebra",
];

/// One kind from the palette.
///
/// The inner value is an index into [`TILE_NAMES`]. Kinds compare by index only;
/// the session decides which subset is in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKind(pub u8);

impl TileKind {
    /// Parse a kind from its name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_match_types::TileKind;
    ///
    /// assert_eq!(TileKind::from_name("bear"), Some(TileKind(0)));
    /// assert_eq!(TileKind::from_name("ZEBRA"), Some(TileKind(29)));
    /// assert_eq!(TileKind::from_name("dragon"), None);
    /// ```
    pub fn from_name(s: &str) -> Option<Self> {
        TILE_NAMES
            .iter()
            .position(|name| name.eq_ignore_ascii_case(s))
            .map(|i| TileKind(i as u8))
    }

    /// Lowercase name, or `"unknown"` for an index outside the pool
    pub fn name(&self) -> &'static str {
        TILE_NAMES.get(self.0 as usize).copied().unwrap_or("unknown")
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A grid coordinate: column (left to right) and row (top to bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub col: u8,
    pub row: u8,
}

impl Position {
    pub const fn new(col: u8, row: u8) -> Self {
        Self { col, row }
    }

    /// Shift by a signed delta. Returns None on underflow or overflow of `u8`;
    /// the upper grid bound is checked by the grid itself.
    pub fn offset(&self, dc: i8, dr: i8) -> Option<Self> {
        let col = self.col.checked_add_signed(dc)?;
        let row = self.row.checked_add_signed(dr)?;
        Some(Self { col, row })
    }

    /// One step in a direction
    pub fn step(&self, dir: Direction) -> Option<Self> {
        let (dc, dr) = dir.delta();
        self.offset(dc, dr)
    }

    /// True when the two positions share an edge
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_match_types::Position;
    ///
    /// assert!(Position::new(1, 1).is_adjacent(Position::new(1, 2)));
    /// assert!(!Position::new(1, 1).is_adjacent(Position::new(2, 2)));
    /// assert!(!Position::new(1, 1).is_adjacent(Position::new(1, 1)));
    /// ```
    pub fn is_adjacent(&self, other: Position) -> bool {
        let dc = self.col.abs_diff(other.col);
        let dr = self.row.abs_diff(other.row);
        dc + dr == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// The four swap directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// (column delta, row delta)
    pub fn delta(&self) -> (i8, i8) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Parse direction from string
    ///
    /// Accepts full names or single letters (case-insensitive):
    /// "up" | "u", "down" | "d", "left" | "l", "right" | "r"
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" | "u" => Some(Direction::Up),
            "down" | "d" => Some(Direction::Down),
            "left" | "l" => Some(Direction::Left),
            "right" | "r" => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Game actions that drive a session
///
/// These are produced by whatever input layer sits in front of the engine
/// (controller protocol, scripted driver, tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Swap two adjacent tiles
    Swap { from: Position, to: Position },
    /// Spend one clear-all power-up
    Powerup,
    /// Persist the score and start over
    Reset,
}

impl GameAction {
    /// Convert to the protocol action name
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::Swap { .. } => "swap",
            GameAction::Powerup => "powerup",
            GameAction::Reset => "reset",
        }
    }
}

/// Feedback the presentation layer may map to haptics or sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackKind {
    /// A cascade pass cleared matched tiles
    Match,
    /// A power-up cleared the whole board
    Clear,
}

impl FeedbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Match => "match",
            FeedbackKind::Clear => "clear",
        }
    }
}

/// Why a mutating call was refused.
///
/// Rejections are ordinary results, never panics: the caller branches on them
/// and the session state is untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// Positions out of bounds or not edge-adjacent
    InvalidSwap,
    /// The swap formed no match and was reverted
    NoMatch,
    /// A cascade is still settling or awaiting playback
    EngineBusy,
    /// No power-ups remain
    NoPowerupsAvailable,
    /// No productive swap and no power-ups remain
    GameOver,
}

impl Rejection {
    /// Stable wire code
    pub fn code(self) -> &'static str {
        match self {
            Rejection::InvalidSwap => "invalid_swap",
            Rejection::NoMatch => "no_match",
            Rejection::EngineBusy => "engine_busy",
            Rejection::NoPowerupsAvailable => "no_powerups",
            Rejection::GameOver => "game_over",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Rejection::InvalidSwap => "positions must be in bounds and adjacent",
            Rejection::NoMatch => "swap produced no match and was reverted",
            Rejection::EngineBusy => "a cascade is still in progress",
            Rejection::NoPowerupsAvailable => "no power-ups remaining",
            Rejection::GameOver => "game is over",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
