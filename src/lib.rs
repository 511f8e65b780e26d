//! Tile match (workspace facade crate).
//!
//! Re-exports `tile_match::{core,adapter,engine,types}` while the implementation
//! lives in dedicated crates under `crates/`.

pub mod config;

pub use tile_match_adapter as adapter;
pub use tile_match_core as core;
pub use tile_match_engine as engine;
pub use tile_match_types as types;

pub use config::GameConfig;
