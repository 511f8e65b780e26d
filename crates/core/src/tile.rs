//! Tile module - logical tile values
//!
//! A tile is a kind plus the position it currently occupies. It carries a
//! session-unique id so a presentation layer can keep its own id -> renderable
//! map; nothing render-related lives here.

use crate::types::{Position, TileKind};

/// Session-unique tile handle, assigned in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u32);

/// A tile on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub id: TileId,
    pub kind: TileKind,
    /// Authoritative position; rewritten whenever the grid moves the tile.
    pub position: Position,
}

impl Tile {
    pub fn new(id: TileId, kind: TileKind, position: Position) -> Self {
        Self { id, kind, position }
    }
}
