//! Grid module - the board of optional tile slots
//!
//! The grid is a fixed `width x height` rectangle stored as a flat row-major
//! vector. Every position is always addressable; only occupancy varies.
//! Coordinates: (col, row) where col grows left to right and row grows top to
//! bottom, so gravity pulls tiles toward the highest row index.

use arrayvec::ArrayVec;

use crate::tile::{Tile, TileId};
use crate::types::{Direction, Position, TileKind};

/// The game grid
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    width: u8,
    height: u8,
    /// Flat array of cells, row-major order (row * width + col)
    cells: Vec<Option<Tile>>,
}

impl Grid {
    /// Create an empty grid
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    /// Build a grid from rows of kinds (top row first). Tile ids are assigned
    /// row-major starting at 0. Returns None for an empty or ragged layout.
    pub fn from_kinds(rows: &[Vec<Option<TileKind>>]) -> Option<Self> {
        let height = u8::try_from(rows.len()).ok()?;
        let width = u8::try_from(rows.first()?.len()).ok()?;
        if width == 0 || rows.iter().any(|r| r.len() != width as usize) {
            return None;
        }

        let mut grid = Self::new(width, height);
        let mut next_id = 0u32;
        for (row, kinds) in rows.iter().enumerate() {
            for (col, kind) in kinds.iter().enumerate() {
                if let Some(kind) = kind {
                    let pos = Position::new(col as u8, row as u8);
                    grid.set(pos, Some(Tile::new(TileId(next_id), *kind, pos)));
                    next_id += 1;
                }
            }
        }
        Some(grid)
    }

    /// Calculate flat index from a position
    #[inline(always)]
    fn index(&self, pos: Position) -> Option<usize> {
        if pos.col >= self.width || pos.row >= self.height {
            return None;
        }
        Some(pos.row as usize * self.width as usize + pos.col as usize)
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Number of addressable cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    /// Cell at a position. The outer None means out of bounds; the inner None
    /// means an empty cell.
    pub fn cell(&self, pos: Position) -> Option<Option<&Tile>> {
        self.index(pos).map(|idx| self.cells[idx].as_ref())
    }

    /// Tile at a position, if any
    pub fn get(&self, pos: Position) -> Option<&Tile> {
        self.cell(pos).flatten()
    }

    pub fn kind_at(&self, pos: Position) -> Option<TileKind> {
        self.get(pos).map(|t| t.kind)
    }

    /// Store a cell. The tile's stored position is rewritten to `pos`.
    /// Returns false if out of bounds.
    pub fn set(&mut self, pos: Position, cell: Option<Tile>) -> bool {
        match self.index(pos) {
            Some(idx) => {
                self.cells[idx] = cell.map(|mut tile| {
                    tile.position = pos;
                    tile
                });
                true
            }
            None => false,
        }
    }

    /// Remove and return the tile at a position, leaving the cell empty
    pub fn take(&mut self, pos: Position) -> Option<Tile> {
        let idx = self.index(pos)?;
        self.cells[idx].take()
    }

    /// Exchange the contents of two cells, keeping stored positions in sync.
    /// Returns false if either position is out of bounds.
    pub fn exchange(&mut self, a: Position, b: Position) -> bool {
        let (Some(ia), Some(ib)) = (self.index(a), self.index(b)) else {
            return false;
        };
        self.cells.swap(ia, ib);
        if let Some(tile) = self.cells[ia].as_mut() {
            tile.position = a;
        }
        if let Some(tile) = self.cells[ib].as_mut() {
            tile.position = b;
        }
        true
    }

    /// In-bounds edge neighbours, in the order up, down, left, right
    pub fn neighbors4(&self, pos: Position) -> ArrayVec<Position, 4> {
        let mut out = ArrayVec::new();
        if !self.in_bounds(pos) {
            return out;
        }
        for dir in Direction::ALL {
            if let Some(n) = pos.step(dir) {
                if self.in_bounds(n) {
                    out.push(n);
                }
            }
        }
        out
    }

    /// All positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let width = self.width;
        let height = self.height;
        (0..height).flat_map(move |row| (0..width).map(move |col| Position::new(col, row)))
    }

    /// Occupied tiles in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter().flatten()
    }

    pub fn occupied_count(&self) -> usize {
        self.tiles().count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| c.is_some())
    }

    /// Empty positions in row-major order
    pub fn empty_positions(&self) -> Vec<Position> {
        self.positions().filter(|&p| self.get(p).is_none()).collect()
    }

    /// Row-major kind snapshot
    pub fn kinds(&self) -> Vec<Option<TileKind>> {
        self.cells.iter().map(|c| c.map(|t| t.kind)).collect()
    }

    /// Highest tile id currently on the grid
    pub fn max_tile_id(&self) -> Option<TileId> {
        self.tiles().map(|t| t.id).max()
    }

    /// Empty every cell
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    /// Verify every stored tile position equals its grid coordinates
    pub fn positions_consistent(&self) -> bool {
        self.positions()
            .all(|p| self.get(p).map_or(true, |t| t.position == p))
    }
}
