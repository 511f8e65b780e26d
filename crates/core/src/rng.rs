//! RNG module - palette shuffling and tile generation
//!
//! Each session shuffles the full kind pool once at start. Refills draw
//! uniformly from the first `active_tile_types` entries of that fixed order,
//! so raising the active count brings in the next shuffled kind rather than a
//! fresh random one.
//!
//! Everything is driven by a single seedable LCG so sessions replay exactly
//! from their seed.

use crate::tile::{Tile, TileId};
use crate::types::{Position, TileKind};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Scales from the high bits; the low bits of a power-of-two LCG cycle
    /// with very short periods.
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

/// Session-fixed ordering of the kind pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    order: Vec<TileKind>,
}

impl Palette {
    /// Identity ordering over the first `size` kinds
    pub fn ordered(size: u8) -> Self {
        Self {
            order: (0..size).map(TileKind).collect(),
        }
    }

    /// Ordering over the first `size` kinds, shuffled once
    pub fn shuffled(size: u8, rng: &mut SimpleRng) -> Self {
        let mut palette = Self::ordered(size);
        rng.shuffle(&mut palette.order);
        palette
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Kinds currently in play
    pub fn active(&self, active_tile_types: u8) -> &[TileKind] {
        let n = (active_tile_types as usize).min(self.order.len());
        &self.order[..n]
    }

    pub fn as_slice(&self) -> &[TileKind] {
        &self.order
    }
}

/// Creates new tiles: draws kinds from the palette and hands out ids
#[derive(Debug, Clone)]
pub struct TileSource {
    rng: SimpleRng,
    palette: Palette,
    next_id: u32,
}

impl TileSource {
    /// Shuffle a fresh palette from `seed`
    pub fn new(seed: u32, palette_size: u8) -> Self {
        let mut rng = SimpleRng::new(seed);
        let palette = Palette::shuffled(palette_size, &mut rng);
        Self {
            rng,
            palette,
            next_id: 0,
        }
    }

    /// Use an explicit palette ordering (fixtures and replays)
    pub fn with_palette(seed: u32, palette: Palette) -> Self {
        Self {
            rng: SimpleRng::new(seed),
            palette,
            next_id: 0,
        }
    }

    /// Continue ids after `last`, so tiles from a prebuilt grid keep unique ids
    pub fn continue_after(mut self, last: Option<TileId>) -> Self {
        if let Some(TileId(id)) = last {
            self.next_id = self.next_id.max(id + 1);
        }
        self
    }

    /// Reshuffle the palette from the current RNG stream
    pub fn reshuffle(&mut self) {
        let size = self.palette.len() as u8;
        self.palette = Palette::shuffled(size, &mut self.rng);
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Uniform draw from the active prefix of the palette
    pub fn draw_kind(&mut self, active_tile_types: u8) -> TileKind {
        let active = self.palette.active(active_tile_types);
        if active.is_empty() {
            return TileKind(0);
        }
        let i = self.rng.next_range(active.len() as u32) as usize;
        active[i]
    }

    /// New tile at `position`
    pub fn spawn(&mut self, position: Position, active_tile_types: u8) -> Tile {
        let kind = self.draw_kind(active_tile_types);
        let id = TileId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        Tile::new(id, kind, position)
    }
}
