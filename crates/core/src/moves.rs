//! Moves module - is any productive swap left?
//!
//! Tries every rightward and downward neighbour pair on a scratch copy.
//! Left and up pairs are the same swaps seen from the other side.

use crate::grid::Grid;
use crate::matcher::has_match;
use crate::swap::trial_swap;
use crate::types::{Direction, Position};

fn candidate_pairs(grid: &Grid) -> impl Iterator<Item = (Position, Position)> + '_ {
    grid.positions().flat_map(move |pos| {
        [Direction::Right, Direction::Down]
            .into_iter()
            .filter_map(move |dir| pos.step(dir))
            .filter(move |&n| grid.in_bounds(n))
            .map(move |n| (pos, n))
    })
}

/// True when at least one adjacent swap would create a match.
/// The caller's grid is never changed.
pub fn any_move_available(grid: &Grid) -> bool {
    let mut scratch = grid.clone();
    candidate_pairs(grid).any(|(a, b)| trial_swap(&mut scratch, a, b, has_match).unwrap_or(false))
}

/// Every productive swap, row-major by the first position
pub fn productive_swaps(grid: &Grid) -> Vec<(Position, Position)> {
    let mut scratch = grid.clone();
    candidate_pairs(grid)
        .filter(|&(a, b)| trial_swap(&mut scratch, a, b, has_match).unwrap_or(false))
        .collect()
}
