//! Swap module - exchanging two adjacent cells
//!
//! A swap is legal iff both positions are in bounds and share an edge. Whether
//! the swap is productive is decided afterwards by the matcher, not here.

use crate::grid::Grid;
use crate::types::Position;

/// True when the two positions share an edge
pub fn are_adjacent(a: Position, b: Position) -> bool {
    a.is_adjacent(b)
}

/// True when both positions are in bounds and edge-adjacent
pub fn can_swap(grid: &Grid, a: Position, b: Position) -> bool {
    grid.in_bounds(a) && grid.in_bounds(b) && are_adjacent(a, b)
}

/// Exchange two adjacent cells. Returns false, leaving the grid untouched,
/// when the swap is not legal.
pub fn apply_swap(grid: &mut Grid, a: Position, b: Position) -> bool {
    if !can_swap(grid, a, b) {
        return false;
    }
    grid.exchange(a, b)
}

/// Swap, run `check` against the swapped grid, then swap back.
///
/// The grid is restored to its exact prior state whatever `check` returns.
/// Returns None when the swap is not legal (and `check` is not called).
pub fn trial_swap<R>(
    grid: &mut Grid,
    a: Position,
    b: Position,
    check: impl FnOnce(&Grid) -> R,
) -> Option<R> {
    if !apply_swap(grid, a, b) {
        return None;
    }
    let result = check(grid);
    grid.exchange(a, b);
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::find_matches;
    use crate::types::TileKind;

    fn row(kinds: &[u8]) -> Vec<Option<TileKind>> {
        kinds.iter().map(|&k| Some(TileKind(k))).collect()
    }

    #[test]
    fn test_diagonal_and_distant_swaps_rejected() {
        let mut grid = Grid::from_kinds(&[row(&[0, 1, 2]), row(&[3, 4, 5])]).unwrap();
        let before = grid.clone();
        assert!(!apply_swap(&mut grid, Position::new(0, 0), Position::new(1, 1)));
        assert!(!apply_swap(&mut grid, Position::new(0, 0), Position::new(2, 0)));
        assert!(!apply_swap(&mut grid, Position::new(2, 0), Position::new(3, 0)));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_apply_swap_moves_tiles_and_ids() {
        let mut grid = Grid::from_kinds(&[row(&[0, 1])]).unwrap();
        let left_id = grid.get(Position::new(0, 0)).unwrap().id;
        assert!(apply_swap(&mut grid, Position::new(0, 0), Position::new(1, 0)));
        let moved = grid.get(Position::new(1, 0)).unwrap();
        assert_eq!(moved.id, left_id);
        assert_eq!(moved.kind, TileKind(0));
        assert_eq!(moved.position, Position::new(1, 0));
    }

    #[test]
    fn test_trial_swap_restores_grid() {
        let mut grid = Grid::from_kinds(&[row(&[0, 0, 1]), row(&[2, 3, 0])]).unwrap();
        let before = grid.clone();

        let found = trial_swap(&mut grid, Position::new(2, 0), Position::new(2, 1), |g| {
            find_matches(g).len()
        });
        assert_eq!(found, Some(1));
        assert_eq!(grid, before);

        let illegal = trial_swap(&mut grid, Position::new(0, 0), Position::new(2, 1), |_| ());
        assert_eq!(illegal, None);
        assert_eq!(grid, before);
    }
}
