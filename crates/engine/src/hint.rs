//! Hint module - rank productive swaps by their first-pass clear

use tile_match_core::grid::Grid;
use tile_match_core::matcher::{find_matches, matched_positions};
use tile_match_core::moves::productive_swaps;
use tile_match_core::swap::trial_swap;
use tile_match_types::Position;

/// A productive swap and how many tiles its first pass clears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hint {
    pub from: Position,
    pub to: Position,
    pub clears: usize,
}

/// Every productive swap, in row-major scan order
pub fn hints(grid: &Grid) -> Vec<Hint> {
    let mut scratch = grid.clone();
    productive_swaps(grid)
        .into_iter()
        .filter_map(|(from, to)| {
            let clears = trial_swap(&mut scratch, from, to, |g| {
                matched_positions(&find_matches(g)).len()
            })?;
            Some(Hint { from, to, clears })
        })
        .collect()
}

/// The swap clearing the most tiles on its first pass. Ties go to the
/// earliest in scan order.
pub fn hint(grid: &Grid) -> Option<Hint> {
    hints(grid).into_iter().fold(None, |best, h| match best {
        Some(b) if b.clears >= h.clears => Some(b),
        _ => Some(h),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_match_types::TileKind;

    fn grid(rows: &[&[u8]]) -> Grid {
        let rows: Vec<Vec<Option<TileKind>>> = rows
            .iter()
            .map(|r| r.iter().map(|&k| Some(TileKind(k))).collect())
            .collect();
        Grid::from_kinds(&rows).unwrap()
    }

    #[test]
    fn test_no_hint_on_dead_board() {
        let g = grid(&[&[0, 1, 2], &[3, 4, 5], &[6, 7, 8]]);
        assert_eq!(hint(&g), None);
        assert!(hints(&g).is_empty());
    }

    #[test]
    fn test_hint_prefers_larger_clear() {
        // (2,0)<->(2,1) makes a run of three in row 0.
        // (2,2)<->(2,3) makes a run of four in row 2.
        let g = grid(&[
            &[0, 0, 5, 9, 8],
            &[3, 4, 0, 6, 7],
            &[1, 1, 2, 1, 3],
            &[5, 6, 1, 4, 8],
        ]);
        assert!(hints(&g).iter().any(|h| h.clears == 3));
        let best = hint(&g).unwrap();
        assert_eq!(best.clears, 4);
        assert_eq!(best.from, Position::new(2, 2));
        assert_eq!(best.to, Position::new(2, 3));
    }
}
