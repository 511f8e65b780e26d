//! Matcher module - run detection
//!
//! Scans a grid for straight runs of three or more tiles of the same kind.
//! The row pass runs first (rows top to bottom, left to right), then the
//! column pass (columns left to right, top to bottom).
//!
//! Horizontal and vertical runs are reported as separate groups even when
//! they cross, so a plus- or T-shaped match yields two groups. A tile that
//! sits in two groups is still cleared once; use [`matched_positions`] for
//! the deduplicated clear set.

use crate::grid::Grid;
use crate::types::{Position, TileKind, MATCH_LENGTH};

/// Direction of a detected run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// One detected run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    pub kind: TileKind,
    pub orientation: Orientation,
    /// Member positions in scan order
    pub positions: Vec<Position>,
}

impl MatchGroup {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.positions.contains(&pos)
    }
}

/// Find every match group on the grid. Empty cells never match.
pub fn find_matches(grid: &Grid) -> Vec<MatchGroup> {
    let mut matches = Vec::new();
    let (w, h) = (grid.width(), grid.height());

    for row in 0..h {
        scan_line(
            grid,
            (0..w).map(|col| Position::new(col, row)),
            Orientation::Horizontal,
            &mut matches,
        );
    }
    for col in 0..w {
        scan_line(
            grid,
            (0..h).map(|row| Position::new(col, row)),
            Orientation::Vertical,
            &mut matches,
        );
    }

    matches
}

/// True when the grid holds at least one run
pub fn has_match(grid: &Grid) -> bool {
    let (w, h) = (grid.width(), grid.height());
    let triple = |a: Position, b: Position, c: Position| match grid.kind_at(a) {
        Some(kind) => grid.kind_at(b) == Some(kind) && grid.kind_at(c) == Some(kind),
        None => false,
    };

    for row in 0..h {
        for col in 0..w.saturating_sub(2) {
            if triple(
                Position::new(col, row),
                Position::new(col + 1, row),
                Position::new(col + 2, row),
            ) {
                return true;
            }
        }
    }
    for col in 0..w {
        for row in 0..h.saturating_sub(2) {
            if triple(
                Position::new(col, row),
                Position::new(col, row + 1),
                Position::new(col, row + 2),
            ) {
                return true;
            }
        }
    }
    false
}

/// Union of all group members, each position once, in first-seen order
pub fn matched_positions(groups: &[MatchGroup]) -> Vec<Position> {
    let mut out: Vec<Position> = Vec::new();
    for pos in groups.iter().flat_map(|g| g.positions.iter()) {
        if !out.contains(pos) {
            out.push(*pos);
        }
    }
    out
}

/// Slide a triple window along one line.
///
/// When a window matches and its first tile is not part of the open group,
/// the open group is closed and a new one begins. Runs of four or more extend
/// the open group one tile at a time.
fn scan_line(
    grid: &Grid,
    line: impl Iterator<Item = Position>,
    orientation: Orientation,
    out: &mut Vec<MatchGroup>,
) {
    let line: Vec<Position> = line.collect();
    let mut group: Option<MatchGroup> = None;

    for window in line.windows(MATCH_LENGTH) {
        let Some(kind) = grid.kind_at(window[0]) else {
            continue;
        };
        if window[1..].iter().any(|&p| grid.kind_at(p) != Some(kind)) {
            continue;
        }

        let discontinuous = group.as_ref().is_some_and(|open| !open.contains(window[0]));
        if discontinuous {
            out.extend(group.take());
        }

        let open = group.get_or_insert_with(|| MatchGroup {
            kind,
            orientation,
            positions: Vec::with_capacity(MATCH_LENGTH),
        });
        for &pos in window {
            if !open.contains(pos) {
                open.positions.push(pos);
            }
        }
    }

    out.extend(group);
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Option<TileKind> = Some(TileKind(0));
    const B: Option<TileKind> = Some(TileKind(1));
    const C: Option<TileKind> = Some(TileKind(2));

    fn p(col: u8, row: u8) -> Position {
        Position::new(col, row)
    }

    #[test]
    fn test_run_of_four_is_one_group() {
        let grid = Grid::from_kinds(&[vec![A, A, A, A, B]]).unwrap();
        let groups = find_matches(&grid);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].positions, vec![p(0, 0), p(1, 0), p(2, 0), p(3, 0)]);
    }

    #[test]
    fn test_adjacent_runs_of_different_kinds_split() {
        let grid = Grid::from_kinds(&[vec![A, A, A, B, B, B]]).unwrap();
        let groups = find_matches(&grid);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].kind, TileKind(0));
        assert_eq!(groups[1].kind, TileKind(1));
        assert_eq!(groups[1].positions, vec![p(3, 0), p(4, 0), p(5, 0)]);
    }

    #[test]
    fn test_gap_splits_runs_of_same_kind() {
        let grid = Grid::from_kinds(&[vec![A, A, A, C, A, A, A]]).unwrap();
        let groups = find_matches(&grid);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].positions, vec![p(4, 0), p(5, 0), p(6, 0)]);
    }

    #[test]
    fn test_empty_cells_never_match() {
        let grid = Grid::from_kinds(&[vec![None, None, None]]).unwrap();
        assert!(find_matches(&grid).is_empty());
        assert!(!has_match(&grid));
    }

    #[test]
    fn test_plus_shape_reports_two_groups_sharing_center() {
        let grid = Grid::from_kinds(&[
            vec![B, A, C],
            vec![A, A, A],
            vec![C, A, B],
        ])
        .unwrap();
        let groups = find_matches(&grid);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].orientation, Orientation::Horizontal);
        assert_eq!(groups[1].orientation, Orientation::Vertical);
        assert!(groups[0].contains(p(1, 1)) && groups[1].contains(p(1, 1)));

        let cleared = matched_positions(&groups);
        assert_eq!(cleared.len(), 5);
    }

    mod props {
        use super::super::*;
        use proptest::prelude::*;

        fn arb_grid() -> impl Strategy<Value = Grid> {
            (3u8..=7, 3u8..=7).prop_flat_map(|(w, h)| {
                let cell = proptest::option::weighted(0.9, 0u8..4);
                proptest::collection::vec(cell, w as usize * h as usize).prop_map(move |cells| {
                    let rows: Vec<Vec<Option<TileKind>>> = cells
                        .chunks(w as usize)
                        .map(|r| r.iter().map(|k| k.map(TileKind)).collect())
                        .collect();
                    Grid::from_kinds(&rows).unwrap_or_else(|| Grid::new(w, h))
                })
            })
        }

        proptest! {
            #[test]
            fn has_match_agrees_with_find_matches(grid in arb_grid()) {
                prop_assert_eq!(has_match(&grid), !find_matches(&grid).is_empty());
            }

            #[test]
            fn every_group_is_a_straight_run_of_one_kind(grid in arb_grid()) {
                for group in find_matches(&grid) {
                    prop_assert!(group.len() >= MATCH_LENGTH);
                    for pair in group.positions.windows(2) {
                        prop_assert!(pair[0].is_adjacent(pair[1]));
                    }
                    for &pos in &group.positions {
                        prop_assert_eq!(grid.kind_at(pos), Some(group.kind));
                    }
                }
            }
        }
    }
}
