//! Match detection tests

use tile_match::core::{find_matches, has_match, matched_positions, Grid, Orientation};
use tile_match::types::{Position, TileKind};

fn grid(layout: &[&[u8]]) -> Grid {
    let rows: Vec<Vec<Option<TileKind>>> = layout
        .iter()
        .map(|r| {
            r.iter()
                .map(|&k| if k == u8::MAX { None } else { Some(TileKind(k)) })
                .collect()
        })
        .collect();
    Grid::from_kinds(&rows).unwrap()
}

const E: u8 = u8::MAX;

#[test]
fn test_no_match_on_distinct_board() {
    let g = grid(&[&[0, 1, 2], &[3, 4, 5], &[6, 7, 8]]);
    assert!(find_matches(&g).is_empty());
    assert!(!has_match(&g));
}

#[test]
fn test_horizontal_run_of_three() {
    let g = grid(&[&[0, 0, 0], &[1, 2, 3], &[4, 5, 6]]);
    let groups = find_matches(&g);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].kind, TileKind(0));
    assert_eq!(groups[0].orientation, Orientation::Horizontal);
    assert_eq!(
        groups[0].positions,
        vec![Position::new(0, 0), Position::new(1, 0), Position::new(2, 0)]
    );
}

#[test]
fn test_vertical_run_of_four_is_one_group() {
    let g = grid(&[&[1, 0, 2], &[3, 0, 4], &[5, 0, 6], &[7, 0, 8]]);
    let groups = find_matches(&g);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].orientation, Orientation::Vertical);
    assert_eq!(groups[0].len(), 4);
}

#[test]
fn test_crossing_runs_share_a_cell_once() {
    // Row 1 and column 1 both run through (1, 1).
    let g = grid(&[&[1, 0, 2], &[0, 0, 0], &[3, 0, 4]]);
    let groups = find_matches(&g);
    assert_eq!(groups.len(), 2);

    let cleared = matched_positions(&groups);
    assert_eq!(cleared.len(), 5);
    assert_eq!(
        cleared.iter().filter(|&&p| p == Position::new(1, 1)).count(),
        1
    );
}

#[test]
fn test_empty_cells_never_match() {
    let g = grid(&[&[E, E, E], &[0, 1, 0], &[1, 0, 1]]);
    assert!(!has_match(&g));
}

#[test]
fn test_two_of_a_kind_is_not_a_match() {
    let g = grid(&[&[0, 0, 1, 1], &[2, 3, 2, 3]]);
    assert!(find_matches(&g).is_empty());
}
