//! Grid tests - bounds, occupancy and tile position bookkeeping

use tile_match::core::{Grid, Tile, TileId};
use tile_match::types::{Position, TileKind, DEFAULT_HEIGHT, DEFAULT_WIDTH};

fn rows(layout: &[&[u8]]) -> Vec<Vec<Option<TileKind>>> {
    layout
        .iter()
        .map(|r| r.iter().map(|&k| Some(TileKind(k))).collect())
        .collect()
}

#[test]
fn test_grid_new_empty() {
    let grid = Grid::new(DEFAULT_WIDTH, DEFAULT_HEIGHT);
    assert_eq!(grid.width(), 6);
    assert_eq!(grid.height(), 6);
    assert_eq!(grid.len(), 36);
    assert_eq!(grid.occupied_count(), 0);

    for pos in grid.positions() {
        assert_eq!(grid.cell(pos), Some(None), "cell {} should be empty", pos);
    }
}

#[test]
fn test_grid_out_of_bounds() {
    let mut grid = Grid::new(4, 3);
    assert_eq!(grid.cell(Position::new(4, 0)), None);
    assert_eq!(grid.cell(Position::new(0, 3)), None);

    let tile = Tile::new(TileId(0), TileKind(1), Position::new(9, 9));
    assert!(!grid.set(Position::new(4, 0), Some(tile)));
    assert!(!grid.exchange(Position::new(0, 0), Position::new(0, 3)));
    assert!(grid.neighbors4(Position::new(7, 7)).is_empty());
}

#[test]
fn test_set_rewrites_stored_position() {
    let mut grid = Grid::new(3, 3);
    let tile = Tile::new(TileId(5), TileKind(2), Position::new(0, 0));
    assert!(grid.set(Position::new(2, 1), Some(tile)));

    let stored = grid.get(Position::new(2, 1)).unwrap();
    assert_eq!(stored.position, Position::new(2, 1));
    assert_eq!(stored.id, TileId(5));
    assert!(grid.positions_consistent());
}

#[test]
fn test_from_kinds_layout() {
    let grid = Grid::from_kinds(&rows(&[&[0, 1, 2], &[3, 4, 5]])).unwrap();
    assert_eq!((grid.width(), grid.height()), (3, 2));
    assert_eq!(grid.kind_at(Position::new(2, 0)), Some(TileKind(2)));
    assert_eq!(grid.kind_at(Position::new(0, 1)), Some(TileKind(3)));
    assert_eq!(grid.get(Position::new(2, 1)).unwrap().id, TileId(5));
    assert_eq!(grid.max_tile_id(), Some(TileId(5)));
    assert!(grid.is_full());
}

#[test]
fn test_from_kinds_rejects_ragged() {
    let ragged = vec![vec![Some(TileKind(0)); 3], vec![Some(TileKind(0)); 2]];
    assert!(Grid::from_kinds(&ragged).is_none());
    assert!(Grid::from_kinds(&[]).is_none());
}

#[test]
fn test_exchange_keeps_positions_in_sync() {
    let mut grid = Grid::from_kinds(&rows(&[&[0, 1], &[2, 3]])).unwrap();
    let a = Position::new(0, 0);
    let b = Position::new(1, 0);
    assert!(grid.exchange(a, b));

    assert_eq!(grid.kind_at(a), Some(TileKind(1)));
    assert_eq!(grid.kind_at(b), Some(TileKind(0)));
    assert!(grid.positions_consistent());
}

#[test]
fn test_take_and_empty_positions() {
    let mut grid = Grid::from_kinds(&rows(&[&[0, 1, 2], &[3, 4, 5]])).unwrap();
    let taken = grid.take(Position::new(1, 1)).unwrap();
    assert_eq!(taken.kind, TileKind(4));
    assert_eq!(grid.empty_positions(), vec![Position::new(1, 1)]);
    assert!(!grid.is_full());

    grid.clear();
    assert_eq!(grid.occupied_count(), 0);
}

#[test]
fn test_neighbors_at_corner_and_center() {
    let grid = Grid::new(3, 3);
    let corner = grid.neighbors4(Position::new(0, 0));
    assert_eq!(corner.as_slice(), &[Position::new(0, 1), Position::new(1, 0)]);

    let center = grid.neighbors4(Position::new(1, 1));
    assert_eq!(center.len(), 4);
}
