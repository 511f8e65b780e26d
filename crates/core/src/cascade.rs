//! Cascade module - clear, compact, refill, repeat
//!
//! One resolution runs passes until the grid holds no match:
//!
//! 1. find all match groups; stop if there are none
//! 2. clear every matched tile once, awarding points per tile
//! 3. compact each column toward the bottom, keeping relative order
//! 4. refill every empty cell from the active palette
//!
//! Each pass clears at least three tiles and leaves the grid full, so a
//! random source terminates quickly. [`MAX_CASCADE_PASSES`] bounds a
//! degenerate source (for example a single-kind palette) that would refill
//! matches forever.

use tracing::{debug, warn};

use crate::events::GameEvent;
use crate::game_state::GameState;
use crate::grid::Grid;
use crate::matcher::{find_matches, matched_positions};
use crate::rng::TileSource;
use crate::tile::Tile;
use crate::types::{FeedbackKind, Position};

/// Upper bound on passes in one resolution
pub const MAX_CASCADE_PASSES: u32 = 1_000;

/// What one resolution did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Passes that cleared something
    pub passes: u32,
    /// Every cleared position, pass by pass
    pub cleared: Vec<Position>,
    pub points: u32,
    pub level_ups: u32,
}

impl CascadeReport {
    pub fn merge(&mut self, other: CascadeReport) {
        self.passes += other.passes;
        self.cleared.extend(other.cleared);
        self.points += other.points;
        self.level_ups += other.level_ups;
    }
}

/// Result of clearing a set of positions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearReport {
    pub cleared: Vec<Position>,
    pub points: u32,
    pub level_ups: u32,
}

/// Remove the tiles at `positions`, awarding each one. Empty and duplicate
/// positions are skipped, so a tile is never scored twice.
pub fn clear_positions(
    grid: &mut Grid,
    positions: &[Position],
    state: &mut GameState,
    events: &mut Vec<GameEvent>,
) -> ClearReport {
    let mut report = ClearReport::default();

    for &pos in positions {
        if grid.take(pos).is_none() {
            continue;
        }
        report.cleared.push(pos);
        let award = state.award_tile();
        report.points += award.points;
        if award.level_up {
            report.level_ups += 1;
            events.push(GameEvent::LevelChanged(state.level()));
        }
    }

    if !report.cleared.is_empty() {
        events.push(GameEvent::TilesCleared(report.cleared.clone()));
        events.push(GameEvent::ScoreChanged(state.score()));
    }
    report
}

/// Let tiles fall toward the highest row index, column by column.
/// Returns the moves as (from, to), bottom-most first within each column.
pub fn compact(grid: &mut Grid) -> Vec<(Position, Position)> {
    let mut moves = Vec::new();

    for col in 0..grid.width() {
        let mut write = grid.height() as usize;
        for read in (0..grid.height() as usize).rev() {
            let from = Position::new(col, read as u8);
            if grid.get(from).is_none() {
                continue;
            }
            write -= 1;
            if write != read {
                let to = Position::new(col, write as u8);
                let tile = grid.take(from);
                grid.set(to, tile);
                moves.push((from, to));
            }
        }
    }

    moves
}

/// Fill every empty cell with a new tile, column by column, top to bottom
pub fn refill(grid: &mut Grid, state: &GameState, source: &mut TileSource) -> Vec<Tile> {
    let mut spawned = Vec::new();

    for col in 0..grid.width() {
        for row in 0..grid.height() {
            let pos = Position::new(col, row);
            if grid.get(pos).is_none() {
                let tile = source.spawn(pos, state.active_tile_types());
                grid.set(pos, Some(tile));
                spawned.push(tile);
            }
        }
    }

    spawned
}

/// Compact then refill, logging both steps
pub fn settle(
    grid: &mut Grid,
    state: &GameState,
    source: &mut TileSource,
    events: &mut Vec<GameEvent>,
) {
    let moves = compact(grid);
    if !moves.is_empty() {
        events.push(GameEvent::TilesMoved(moves));
    }
    let spawned = refill(grid, state, source);
    if !spawned.is_empty() {
        events.push(GameEvent::TilesSpawned(spawned));
    }
}

/// Run passes until the grid is stable. A stable grid is left untouched.
pub fn resolve(
    grid: &mut Grid,
    state: &mut GameState,
    source: &mut TileSource,
    events: &mut Vec<GameEvent>,
) -> CascadeReport {
    let mut report = CascadeReport::default();

    loop {
        let groups = find_matches(grid);
        if groups.is_empty() {
            break;
        }
        if report.passes >= MAX_CASCADE_PASSES {
            warn!(passes = report.passes, "cascade pass limit reached, grid left unsettled");
            break;
        }

        let targets = matched_positions(&groups);
        events.push(GameEvent::Feedback(FeedbackKind::Match));
        let cleared = clear_positions(grid, &targets, state, events);
        settle(grid, state, source, events);

        report.passes += 1;
        debug!(
            pass = report.passes,
            groups = groups.len(),
            cleared = cleared.cleared.len(),
            score = state.score(),
            "cascade pass"
        );
        report.points += cleared.points;
        report.level_ups += cleared.level_ups;
        report.cleared.extend(cleared.cleared);
    }

    report
}

/// Clear matches without scoring until the grid is stable. Builds fresh
/// boards, so a new or reset session always starts at score 0. Older builds
/// of the game scored these accidental matches; this one does not.
pub fn stabilize(grid: &mut Grid, state: &GameState, source: &mut TileSource) -> u32 {
    let mut passes = 0;
    while passes < MAX_CASCADE_PASSES {
        let groups = find_matches(grid);
        if groups.is_empty() {
            return passes;
        }
        for pos in matched_positions(&groups) {
            grid.take(pos);
        }
        compact(grid);
        refill(grid, state, source);
        passes += 1;
    }
    warn!(passes, "board stabilization pass limit reached");
    passes
}

/// Clear the whole board unconditionally, refill, then resolve any matches
/// the refill produced
pub fn clear_board(
    grid: &mut Grid,
    state: &mut GameState,
    source: &mut TileSource,
    events: &mut Vec<GameEvent>,
) -> CascadeReport {
    let occupied: Vec<Position> = grid.tiles().map(|t| t.position).collect();
    events.push(GameEvent::Feedback(FeedbackKind::Clear));
    let cleared = clear_positions(grid, &occupied, state, events);
    settle(grid, state, source, events);

    let mut report = CascadeReport {
        passes: 0,
        cleared: cleared.cleared,
        points: cleared.points,
        level_ups: cleared.level_ups,
    };
    report.merge(resolve(grid, state, source, events));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::has_match;
    use crate::types::TileKind;

    fn kinds(rows: &[&[u8]]) -> Vec<Vec<Option<TileKind>>> {
        rows.iter()
            .map(|r| r.iter().map(|&k| Some(TileKind(k))).collect())
            .collect()
    }

    #[test]
    fn test_compact_preserves_order() {
        let a = Some(TileKind(0));
        let b = Some(TileKind(1));
        let mut grid = Grid::from_kinds(&[vec![a], vec![None], vec![b], vec![None]]).unwrap();
        let top_id = grid.get(Position::new(0, 0)).unwrap().id;

        let moves = compact(&mut grid);
        assert_eq!(
            moves,
            vec![
                (Position::new(0, 2), Position::new(0, 3)),
                (Position::new(0, 0), Position::new(0, 2)),
            ]
        );
        assert_eq!(grid.kind_at(Position::new(0, 3)), b);
        assert_eq!(grid.kind_at(Position::new(0, 2)), a);
        assert_eq!(grid.get(Position::new(0, 2)).unwrap().id, top_id);
        assert!(grid.get(Position::new(0, 0)).is_none());
        assert!(grid.positions_consistent());
    }

    #[test]
    fn test_clear_positions_skips_duplicates() {
        let mut grid = Grid::from_kinds(&kinds(&[&[0, 0, 0]])).unwrap();
        let mut state = GameState::default();
        let mut events = Vec::new();
        let p = Position::new(0, 0);
        let report = clear_positions(&mut grid, &[p, p, Position::new(1, 0)], &mut state, &mut events);
        assert_eq!(report.cleared.len(), 2);
        assert_eq!(state.score(), 20);
    }

    #[test]
    fn test_resolve_stable_grid_is_noop() {
        let mut grid = Grid::from_kinds(&kinds(&[&[0, 1, 0], &[1, 0, 1], &[0, 1, 0]])).unwrap();
        let before = grid.clone();
        let mut state = GameState::default();
        let mut source = TileSource::new(3, 30);
        let mut events = Vec::new();

        let report = resolve(&mut grid, &mut state, &mut source, &mut events);
        assert_eq!(report, CascadeReport::default());
        assert_eq!(grid, before);
        assert!(events.is_empty());
    }

    #[test]
    fn test_resolve_settles_and_scores() {
        let mut grid = Grid::from_kinds(&kinds(&[&[1, 2, 1], &[2, 1, 2], &[0, 0, 0]])).unwrap();
        let mut state = GameState::default();
        let mut source = TileSource::new(11, 30);
        let mut events = Vec::new();

        let report = resolve(&mut grid, &mut state, &mut source, &mut events);
        assert!(report.passes >= 1);
        assert!(!has_match(&grid));
        assert!(grid.is_full());
        assert_eq!(state.score(), report.points);
        assert_eq!(report.points, 10 * report.cleared.len() as u32);
        assert_eq!(events[0], GameEvent::Feedback(FeedbackKind::Match));
    }

    #[test]
    fn test_level_ups_stop_adding_kinds_at_palette_cap() {
        let mut grid = Grid::from_kinds(&kinds(&[&[1, 2, 1], &[2, 1, 2], &[0, 0, 0]])).unwrap();
        let mut state = GameState::new(4, 10);
        assert_eq!(state.active_tile_types(), 4);
        let mut source = TileSource::new(11, 4);
        let mut events = Vec::new();

        let report = resolve(&mut grid, &mut state, &mut source, &mut events);
        // Every award lands on a multiple of 10.
        assert_eq!(report.level_ups as usize, report.cleared.len());
        assert_eq!(state.level(), 1 + report.level_ups);
        assert_eq!(state.active_tile_types(), 4);
        let logged = events
            .iter()
            .filter(|e| matches!(e, GameEvent::LevelChanged(_)))
            .count();
        assert_eq!(logged as u32, report.level_ups);
        let first = events.iter().find(|e| matches!(e, GameEvent::LevelChanged(_)));
        assert_eq!(first, Some(&GameEvent::LevelChanged(2)));
    }

    #[test]
    fn test_stabilize_does_not_score() {
        let mut grid = Grid::from_kinds(&kinds(&[&[0, 0, 0], &[1, 2, 1], &[2, 1, 2]])).unwrap();
        let state = GameState::default();
        let mut source = TileSource::new(21, 30);

        let passes = stabilize(&mut grid, &state, &mut source);
        assert!(passes >= 1);
        assert!(!has_match(&grid));
        assert!(grid.is_full());
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_single_kind_palette_hits_pass_limit() {
        let mut grid = Grid::from_kinds(&kinds(&[&[0, 0, 0], &[0, 0, 0], &[0, 0, 0]])).unwrap();
        let mut state = GameState::new(3, 1_000_000);
        let mut source = TileSource::with_palette(1, crate::rng::Palette::ordered(1));
        let mut events = Vec::new();

        let report = resolve(&mut grid, &mut state, &mut source, &mut events);
        assert_eq!(report.passes, MAX_CASCADE_PASSES);
    }
}
