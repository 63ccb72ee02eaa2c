//! Test fixtures and helpers.
//!
//! Pre-built maps and game states for consistent testing.

use tilerts_core::config::frame_dt;
use tilerts_core::game::GameState;
use tilerts_core::grid::{Grid, TilePos};
use tilerts_core::math::Fixed;
use tilerts_core::unit::UnitId;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> Fixed {
    Fixed::from_num(n)
}

/// Shorthand for a tile coordinate.
#[must_use]
pub const fn pos(x: i32, y: i32) -> TilePos {
    TilePos::new(x, y)
}

/// Build a grid from rows of text: `#` is blocked, anything else is open.
///
/// # Panics
///
/// Panics if `rows` is empty or the rows differ in length.
#[must_use]
pub fn grid_from_rows(rows: &[&str]) -> Grid {
    assert!(!rows.is_empty(), "grid needs at least one row");
    let width = rows[0].len();
    assert!(
        rows.iter().all(|row| row.len() == width),
        "all rows must have the same width"
    );

    let mut grid = Grid::new(width as i32, rows.len() as i32, 32);
    for (y, row) in rows.iter().enumerate() {
        for (x, cell) in row.bytes().enumerate() {
            if cell == b'#' {
                grid.set_walkable(pos(x as i32, y as i32), false);
            }
        }
    }
    grid
}

/// Block one column from `from_y` to `to_y` (exclusive).
pub fn vertical_wall(grid: &mut Grid, x: i32, from_y: i32, to_y: i32) {
    for y in from_y..to_y {
        grid.set_walkable(pos(x, y), false);
    }
}

/// Wall off every odd row except for one gap that alternates between the
/// right and left edge, leaving a single serpentine corridor.
pub fn serpentine(grid: &mut Grid) {
    for y in (1..grid.height()).step_by(2) {
        let gap = if (y / 2) % 2 == 0 { grid.width() - 1 } else { 0 };
        for x in (0..grid.width()).filter(|&x| x != gap) {
            grid.set_walkable(pos(x, y), false);
        }
    }
}

/// Default session with one unit at `tile`.
///
/// # Panics
///
/// Panics if `tile` is not a valid spawn tile on the default map.
#[must_use]
pub fn game_with_unit(tile: TilePos) -> (GameState, UnitId) {
    let mut game = GameState::default();
    let id = game
        .spawn_unit(tile)
        .expect("fixture spawn tile must be free");
    (game, id)
}

/// Update at the reference frame rate until no unit is moving or has queued
/// steps, or `max_ticks` elapse. Returns the ticks run.
pub fn run_until_idle(game: &mut GameState, max_ticks: u64) -> u64 {
    for tick in 0..max_ticks {
        let busy = game
            .units()
            .iter()
            .any(|u| u.is_moving() || !u.queue().is_exhausted());
        if !busy {
            return tick;
        }
        game.update(frame_dt());
    }
    max_ticks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_from_rows() {
        let grid = grid_from_rows(&["..#", "#..", "..."]);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 3);
        assert!(!grid.is_walkable(pos(2, 0)));
        assert!(!grid.is_walkable(pos(0, 1)));
        assert!(grid.is_walkable(pos(1, 1)));
    }

    #[test]
    fn test_run_until_idle_stops_early() {
        let (mut game, id) = game_with_unit(pos(0, 0));
        game.issue_move(id, pos(2, 0)).unwrap();
        let ticks = run_until_idle(&mut game, 1_000);
        assert!(ticks < 1_000);
        assert_eq!(game.unit(id).unwrap().tile(), pos(2, 0));
    }
}
