//! Scripted input: pixel clicks become move orders.
//!
//! Clicks are translated to tiles with [`Grid::world_to_tile`], dropped
//! if they miss the map, and otherwise handed to the core, which does its
//! own validation.

use serde::Serialize;
use tilerts_core::game::GameState;
use tilerts_core::grid::{Grid, TilePos};
use tilerts_core::math::Vec2Fixed;
use tilerts_core::unit::UnitId;

use crate::scenario::Click;

/// What happened to one click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClickOutcome {
    /// An order was queued.
    Issued {
        /// Ordered unit.
        unit: UnitId,
        /// Destination tile.
        tile: TilePos,
        /// Steps loaded into the queue.
        steps: usize,
    },
    /// The core refused the order.
    Rejected {
        /// Ordered unit.
        unit: UnitId,
        /// Destination tile.
        tile: TilePos,
        /// Human-readable reason.
        reason: String,
    },
    /// The click landed outside the map and was ignored.
    OffMap {
        /// Pixel x.
        x: i32,
        /// Pixel y.
        y: i32,
    },
}

/// Tile under a pixel, if it is on the map.
#[must_use]
pub fn pick_tile(grid: &Grid, x: i32, y: i32) -> Option<TilePos> {
    let tile = grid.world_to_tile(Vec2Fixed::from_ints(x, y));
    grid.is_inside(tile).then_some(tile)
}

/// Apply one click to the game.
pub fn apply_click(game: &mut GameState, click: &Click) -> ClickOutcome {
    let Some(tile) = pick_tile(game.grid(), click.x, click.y) else {
        tracing::debug!(x = click.x, y = click.y, "click off map");
        return ClickOutcome::OffMap {
            x: click.x,
            y: click.y,
        };
    };

    match game.issue_move(click.unit, tile) {
        Ok(steps) => ClickOutcome::Issued {
            unit: click.unit,
            tile,
            steps,
        },
        Err(err) => ClickOutcome::Rejected {
            unit: click.unit,
            tile,
            reason: err.to_string(),
        },
    }
}

/// Parse "X,Y" into a tile.
pub fn parse_tile(value: &str) -> Result<TilePos, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{value}'"))?;
    let x = x
        .trim()
        .parse()
        .map_err(|e| format!("bad x in '{value}': {e}"))?;
    let y = y
        .trim()
        .parse()
        .map_err(|e| format!("bad y in '{value}': {e}"))?;
    Ok(TilePos::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_tile_floors_pixels() {
        let grid = Grid::default();
        assert_eq!(pick_tile(&grid, 0, 0), Some(TilePos::new(0, 0)));
        assert_eq!(pick_tile(&grid, 31, 63), Some(TilePos::new(0, 1)));
        assert_eq!(pick_tile(&grid, 639, 479), Some(TilePos::new(19, 14)));
        assert_eq!(pick_tile(&grid, 640, 0), None);
        assert_eq!(pick_tile(&grid, -1, 10), None);
    }

    #[test]
    fn test_apply_click_issues_order() {
        let mut game = GameState::default();
        let id = game.spawn_unit(TilePos::new(5, 5)).unwrap();
        let click = Click {
            frame: 0,
            unit: id,
            x: 7 * 32 + 1,
            y: 5 * 32 + 1,
        };
        assert_eq!(
            apply_click(&mut game, &click),
            ClickOutcome::Issued {
                unit: id,
                tile: TilePos::new(7, 5),
                steps: 2
            }
        );
    }

    #[test]
    fn test_apply_click_reports_rejection() {
        let mut game = GameState::default();
        let id = game.spawn_unit(TilePos::new(5, 5)).unwrap();
        game.grid_mut().set_walkable(TilePos::new(0, 0), false);
        let click = Click {
            frame: 0,
            unit: id,
            x: 3,
            y: 3,
        };
        let ClickOutcome::Rejected { reason, .. } = apply_click(&mut game, &click) else {
            panic!("expected rejection");
        };
        assert_eq!(reason, "destination (0, 0) is not walkable");
    }

    #[test]
    fn test_off_map_click_is_ignored() {
        let mut game = GameState::default();
        game.spawn_unit(TilePos::new(5, 5)).unwrap();
        let click = Click {
            frame: 0,
            unit: 1,
            x: 2000,
            y: 0,
        };
        assert_eq!(
            apply_click(&mut game, &click),
            ClickOutcome::OffMap { x: 2000, y: 0 }
        );
        assert!(game.units()[0].queue().is_exhausted());
    }

    #[test]
    fn test_parse_tile() {
        assert_eq!(parse_tile("3,4"), Ok(TilePos::new(3, 4)));
        assert_eq!(parse_tile(" 10 , 0"), Ok(TilePos::new(10, 0)));
        assert!(parse_tile("3").is_err());
        assert!(parse_tile("a,1").is_err());
    }
}
