//! Proptest strategies for maps and move orders.
//!
//! Everything is sized against an explicit `width`/`height` so the same
//! generators serve small property-test maps and the default 20x15 map.

use proptest::collection::{btree_set, vec};
use proptest::prelude::*;
use tilerts_core::grid::{Grid, TilePos};

/// A tile inside a `width` x `height` map.
pub fn arb_tile(width: i32, height: i32) -> impl Strategy<Value = TilePos> {
    (0..width, 0..height).prop_map(|(x, y)| TilePos::new(x, y))
}

/// A tile anywhere in a band of `margin` tiles around the map, inside or
/// out. Used to exercise bounds handling.
pub fn arb_any_tile(width: i32, height: i32, margin: i32) -> impl Strategy<Value = TilePos> {
    (-margin..width + margin, -margin..height + margin).prop_map(|(x, y)| TilePos::new(x, y))
}

/// Up to `max` distinct blocked tiles.
pub fn arb_obstacles(
    width: i32,
    height: i32,
    max: usize,
) -> impl Strategy<Value = Vec<TilePos>> {
    btree_set(arb_tile(width, height), 0..=max).prop_map(|set| set.into_iter().collect())
}

/// A map with random blocked terrain.
pub fn arb_grid(width: i32, height: i32, max_obstacles: usize) -> impl Strategy<Value = Grid> {
    arb_obstacles(width, height, max_obstacles).prop_map(move |blocked| {
        let mut grid = Grid::new(width, height, 32);
        for tile in blocked {
            grid.set_walkable(tile, false);
        }
        grid
    })
}

/// A map together with a walkable start tile and any in-bounds goal.
///
/// The start is forced walkable by clearing it if the obstacle set hit it.
pub fn arb_search_case(
    width: i32,
    height: i32,
    max_obstacles: usize,
) -> impl Strategy<Value = (Grid, TilePos, TilePos)> {
    (
        arb_grid(width, height, max_obstacles),
        arb_tile(width, height),
        arb_tile(width, height),
    )
        .prop_map(|(mut grid, start, goal)| {
            grid.set_walkable(start, true);
            (grid, start, goal)
        })
}

/// One scripted order: which unit (by spawn index) and where to, issued on
/// a given tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedOrder {
    /// Tick the order is issued before.
    pub tick: u64,
    /// Index into the spawned units.
    pub unit_index: usize,
    /// Destination, possibly out of bounds.
    pub target: TilePos,
}

/// A sorted-by-tick sequence of up to `max` orders for `units` units.
pub fn arb_orders(
    width: i32,
    height: i32,
    units: usize,
    max: usize,
    max_tick: u64,
) -> impl Strategy<Value = Vec<ScriptedOrder>> {
    vec(
        (0..max_tick, 0..units.max(1), arb_any_tile(width, height, 2)).prop_map(
            |(tick, unit_index, target)| ScriptedOrder {
                tick,
                unit_index,
                target,
            },
        ),
        0..=max,
    )
    .prop_map(|mut orders| {
        orders.sort_by_key(|order| order.tick);
        orders
    })
}
