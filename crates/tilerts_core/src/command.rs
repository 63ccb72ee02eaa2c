//! Move command issuance.
//!
//! Turns a destination tile into a unit's movement queue: validate the
//! destination, search a path from the unit's committed tile, and load
//! every tile after the start into the queue. A command always replaces
//! the previous order, even when it is rejected.

use crate::error::{CommandError, PathError};
use crate::grid::{Grid, TilePos};
use crate::pathfinding::{find_path, find_path_traced, Path, SearchTrace};
use crate::unit::Unit;

/// Check that `target` is a legal move destination.
pub fn can_issue_move(grid: &Grid, target: TilePos) -> Result<(), CommandError> {
    if !grid.is_inside(target) {
        return Err(CommandError::OutOfBounds(target));
    }
    if !grid.is_walkable(target) {
        return Err(CommandError::NotWalkable(target));
    }
    if grid.is_occupied(target) {
        return Err(CommandError::Occupied(target));
    }
    Ok(())
}

/// Order `unit` to walk to `target`.
///
/// Returns the number of steps queued. On error the unit is left with an
/// empty queue and does not start a new step.
pub fn issue_move(unit: &mut Unit, grid: &Grid, target: TilePos) -> Result<usize, CommandError> {
    issue(unit, grid, target, |start| find_path(grid, start, target))
}

/// [`issue_move`] that records the search in `trace` for debug overlays.
pub fn issue_move_traced(
    unit: &mut Unit,
    grid: &Grid,
    target: TilePos,
    trace: &mut SearchTrace,
) -> Result<usize, CommandError> {
    issue(unit, grid, target, |start| {
        find_path_traced(grid, start, target, trace)
    })
}

fn issue<F>(unit: &mut Unit, grid: &Grid, target: TilePos, search: F) -> Result<usize, CommandError>
where
    F: FnOnce(TilePos) -> Result<Path, PathError>,
{
    unit.stop();

    let start = unit.tile();
    let result = can_issue_move(grid, target)
        .and_then(|()| search(start).map_err(CommandError::from))
        .map(|path| load_path(unit, &path));

    match &result {
        Ok(steps) => {
            tracing::debug!(unit = unit.id(), from = %start, to = %target, steps, "move order accepted");
        }
        Err(reason) => {
            tracing::debug!(unit = unit.id(), to = %target, %reason, "move order rejected");
        }
    }

    result
}

/// Copy the path minus its start tile into the unit's queue.
///
/// Stops silently when the queue is full.
fn load_path(unit: &mut Unit, path: &Path) -> usize {
    let queue = unit.queue_mut();
    for tile in path.steps() {
        if !queue.push(tile) {
            break;
        }
    }
    queue.count()
}
