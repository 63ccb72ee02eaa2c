//! Grid-based pathfinding using the A* algorithm.
//!
//! The search keeps exactly one node per grid cell in a table indexed by
//! `y * width + x`. The table is sized once per call and never grows, and
//! predecessors are stored as indices into it. For a fixed grid and fixed
//! endpoints the result is identical on every call: neighbors are tried in
//! a fixed order and ties on f-cost go to the lowest cell index.

use serde::{Deserialize, Serialize};

use crate::config::MAX_PATH_LENGTH;
use crate::error::PathError;
use crate::grid::{Grid, TilePos};

/// Neighbor offsets: up, right, down, left.
const NEIGHBORS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// A tile sequence from start to goal, both inclusive.
///
/// Holds at most [`MAX_PATH_LENGTH`] tiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Path {
    tiles: Vec<TilePos>,
}

impl Path {
    /// Tiles in walking order.
    #[must_use]
    pub fn tiles(&self) -> &[TilePos] {
        &self.tiles
    }

    /// Number of tiles, endpoints included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True if the path holds no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// First tile.
    #[must_use]
    pub fn start(&self) -> Option<TilePos> {
        self.tiles.first().copied()
    }

    /// Last tile.
    #[must_use]
    pub fn goal(&self) -> Option<TilePos> {
        self.tiles.last().copied()
    }

    /// Tiles after the start, in walking order.
    pub fn steps(&self) -> impl Iterator<Item = TilePos> + '_ {
        self.tiles.iter().skip(1).copied()
    }
}

/// Per-cell record of what the last search touched.
///
/// Diagnostic only: drawn by debug overlays, never read by the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchTrace {
    width: i32,
    opened: Vec<bool>,
    closed: Vec<bool>,
    in_path: Vec<bool>,
    expanded: usize,
}

impl SearchTrace {
    /// Create an empty trace sized for `grid`.
    #[must_use]
    pub fn new(grid: &Grid) -> Self {
        let mut trace = Self::default();
        trace.reset(grid);
        trace
    }

    /// Clear all flags and resize for `grid`.
    pub fn reset(&mut self, grid: &Grid) {
        let cells = grid.cell_count();
        self.width = grid.width();
        self.expanded = 0;
        for flags in [&mut self.opened, &mut self.closed, &mut self.in_path] {
            flags.clear();
            flags.resize(cells, false);
        }
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width {
            return None;
        }
        let index = (pos.y as usize) * (self.width as usize) + (pos.x as usize);
        (index < self.opened.len()).then_some(index)
    }

    /// The cell was added to the open set at some point.
    #[must_use]
    pub fn is_opened(&self, pos: TilePos) -> bool {
        self.index(pos).is_some_and(|i| self.opened[i])
    }

    /// The cell was expanded.
    #[must_use]
    pub fn is_closed(&self, pos: TilePos) -> bool {
        self.index(pos).is_some_and(|i| self.closed[i])
    }

    /// The cell is part of the returned path.
    #[must_use]
    pub fn is_in_path(&self, pos: TilePos) -> bool {
        self.index(pos).is_some_and(|i| self.in_path[i])
    }

    /// Number of nodes expanded (closed) by the search.
    #[must_use]
    pub const fn expanded(&self) -> usize {
        self.expanded
    }
}

/// Search state of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum NodeState {
    #[default]
    Unvisited,
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, Default)]
struct Node {
    g_cost: u32,
    f_cost: u32,
    parent: Option<usize>,
    state: NodeState,
}

/// Manhattan distance, admissible and consistent for unit-cost 4-way moves.
#[inline]
fn heuristic(a: TilePos, b: TilePos) -> u32 {
    a.manhattan_distance(b)
}

/// Find a shortest 4-directional path from `start` to `goal`.
///
/// Tiles that are blocked or occupied are never entered. The goal's own
/// occupancy is not a precondition: an occupied goal simply cannot be
/// reached.
///
/// # Errors
///
/// - [`PathError::StartOutOfBounds`] / [`PathError::GoalOutOfBounds`]
/// - [`PathError::GoalNotWalkable`]
/// - [`PathError::NoPath`] if the goal is unreachable
/// - [`PathError::PathTooLong`] if the shortest path exceeds
///   [`MAX_PATH_LENGTH`] tiles
pub fn find_path(grid: &Grid, start: TilePos, goal: TilePos) -> Result<Path, PathError> {
    search(grid, start, goal, None)
}

/// [`find_path`] that also records which cells were opened, closed and
/// included in the path.
///
/// `trace` is reset first and is filled even when the search fails.
pub fn find_path_traced(
    grid: &Grid,
    start: TilePos,
    goal: TilePos,
    trace: &mut SearchTrace,
) -> Result<Path, PathError> {
    trace.reset(grid);
    search(grid, start, goal, Some(trace))
}

fn search(
    grid: &Grid,
    start: TilePos,
    goal: TilePos,
    mut trace: Option<&mut SearchTrace>,
) -> Result<Path, PathError> {
    let Some(start_index) = grid.index_of(start) else {
        return Err(PathError::StartOutOfBounds(start));
    };
    let Some(goal_index) = grid.index_of(goal) else {
        return Err(PathError::GoalOutOfBounds(goal));
    };
    if !grid.is_walkable(goal) {
        return Err(PathError::GoalNotWalkable(goal));
    }

    if start_index == goal_index {
        if let Some(trace) = trace.as_deref_mut() {
            trace.in_path[start_index] = true;
        }
        return Ok(Path { tiles: vec![start] });
    }

    let mut nodes = vec![Node::default(); grid.cell_count()];
    nodes[start_index] = Node {
        g_cost: 0,
        f_cost: heuristic(start, goal),
        parent: None,
        state: NodeState::Open,
    };
    if let Some(trace) = trace.as_deref_mut() {
        trace.opened[start_index] = true;
    }

    let mut expanded = 0usize;
    loop {
        let Some(current_index) = lowest_open(&nodes) else {
            tracing::debug!(%start, %goal, expanded, "open set exhausted");
            return Err(PathError::NoPath { start, goal });
        };

        if current_index == goal_index {
            break;
        }

        nodes[current_index].state = NodeState::Closed;
        expanded += 1;
        if let Some(trace) = trace.as_deref_mut() {
            trace.closed[current_index] = true;
            trace.expanded += 1;
        }

        let current = grid.pos_of(current_index);
        let tentative_g = nodes[current_index].g_cost + 1;

        for (dx, dy) in NEIGHBORS {
            let neighbor = current.offset(dx, dy);
            let Some(neighbor_index) = grid.index_of(neighbor) else {
                continue;
            };
            if !grid.is_walkable(neighbor) || grid.is_occupied(neighbor) {
                continue;
            }

            let node = &mut nodes[neighbor_index];
            match node.state {
                NodeState::Closed => continue,
                NodeState::Open if tentative_g >= node.g_cost => continue,
                NodeState::Open | NodeState::Unvisited => {}
            }

            *node = Node {
                g_cost: tentative_g,
                f_cost: tentative_g + heuristic(neighbor, goal),
                parent: Some(current_index),
                state: NodeState::Open,
            };
            if let Some(trace) = trace.as_deref_mut() {
                trace.opened[neighbor_index] = true;
            }
        }
    }

    let path = reconstruct_path(grid, &nodes, goal_index)?;
    if let Some(trace) = trace {
        for &tile in path.tiles() {
            if let Some(index) = grid.index_of(tile) {
                trace.in_path[index] = true;
            }
        }
    }

    tracing::debug!(%start, %goal, expanded, length = path.len(), "path found");
    Ok(path)
}

/// Lowest f-cost open node; the first one in index order wins ties.
fn lowest_open(nodes: &[Node]) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (index, node) in nodes.iter().enumerate() {
        if node.state != NodeState::Open {
            continue;
        }
        if best.map_or(true, |(_, f)| node.f_cost < f) {
            best = Some((index, node.f_cost));
        }
    }
    best.map(|(index, _)| index)
}

/// Walk predecessor links from the goal back to the start.
fn reconstruct_path(grid: &Grid, nodes: &[Node], goal_index: usize) -> Result<Path, PathError> {
    let length = std::iter::successors(Some(goal_index), |&i| nodes[i].parent).count();
    if length > MAX_PATH_LENGTH {
        return Err(PathError::PathTooLong {
            length,
            capacity: MAX_PATH_LENGTH,
        });
    }

    let mut tiles: Vec<TilePos> = std::iter::successors(Some(goal_index), |&i| nodes[i].parent)
        .map(|i| grid.pos_of(i))
        .collect();
    tiles.reverse();
    Ok(Path { tiles })
}
