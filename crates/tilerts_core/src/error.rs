//! Error types for the tile-grid simulation.
//!
//! Nothing in the core is fatal: every error here describes a rejected
//! request that leaves the simulation in a consistent state.

use thiserror::Error;

use crate::grid::TilePos;
use crate::unit::UnitId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Reasons a path search reports "not found".
///
/// Callers that only care whether a path exists can treat every variant
/// the same way; the variants exist so the presentation layer can show
/// why an order produced no movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathError {
    /// Start tile lies outside the grid.
    #[error("start tile {0} is outside the grid")]
    StartOutOfBounds(TilePos),

    /// Goal tile lies outside the grid.
    #[error("goal tile {0} is outside the grid")]
    GoalOutOfBounds(TilePos),

    /// Goal tile is blocked terrain.
    #[error("goal tile {0} is not walkable")]
    GoalNotWalkable(TilePos),

    /// The open set ran dry before reaching the goal.
    #[error("no path from {start} to {goal}")]
    NoPath {
        /// Search start.
        start: TilePos,
        /// Search goal.
        goal: TilePos,
    },

    /// A path exists but does not fit the fixed path buffer.
    #[error("path of {length} tiles exceeds capacity of {capacity}")]
    PathTooLong {
        /// Tiles in the reconstructed path, endpoints included.
        length: usize,
        /// Maximum tiles a path may hold.
        capacity: usize,
    },
}

/// Reasons a move command was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Destination lies outside the grid.
    #[error("destination {0} is outside the grid")]
    OutOfBounds(TilePos),

    /// Destination is blocked terrain.
    #[error("destination {0} is not walkable")]
    NotWalkable(TilePos),

    /// Destination is claimed by a unit.
    #[error("destination {0} is occupied")]
    Occupied(TilePos),

    /// The destination is valid but unreachable.
    #[error("pathfinding failed: {0}")]
    Path(#[from] PathError),

    /// No unit with this identifier exists.
    #[error("unknown unit id: {0}")]
    UnknownUnit(UnitId),
}

/// Top-level error type for the simulation.
#[derive(Debug, Error)]
pub enum GameError {
    /// A move command was rejected.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// A unit could not be placed on the requested tile.
    #[error("cannot spawn unit at {0}: tile is outside, blocked or occupied")]
    SpawnBlocked(TilePos),

    /// Configuration values are unusable.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },
}
