//! # Tile RTS Core
//!
//! Deterministic simulation core for a tile-grid real-time-strategy
//! prototype.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO
//! - No randomness
//! - No floating-point math (render interpolation uses fixed-point)
//!
//! A unit occupies one tile of a fixed-size [`grid::Grid`]. A move order
//! runs an A* search ([`pathfinding`]), loads the resulting steps into the
//! unit's [`movement::MovementQueue`], and the unit's state machine
//! ([`unit`]) walks them one tile at a time while its render position is
//! interpolated between tiles.
//!
//! ## Crate Structure
//!
//! - [`grid`] - Tile map, walkability and occupancy
//! - [`pathfinding`] - A* search and search diagnostics
//! - [`movement`] - Bounded per-unit step queue
//! - [`unit`] - Unit movement state machine
//! - [`command`] - Move command validation and issuance
//! - [`game`] - Game-state aggregate and frame update
//! - [`config`] - Constants and session configuration
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod command;
pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod math;
pub mod movement;
pub mod pathfinding;
pub mod unit;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::command::{can_issue_move, issue_move, issue_move_traced};
    pub use crate::config::{frame_dt, GameConfig, MAX_PATH_LENGTH};
    pub use crate::error::{CommandError, GameError, PathError, Result};
    pub use crate::game::{Arrival, GameState, StateSnapshot, TickEvents, UnitSnapshot};
    pub use crate::grid::{Grid, Tile, TilePos};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::movement::MovementQueue;
    pub use crate::pathfinding::{find_path, find_path_traced, Path, SearchTrace};
    pub use crate::unit::{Unit, UnitId, UnitState};
}
