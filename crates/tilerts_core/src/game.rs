//! The game-state aggregate and per-frame update.
//!
//! [`GameState`] owns the grid and every unit. Units borrow the grid only
//! for the duration of their own update, and units are updated strictly one
//! after another in id order, so each unit's occupancy commit is complete
//! before the next unit looks at the grid.
//!
//! # Example
//!
//! ```
//! use tilerts_core::config::frame_dt;
//! use tilerts_core::game::GameState;
//! use tilerts_core::grid::TilePos;
//!
//! let mut game = GameState::default();
//! let unit = game.spawn_unit(TilePos::new(0, 0)).unwrap();
//! game.issue_move(unit, TilePos::new(3, 0)).unwrap();
//!
//! for _ in 0..60 {
//!     game.update(frame_dt());
//! }
//! assert_eq!(game.unit(unit).unwrap().tile(), TilePos::new(3, 0));
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::command;
use crate::config::GameConfig;
use crate::error::{CommandError, GameError, Result};
use crate::grid::{Grid, TilePos};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::pathfinding::SearchTrace;
use crate::unit::{Unit, UnitId};

/// A completed step reported by [`GameState::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrival {
    /// Unit that moved.
    pub unit: UnitId,
    /// Its newly committed tile.
    pub tile: TilePos,
}

/// Events generated during one update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Units that committed a new tile this tick, in update order.
    pub arrivals: Vec<Arrival>,
}

/// Read-only view of a unit for render collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    /// Unit identifier.
    pub id: UnitId,
    /// Committed tile.
    pub tile: TilePos,
    /// Interpolation target.
    pub target: TilePos,
    /// Interpolated world position.
    pub render_pos: Vec2Fixed,
    /// True while interpolating.
    pub moving: bool,
    /// Steps left in the current order.
    pub remaining: Vec<TilePos>,
}

/// Read-only view of the whole state for render collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Updates applied so far.
    pub tick: u64,
    /// Accumulated game time in seconds.
    #[serde(with = "fixed_serde")]
    pub time: Fixed,
    /// Map width in tiles.
    pub width: i32,
    /// Map height in tiles.
    pub height: i32,
    /// Every unit, in id order.
    pub units: Vec<UnitSnapshot>,
}

/// Root of the simulation: grid, units and timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    config: GameConfig,
    grid: Grid,
    /// Kept sorted by id; ids are handed out in increasing order.
    units: Vec<Unit>,
    next_unit_id: UnitId,
    #[serde(with = "fixed_serde")]
    time: Fixed,
    tick: u64,
    last_search: SearchTrace,
}

impl GameState {
    /// Create a session with an empty, fully walkable map.
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: GameConfig) -> Self {
        let grid = Grid::from_config(&config);
        let last_search = SearchTrace::new(&grid);
        Self {
            config,
            grid,
            units: Vec::new(),
            next_unit_id: 1,
            time: Fixed::ZERO,
            tick: 0,
            last_search,
        }
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The tile map.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable map access for setting up terrain before play.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Every unit, in id order.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Look up a unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id() == id)
    }

    /// Accumulated game time in seconds.
    #[must_use]
    pub const fn time(&self) -> Fixed {
        self.time
    }

    /// Number of updates applied.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Diagnostic trace of the most recent move command's search.
    #[must_use]
    pub fn last_search(&self) -> &SearchTrace {
        &self.last_search
    }

    /// Place a unit with the configured speed.
    pub fn spawn_unit(&mut self, tile: TilePos) -> Result<UnitId> {
        let speed = self.config.unit_speed_fixed();
        self.spawn_unit_with_speed(tile, speed)
    }

    /// Place a unit. The tile must be inside, walkable, unoccupied and not
    /// the target of a step in flight.
    pub fn spawn_unit_with_speed(&mut self, tile: TilePos, speed: Fixed) -> Result<UnitId> {
        let claimed = self
            .units
            .iter()
            .any(|u| u.is_moving() && u.target() == tile);
        if claimed || command::can_issue_move(&self.grid, tile).is_err() {
            return Err(GameError::SpawnBlocked(tile));
        }

        let id = self.next_unit_id;
        self.next_unit_id += 1;
        self.units.push(Unit::spawn(id, &mut self.grid, tile, speed));
        tracing::debug!(unit = id, %tile, "unit spawned");
        Ok(id)
    }

    /// Validate a destination without issuing anything.
    pub fn can_issue_move(&self, target: TilePos) -> std::result::Result<(), CommandError> {
        command::can_issue_move(&self.grid, target)
    }

    /// Order a unit to walk to `target`, replacing its current order.
    ///
    /// Returns the number of steps queued.
    pub fn issue_move(
        &mut self,
        id: UnitId,
        target: TilePos,
    ) -> std::result::Result<usize, CommandError> {
        let unit = self
            .units
            .iter_mut()
            .find(|u| u.id() == id)
            .ok_or(CommandError::UnknownUnit(id))?;
        command::issue_move_traced(unit, &self.grid, target, &mut self.last_search)
    }

    /// Advance the simulation by `dt` seconds.
    pub fn update(&mut self, dt: Fixed) -> TickEvents {
        let mut events = TickEvents::default();
        self.time += dt;

        for index in 0..self.units.len() {
            let claimed: Vec<TilePos> = self
                .units
                .iter()
                .enumerate()
                .filter(|&(other, unit)| other != index && unit.is_moving())
                .map(|(_, unit)| unit.target())
                .collect();

            let unit = &mut self.units[index];
            if let Some(tile) = unit.update_with_claims(&mut self.grid, dt, &claimed) {
                events.arrivals.push(Arrival {
                    unit: unit.id(),
                    tile,
                });
            }
        }

        self.tick += 1;

        #[cfg(feature = "debug-validation")]
        assert!(
            self.occupancy_is_consistent(),
            "occupancy diverged from unit tiles at tick {}",
            self.tick
        );

        #[cfg(debug_assertions)]
        tracing::trace!(tick = self.tick, state_hash = self.state_hash(), "state hash");

        events
    }

    /// True if the occupied cells are exactly the units' committed tiles.
    #[must_use]
    pub fn occupancy_is_consistent(&self) -> bool {
        let mut occupied: Vec<TilePos> = self.grid.occupied_tiles().collect();
        let mut committed: Vec<TilePos> = self.units.iter().map(|u| u.tile()).collect();
        occupied.sort_unstable();
        committed.sort_unstable();
        occupied == committed
    }

    /// Read-only view for rendering or serialization.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            tick: self.tick,
            time: self.time,
            width: self.grid.width(),
            height: self.grid.height(),
            units: self
                .units
                .iter()
                .map(|unit| UnitSnapshot {
                    id: unit.id(),
                    tile: unit.tile(),
                    target: unit.target(),
                    render_pos: unit.render_pos(),
                    moving: unit.is_moving(),
                    remaining: unit.queue().remaining().to_vec(),
                })
                .collect(),
        }
    }

    /// Hash of all simulation state, for determinism checks.
    ///
    /// The diagnostic search trace is excluded.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);
        self.time.hash(&mut hasher);
        self.grid.hash(&mut hasher);
        self.units.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for GameState {
    /// A session on the default 20x15 map.
    fn default() -> Self {
        Self::from_validated(GameConfig::default())
    }
}
