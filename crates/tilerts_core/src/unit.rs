//! Units and their per-tick movement state machine.
//!
//! A unit keeps two positions apart: the committed logical tile, which is
//! what the grid sees as occupied, and the interpolated render position,
//! which glides between tiles at the unit's speed. Occupancy only changes
//! when an interpolation step completes.

use serde::{Deserialize, Serialize};

use crate::grid::{Grid, TilePos};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::movement::MovementQueue;

/// Unique identifier for units.
pub type UnitId = u32;

/// Movement state derived from the `moving` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitState {
    /// Not interpolating. The queue may still hold steps not yet started.
    Idle,
    /// Moving from the committed tile toward the target tile.
    Interpolating,
}

/// A controllable unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    id: UnitId,
    /// Committed logical tile, always marked occupied in the grid.
    tile: TilePos,
    /// Interpolated position in world space.
    render_pos: Vec2Fixed,
    /// Tile of the in-flight interpolation step.
    target: TilePos,
    /// World units per second.
    #[serde(with = "fixed_serde")]
    speed: Fixed,
    moving: bool,
    queue: MovementQueue,
}

impl Unit {
    /// Place a unit on `tile` and claim it in the grid.
    ///
    /// The caller validates the tile; see
    /// [`GameState::spawn_unit`](crate::game::GameState::spawn_unit).
    #[must_use]
    pub fn spawn(id: UnitId, grid: &mut Grid, tile: TilePos, speed: Fixed) -> Self {
        grid.set_occupied(tile, true);
        Self {
            id,
            tile,
            render_pos: grid.tile_to_world(tile),
            target: tile,
            speed,
            moving: false,
            queue: MovementQueue::new(),
        }
    }

    /// Unit identifier.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Committed logical tile.
    #[must_use]
    pub const fn tile(&self) -> TilePos {
        self.tile
    }

    /// Interpolated render position.
    #[must_use]
    pub const fn render_pos(&self) -> Vec2Fixed {
        self.render_pos
    }

    /// Target tile of the current (or last) interpolation step.
    #[must_use]
    pub const fn target(&self) -> TilePos {
        self.target
    }

    /// Movement speed in world units per second.
    #[must_use]
    pub const fn speed(&self) -> Fixed {
        self.speed
    }

    /// True while an interpolation step is in flight.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.moving
    }

    /// Current state machine state.
    #[must_use]
    pub const fn state(&self) -> UnitState {
        if self.moving {
            UnitState::Interpolating
        } else {
            UnitState::Idle
        }
    }

    /// Remaining steps of the current order.
    #[must_use]
    pub fn queue(&self) -> &MovementQueue {
        &self.queue
    }

    pub(crate) fn queue_mut(&mut self) -> &mut MovementQueue {
        &mut self.queue
    }

    /// Discard the current order and leave the Interpolating state.
    pub fn stop(&mut self) {
        self.queue.clear();
        self.moving = false;
    }

    /// Advance one tick of `dt` seconds.
    ///
    /// Returns the newly committed tile when a step completes.
    pub fn update(&mut self, grid: &mut Grid, dt: Fixed) -> Option<TilePos> {
        self.update_with_claims(grid, dt, &[])
    }

    /// [`update`](Self::update) that also refuses to start a step into any
    /// tile in `claimed` (in-flight targets of other units).
    ///
    /// A refused step stays at the head of the queue and is retried on the
    /// next tick.
    pub fn update_with_claims(
        &mut self,
        grid: &mut Grid,
        dt: Fixed,
        claimed: &[TilePos],
    ) -> Option<TilePos> {
        if !self.moving && !self.start_next_step(grid, claimed) {
            self.settle(grid, dt);
            return None;
        }

        let target_world = grid.tile_to_world(self.target);
        let delta = target_world - self.render_pos;
        let distance = delta.length();
        let step = self.speed * dt;

        if step >= distance {
            self.render_pos = target_world;

            grid.set_occupied(self.tile, false);
            self.tile = self.target;
            grid.set_occupied(self.tile, true);

            self.moving = false;
            self.queue.advance();

            tracing::debug!(unit = self.id, tile = %self.tile, "step committed");
            return Some(self.tile);
        }

        self.render_pos = self.render_pos + delta.normalize().scale(step);
        None
    }

    /// Pull the next queued tile as the interpolation target.
    fn start_next_step(&mut self, grid: &Grid, claimed: &[TilePos]) -> bool {
        let Some(next) = self.queue.peek() else {
            return false;
        };

        if grid.is_occupied(next) || claimed.contains(&next) {
            tracing::trace!(unit = self.id, tile = %next, "next step blocked");
            return false;
        }

        self.target = next;
        self.moving = true;
        true
    }

    /// Glide the render position back onto the committed tile after an
    /// order was replaced or rejected mid-step. Grid state is untouched.
    fn settle(&mut self, grid: &Grid, dt: Fixed) {
        let home = grid.tile_to_world(self.tile);
        if self.render_pos == home {
            return;
        }

        let delta = home - self.render_pos;
        let step = self.speed * dt;
        if step >= delta.length() {
            self.render_pos = home;
        } else {
            self.render_pos = self.render_pos + delta.normalize().scale(step);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt() -> Fixed {
        Fixed::ONE / Fixed::from_num(60)
    }

    fn spawn_at(grid: &mut Grid, x: i32, y: i32) -> Unit {
        Unit::spawn(1, grid, TilePos::new(x, y), Fixed::from_num(150))
    }

    #[test]
    fn test_spawn_claims_tile_and_aligns_render_position() {
        let mut grid = Grid::default();
        let unit = spawn_at(&mut grid, 5, 5);

        assert!(grid.is_occupied(TilePos::new(5, 5)));
        assert_eq!(unit.render_pos(), Vec2Fixed::from_ints(160, 160));
        assert_eq!(unit.target(), unit.tile());
        assert_eq!(unit.state(), UnitState::Idle);
        assert!(unit.queue().is_exhausted());
    }

    #[test]
    fn test_idle_with_empty_queue_stays_idle() {
        let mut grid = Grid::default();
        let mut unit = spawn_at(&mut grid, 5, 5);
        let before = unit.clone();

        assert_eq!(unit.update(&mut grid, dt()), None);
        assert_eq!(unit, before);
    }

    #[test]
    fn test_single_step_interpolates_then_commits() {
        let mut grid = Grid::default();
        let mut unit = spawn_at(&mut grid, 0, 0);
        unit.queue_mut().push(TilePos::new(1, 0));

        // 150 px/s at 60 fps is 2.5 px per tick; 32 px takes 13 ticks.
        for _ in 0..12 {
            assert_eq!(unit.update(&mut grid, dt()), None);
            assert_eq!(unit.state(), UnitState::Interpolating);
            assert_eq!(unit.tile(), TilePos::new(0, 0));
        }
        assert!(unit.render_pos().x > Fixed::from_num(29));
        assert_eq!(unit.render_pos().y, Fixed::ZERO);

        assert_eq!(unit.update(&mut grid, dt()), Some(TilePos::new(1, 0)));
        assert_eq!(unit.render_pos(), Vec2Fixed::from_ints(32, 0));
        assert_eq!(unit.state(), UnitState::Idle);
        assert!(!grid.is_occupied(TilePos::new(0, 0)));
        assert!(grid.is_occupied(TilePos::new(1, 0)));
        assert_eq!(unit.queue().current_index(), 1);
    }

    #[test]
    fn test_large_step_arrives_in_one_tick() {
        let mut grid = Grid::default();
        let mut unit = spawn_at(&mut grid, 0, 0);
        unit.queue_mut().push(TilePos::new(0, 1));

        assert_eq!(unit.update(&mut grid, Fixed::ONE), Some(TilePos::new(0, 1)));
        assert_eq!(unit.render_pos(), Vec2Fixed::from_ints(0, 32));
    }

    #[test]
    fn test_zero_distance_step_is_immediate_arrival() {
        let mut grid = Grid::default();
        let mut unit = spawn_at(&mut grid, 2, 2);
        // Degenerate queue entry equal to the render position's tile.
        grid.set_occupied(TilePos::new(2, 2), false);
        unit.queue_mut().push(TilePos::new(2, 2));

        assert_eq!(unit.update(&mut grid, Fixed::ZERO), Some(TilePos::new(2, 2)));
        assert!(grid.is_occupied(TilePos::new(2, 2)));
        assert_eq!(unit.state(), UnitState::Idle);
    }

    #[test]
    fn test_blocked_step_waits() {
        let mut grid = Grid::default();
        let mut unit = spawn_at(&mut grid, 0, 0);
        unit.queue_mut().push(TilePos::new(1, 0));
        grid.set_occupied(TilePos::new(1, 0), true);

        assert_eq!(unit.update(&mut grid, dt()), None);
        assert_eq!(unit.state(), UnitState::Idle);
        assert_eq!(unit.queue().current_index(), 0);

        grid.set_occupied(TilePos::new(1, 0), false);
        unit.update(&mut grid, dt());
        assert_eq!(unit.state(), UnitState::Interpolating);
    }

    #[test]
    fn test_claimed_step_waits() {
        let mut grid = Grid::default();
        let mut unit = spawn_at(&mut grid, 0, 0);
        unit.queue_mut().push(TilePos::new(1, 0));

        let claimed = [TilePos::new(1, 0)];
        assert_eq!(unit.update_with_claims(&mut grid, dt(), &claimed), None);
        assert_eq!(unit.state(), UnitState::Idle);
    }

    #[test]
    fn test_stop_mid_step_settles_back_home() {
        let mut grid = Grid::default();
        let mut unit = spawn_at(&mut grid, 0, 0);
        unit.queue_mut().push(TilePos::new(1, 0));
        for _ in 0..4 {
            unit.update(&mut grid, dt());
        }
        assert!(unit.render_pos().x > Fixed::ZERO);

        unit.stop();
        for _ in 0..10 {
            unit.update(&mut grid, dt());
        }
        assert_eq!(unit.render_pos(), Vec2Fixed::ZERO);
        assert_eq!(unit.tile(), TilePos::new(0, 0));
        assert!(grid.is_occupied(TilePos::new(0, 0)));
        assert!(!grid.is_occupied(TilePos::new(1, 0)));
    }
}
