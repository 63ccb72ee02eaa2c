//! Determinism testing utilities.
//!
//! Identical orders on an identical map must produce identical unit
//! positions, tick for tick. Sources of divergence this harness is meant
//! to catch:
//!
//! - **Floating-point math**: render interpolation runs on
//!   [`tilerts_core::math::Fixed`], never `f32`.
//! - **Iteration order**: units update in id order and A* scans its node
//!   table in index order.
//! - **Serialization drift**: a saved and restored session must hash the
//!   same as the live one.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tilerts_core::config::frame_dt;
use tilerts_core::game::GameState;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// All distinct hashes; a deterministic run has exactly one.
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                self.unique_hashes().len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation `runs` times for `ticks` steps and compare final hashes.
///
/// # Example
///
/// ```
/// use tilerts_core::config::frame_dt;
/// use tilerts_core::game::GameState;
/// use tilerts_core::grid::TilePos;
/// use tilerts_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(
///     3,
///     90,
///     || {
///         let mut game = GameState::default();
///         let id = game.spawn_unit(TilePos::new(0, 0)).unwrap();
///         game.issue_move(id, TilePos::new(6, 4)).unwrap();
///         game
///     },
///     |game| {
///         game.update(frame_dt());
///     },
///     GameState::state_hash,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..ticks {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a [`GameState`] twice at the reference frame rate and compare.
pub fn verify_game_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> GameState,
{
    verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |game| {
            game.update(frame_dt());
        },
        GameState::state_hash,
    )
    .is_deterministic
}

/// Step two copies of a session side by side and report the first tick at
/// which their hashes differ.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> GameState,
{
    let mut a = setup_fn();
    let mut b = setup_fn();

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        a.update(frame_dt());
        b.update(frame_dt());
        if a.state_hash() != b.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Check that a RON save/restore mid-run keeps the session in lockstep
/// with an uninterrupted copy.
pub fn verify_serialization_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> GameState,
{
    let mut live = setup_fn();
    for _ in 0..num_ticks {
        live.update(frame_dt());
    }

    let Ok(saved) = ron::to_string(&live) else {
        return false;
    };
    let Ok(mut restored) = ron::from_str::<GameState>(&saved) else {
        return false;
    };

    if restored.state_hash() != live.state_hash() {
        return false;
    }

    for _ in 0..num_ticks {
        live.update(frame_dt());
        restored.update(frame_dt());
    }
    restored.state_hash() == live.state_hash()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilerts_core::grid::TilePos;

    fn two_unit_game() -> GameState {
        let mut game = GameState::default();
        let a = game.spawn_unit(TilePos::new(0, 0)).unwrap();
        let b = game.spawn_unit(TilePos::new(19, 14)).unwrap();
        for y in 2..13 {
            game.grid_mut().set_walkable(TilePos::new(10, y), false);
        }
        game.issue_move(a, TilePos::new(18, 7)).unwrap();
        game.issue_move(b, TilePos::new(1, 7)).unwrap();
        game
    }

    #[test]
    fn test_verify_determinism_counter() {
        let result = verify_determinism(3, 10, || 0u64, |n| *n += 1, |n| *n);
        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![10, 10, 10]);
        assert_eq!(result.unique_hashes(), vec![10]);
    }

    #[test]
    fn test_non_deterministic_setup_is_detected() {
        let calls = std::cell::Cell::new(0u64);
        let result = verify_determinism(
            2,
            1,
            || {
                calls.set(calls.get() + 1);
                calls.get()
            },
            |_| {},
            |n| *n,
        );
        assert!(!result.is_deterministic);
        assert_eq!(result.unique_hashes().len(), 2);
    }

    #[test]
    fn test_game_is_deterministic() {
        assert!(verify_game_determinism(two_unit_game, 600));
    }

    #[test]
    fn test_no_divergence() {
        assert_eq!(find_first_divergence(two_unit_game, 300), None);
    }

    #[test]
    fn test_serialization_keeps_lockstep() {
        assert!(verify_serialization_determinism(two_unit_game, 45));
    }

    #[test]
    fn test_compute_hash_is_stable() {
        let tile = TilePos::new(3, 4);
        assert_eq!(compute_hash(&tile), compute_hash(&TilePos::new(3, 4)));
        assert_ne!(compute_hash(&tile), compute_hash(&TilePos::new(4, 3)));
    }
}
