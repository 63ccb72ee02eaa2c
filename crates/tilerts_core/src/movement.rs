//! Per-unit queue of remaining tile steps.

use serde::{Deserialize, Serialize};

use crate::config::MAX_PATH_LENGTH;
use crate::grid::TilePos;

/// Bounded sequence of future tile steps plus a cursor.
///
/// Invariant: `current_index <= count <= capacity`. The queue never holds
/// the unit's committed tile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovementQueue {
    tiles: Vec<TilePos>,
    capacity: usize,
    current_index: usize,
}

impl MovementQueue {
    /// Create an empty queue holding up to [`MAX_PATH_LENGTH`] steps.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_PATH_LENGTH)
    }

    /// Create an empty queue with a custom bound.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tiles: Vec::with_capacity(capacity),
            capacity,
            current_index: 0,
        }
    }

    /// Drop every step and rewind the cursor.
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.current_index = 0;
    }

    /// Append a step. Returns `false` and changes nothing when full.
    pub fn push(&mut self, tile: TilePos) -> bool {
        if self.tiles.len() >= self.capacity {
            return false;
        }
        self.tiles.push(tile);
        true
    }

    /// The step at the cursor, if any remain.
    #[must_use]
    pub fn peek(&self) -> Option<TilePos> {
        self.tiles.get(self.current_index).copied()
    }

    /// Move the cursor past the current step.
    pub fn advance(&mut self) {
        if self.current_index < self.tiles.len() {
            self.current_index += 1;
        }
    }

    /// Number of valid entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.tiles.len()
    }

    /// Cursor into the entries.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    /// Maximum number of entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once every step has been consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.current_index >= self.tiles.len()
    }

    /// Steps not yet started, in order.
    #[must_use]
    pub fn remaining(&self) -> &[TilePos] {
        &self.tiles[self.current_index..]
    }

    /// All entries, including consumed ones.
    #[must_use]
    pub fn tiles(&self) -> &[TilePos] {
        &self.tiles
    }
}

impl Default for MovementQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_queue_is_empty() {
        let queue = MovementQueue::new();
        assert_eq!(queue.count(), 0);
        assert_eq!(queue.current_index(), 0);
        assert_eq!(queue.capacity(), MAX_PATH_LENGTH);
        assert!(queue.is_exhausted());
        assert_eq!(queue.peek(), None);
    }

    #[test]
    fn test_push_peek_advance() {
        let mut queue = MovementQueue::new();
        queue.push(TilePos::new(1, 0));
        queue.push(TilePos::new(2, 0));

        assert_eq!(queue.peek(), Some(TilePos::new(1, 0)));
        queue.advance();
        assert_eq!(queue.peek(), Some(TilePos::new(2, 0)));
        assert_eq!(queue.remaining(), &[TilePos::new(2, 0)]);
        queue.advance();
        assert!(queue.is_exhausted());

        // Cursor never runs past the end.
        queue.advance();
        assert_eq!(queue.current_index(), 2);
    }

    #[test]
    fn test_push_respects_capacity() {
        let mut queue = MovementQueue::with_capacity(2);
        assert!(queue.push(TilePos::new(0, 1)));
        assert!(queue.push(TilePos::new(0, 2)));
        assert!(!queue.push(TilePos::new(0, 3)));
        assert_eq!(queue.count(), 2);
    }

    #[test]
    fn test_clear_rewinds() {
        let mut queue = MovementQueue::new();
        queue.push(TilePos::new(1, 0));
        queue.advance();
        queue.clear();
        assert_eq!(queue.count(), 0);
        assert_eq!(queue.current_index(), 0);
    }
}
