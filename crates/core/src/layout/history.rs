//! Snapshot-based undo/redo.

use std::collections::VecDeque;

/// Two-stack history of deep-copied snapshots.
///
/// Snapshots are recorded before each mutation. Recording clears the redo stack, so
/// history never branches. With a limit set, the oldest undo entries are evicted first.
#[derive(Debug, Clone)]
pub struct HistoryManager<T> {
    undo: VecDeque<T>,
    redo: Vec<T>,
    limit: Option<usize>,
}

impl<T: Clone> Default for HistoryManager<T> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<T: Clone> HistoryManager<T> {
    /// Create a history, optionally capped at `limit` undo entries.
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.filter(|limit| *limit > 0),
        }
    }

    /// Push `current` as the state preceding a mutation.
    pub fn record(&mut self, current: &T) {
        self.undo.push_back(current.clone());
        if let Some(limit) = self.limit {
            while self.undo.len() > limit {
                self.undo.pop_front();
            }
        }
        self.redo.clear();
    }

    /// Step back, swapping `current` with the latest snapshot. Returns `false` when empty.
    pub fn undo(&mut self, current: &mut T) -> bool {
        let Some(previous) = self.undo.pop_back() else {
            return false;
        };
        self.redo.push(std::mem::replace(current, previous));
        true
    }

    /// Step forward again after an undo. Returns `false` when empty.
    pub fn redo(&mut self, current: &mut T) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        self.undo.push_back(std::mem::replace(current, next));
        true
    }

    /// Drop all recorded snapshots.
    pub fn reset(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Whether an undo step is available.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of undo entries held.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Number of redo entries held.
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }
}
