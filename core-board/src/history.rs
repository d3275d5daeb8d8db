//! Undo/redo history
//!
//! A bounded double stack of owned snapshots. Pushing a new snapshot clears
//! the redo stack; once the undo stack reaches its limit the oldest snapshot
//! is dropped.
//!
//! A checkpoint is a tentative push. It parks the redo stack (and any
//! snapshot the limit pushed out) until the checkpoint is either committed
//! or discarded, so a gesture that changed nothing leaves history exactly as
//! it was.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct History<T> {
    undo: VecDeque<T>,
    redo: Vec<T>,
    limit: usize,
    parked: Option<Parked<T>>,
}

#[derive(Debug, Clone)]
struct Parked<T> {
    redo: Vec<T>,
    evicted: Option<T>,
}

impl<T: Clone + PartialEq> History<T> {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.max(1),
            parked: None,
        }
    }

    /// Append to the undo stack, returning the snapshot the limit pushed out.
    fn push_bounded(&mut self, snapshot: T) -> Option<T> {
        let evicted = if self.undo.len() == self.limit {
            self.undo.pop_front()
        } else {
            None
        };
        self.undo.push_back(snapshot);
        evicted
    }

    /// Record the state as it was before a mutation.
    pub fn push(&mut self, snapshot: T) {
        self.parked = None;
        self.push_bounded(snapshot);
        self.redo.clear();
    }

    /// Record a tentative undo step; see [`discard_checkpoint`](Self::discard_checkpoint).
    pub fn checkpoint(&mut self, snapshot: T) {
        let evicted = self.push_bounded(snapshot);
        self.parked = Some(Parked {
            redo: std::mem::take(&mut self.redo),
            evicted,
        });
    }

    /// Keep the latest checkpoint as a regular undo step.
    pub fn commit_checkpoint(&mut self) {
        self.parked = None;
    }

    /// Remove the latest checkpoint and put back what it displaced.
    ///
    /// Without a pending checkpoint this only drops the latest undo snapshot.
    pub fn discard_checkpoint(&mut self) -> Option<T> {
        let snapshot = self.undo.pop_back()?;
        if let Some(parked) = self.parked.take() {
            if let Some(evicted) = parked.evicted {
                self.undo.push_front(evicted);
            }
            self.redo = parked.redo;
        }
        Some(snapshot)
    }

    /// Swap `current` for the latest undo snapshot.
    ///
    /// Returns the restored state, or `None` when there is nothing to undo.
    pub fn undo(&mut self, current: &T) -> Option<T> {
        self.parked = None;
        let previous = self.undo.pop_back()?;
        self.redo.push(current.clone());
        Some(previous)
    }

    pub fn redo(&mut self, current: &T) -> Option<T> {
        self.parked = None;
        let next = self.redo.pop()?;
        self.push_bounded(current.clone());
        Some(next)
    }

    pub fn peek_undo(&self) -> Option<&T> {
        self.undo.back()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_round_trip() {
        let mut history = History::new(10);
        let mut state = 1;

        history.push(state);
        state = 2;

        state = history.undo(&state).unwrap();
        assert_eq!(state, 1);
        assert!(history.can_redo());

        state = history.redo(&state).unwrap();
        assert_eq!(state, 2);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = History::new(10);
        history.push(1);
        let _ = history.undo(&2);
        history.push(3);
        assert!(!history.can_redo());
        assert!(history.redo(&4).is_none());
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::new(2);
        history.push(1);
        history.push(2);
        history.push(3);

        assert_eq!(history.undo_depth(), 2);
        assert_eq!(history.undo(&4), Some(3));
        assert_eq!(history.undo(&3), Some(2));
        assert_eq!(history.undo(&2), None);
    }

    #[test]
    fn test_empty_history() {
        let mut history: History<u8> = History::new(5);
        assert!(history.undo(&0).is_none());
        assert!(history.peek_undo().is_none());
        assert!(history.discard_checkpoint().is_none());
    }

    #[test]
    fn test_discarded_checkpoint_restores_redo() {
        let mut history = History::new(10);
        history.push(1);
        assert_eq!(history.undo(&2), Some(1));

        history.checkpoint(1);
        assert!(!history.can_redo());
        assert_eq!(history.discard_checkpoint(), Some(1));

        assert!(history.can_redo());
        assert!(!history.can_undo());
        assert_eq!(history.redo(&1), Some(2));
    }

    #[test]
    fn test_discarded_checkpoint_restores_evicted_snapshot() {
        let mut history = History::new(2);
        history.push(1);
        history.push(2);

        history.checkpoint(3);
        assert_eq!(history.undo_depth(), 2);
        history.discard_checkpoint();

        assert_eq!(history.undo(&3), Some(2));
        assert_eq!(history.undo(&2), Some(1));
    }

    #[test]
    fn test_committed_checkpoint_keeps_redo_cleared() {
        let mut history = History::new(10);
        history.push(1);
        let _ = history.undo(&2);

        history.checkpoint(1);
        history.commit_checkpoint();
        assert_eq!(history.discard_checkpoint(), Some(1));
        assert!(!history.can_redo());
    }
}
