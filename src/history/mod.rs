//! Undo/redo history.
//!
//! Two stacks of [`Snapshot`]s, `past` and `future`. Each executed step
//! records the state from just before it; undo and redo move the live
//! state between the stacks and never create snapshots of their own.

mod control_log;

pub use control_log::ControlLog;

use crate::cpu::CpuState;
use std::collections::VecDeque;
use thiserror::Error;

/// An owned, immutable copy of the machine state plus the control log length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    state: CpuState,
    log_len: usize,
}

impl Snapshot {
    /// Capture `state` by deep copy.
    pub fn capture(state: &CpuState, log_len: usize) -> Self {
        Self {
            state: state.clone(),
            log_len,
        }
    }

    pub fn state(&self) -> &CpuState {
        &self.state
    }

    pub fn log_len(&self) -> usize {
        self.log_len
    }

    /// Consume the snapshot, yielding the state and log length.
    pub fn into_parts(self) -> (CpuState, usize) {
        (self.state, self.log_len)
    }
}

/// The undo/redo stacks.
#[derive(Debug, Clone, Default)]
pub struct History {
    past: VecDeque<Snapshot>,
    future: Vec<Snapshot>,
    /// Maximum retained `past` depth; `None` is unbounded.
    limit: Option<usize>,
}

impl History {
    /// Create an empty history, optionally capping the undo depth.
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            limit,
        }
    }

    /// Record the state from before a forward step.
    ///
    /// Clears the redo path.
    pub fn record(&mut self, before: Snapshot) {
        self.future.clear();
        self.past.push_back(before);
        if let Some(limit) = self.limit {
            while self.past.len() > limit {
                self.past.pop_front();
            }
        }
    }

    /// Pop the most recent past snapshot, parking `current` on the redo stack.
    pub fn undo(&mut self, current: Snapshot) -> Result<Snapshot, HistoryError> {
        let previous = self.past.pop_back().ok_or(HistoryError::NothingToUndo)?;
        self.future.push(current);
        Ok(previous)
    }

    /// Pop the most recent future snapshot, parking `current` on the undo stack.
    pub fn redo(&mut self, current: Snapshot) -> Result<Snapshot, HistoryError> {
        let next = self.future.pop().ok_or(HistoryError::NothingToRedo)?;
        self.past.push_back(current);
        Ok(next)
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }
}

/// Errors from undo/redo. Both leave the state unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::Reg;

    fn snap(r0: u8, log_len: usize) -> Snapshot {
        let mut state = CpuState::new();
        state.set_register(Reg::new(0).unwrap(), r0);
        Snapshot::capture(&state, log_len)
    }

    #[test]
    fn test_empty_history_errors() {
        let mut history = History::new(None);
        assert_eq!(history.undo(snap(0, 0)), Err(HistoryError::NothingToUndo));
        assert_eq!(history.redo(snap(0, 0)), Err(HistoryError::NothingToRedo));
        // A failed undo parks nothing
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_cycle() {
        let mut history = History::new(None);
        history.record(snap(1, 0));
        history.record(snap(2, 1));

        let restored = history.undo(snap(3, 2)).unwrap();
        assert_eq!(restored, snap(2, 1));
        assert_eq!((history.undo_depth(), history.redo_depth()), (1, 1));

        let replayed = history.redo(restored).unwrap();
        assert_eq!(replayed, snap(3, 2));
        assert_eq!((history.undo_depth(), history.redo_depth()), (2, 0));
    }

    #[test]
    fn test_record_clears_future() {
        let mut history = History::new(None);
        history.record(snap(1, 0));
        history.undo(snap(2, 1)).unwrap();
        assert!(history.can_redo());

        history.record(snap(1, 0));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::new(Some(2));
        for i in 0..5 {
            history.record(snap(i, i as usize));
        }
        assert_eq!(history.undo_depth(), 2);
        assert_eq!(history.undo(snap(9, 9)).unwrap(), snap(4, 4));
        assert_eq!(history.undo(snap(4, 4)).unwrap(), snap(3, 3));
        assert!(history.undo(snap(3, 3)).is_err());
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut state = CpuState::new();
        let snapshot = Snapshot::capture(&state, 0);
        state.set_memory(7, 1).unwrap();
        assert_eq!(snapshot.state().memory().read(7), Some(0));
    }
}
