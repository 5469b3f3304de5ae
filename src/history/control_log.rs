//! Control signal log.
//!
//! An append-only record of executed steps with a bounded length. Undo
//! rewinds the visible length without discarding the hidden tail, so redo
//! can bring the entries back; the next append drops that tail.

use crate::cpu::ControlEvent;
use std::collections::VecDeque;

/// Bounded log of control events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlLog {
    /// Retained entries, oldest first.
    entries: VecDeque<ControlEvent>,
    /// Sequence number of `entries[0]`; grows as old entries are evicted.
    first: usize,
    /// Logical length: events appended and not undone.
    len: usize,
    capacity: usize,
}

impl ControlLog {
    /// Create a log retaining at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            first: 0,
            len: 0,
            capacity: capacity.max(1),
        }
    }

    /// Append an event, discarding any undone tail.
    pub fn push(&mut self, event: ControlEvent) {
        self.entries.truncate(self.len - self.first);
        self.entries.push_back(event);
        self.len += 1;
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            self.first += 1;
        }
    }

    /// Logical length: the number of events appended and not undone.
    ///
    /// This counts evicted entries too, so it is the value snapshots record.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Move the logical length to `len`.
    ///
    /// Shrinking hides entries; growing reveals previously hidden ones. The
    /// result is clamped to what is still retained.
    pub fn rewind_to(&mut self, len: usize) {
        let retained_end = self.first + self.entries.len();
        self.len = len.clamp(self.first, retained_end);
    }

    /// Visible entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &ControlEvent> {
        self.entries.iter().take(self.len - self.first)
    }

    /// The most recent `n` visible entries, oldest first.
    pub fn recent(&self, n: usize) -> Vec<&ControlEvent> {
        let visible = self.len - self.first;
        self.entries
            .iter()
            .take(visible)
            .skip(visible.saturating_sub(n))
            .collect()
    }

    /// The most recent visible entry.
    pub fn last(&self) -> Option<&ControlEvent> {
        let visible = self.len - self.first;
        visible.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.first = 0;
        self.len = 0;
    }
}

impl Default for ControlLog {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_LOG_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::{Instruction, Opcode};

    fn event(line: usize) -> ControlEvent {
        ControlEvent {
            line,
            instruction: Instruction::new(Opcode::Nop, vec![], line + 1),
            changes: Vec::new(),
            summary: format!("event {}", line),
        }
    }

    fn lines(log: &ControlLog) -> Vec<usize> {
        log.entries().map(|e| e.line).collect()
    }

    #[test]
    fn test_push_and_recent() {
        let mut log = ControlLog::new(8);
        for i in 0..5 {
            log.push(event(i));
        }
        assert_eq!(log.len(), 5);
        let recent: Vec<usize> = log.recent(2).iter().map(|e| e.line).collect();
        assert_eq!(recent, vec![3, 4]);
        assert_eq!(log.last().map(|e| e.line), Some(4));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut log = ControlLog::new(3);
        for i in 0..5 {
            log.push(event(i));
        }
        assert_eq!(log.len(), 5);
        assert_eq!(lines(&log), vec![2, 3, 4]);
    }

    #[test]
    fn test_rewind_then_restore() {
        let mut log = ControlLog::new(8);
        for i in 0..4 {
            log.push(event(i));
        }
        log.rewind_to(2);
        assert_eq!(lines(&log), vec![0, 1]);
        assert_eq!(log.last().map(|e| e.line), Some(1));

        log.rewind_to(4);
        assert_eq!(lines(&log), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_push_after_rewind_drops_tail() {
        let mut log = ControlLog::new(8);
        for i in 0..4 {
            log.push(event(i));
        }
        log.rewind_to(1);
        log.push(event(9));
        assert_eq!(lines(&log), vec![0, 9]);

        log.rewind_to(4);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_rewind_past_evicted_clamps() {
        let mut log = ControlLog::new(2);
        for i in 0..5 {
            log.push(event(i));
        }
        log.rewind_to(0);
        assert_eq!(log.len(), 3);
        assert!(log.entries().next().is_none());
        assert!(log.last().is_none());
    }

    #[test]
    fn test_clear() {
        let mut log = ControlLog::new(2);
        log.push(event(0));
        log.clear();
        assert!(log.is_empty());
        assert!(log.recent(5).is_empty());
    }
}
