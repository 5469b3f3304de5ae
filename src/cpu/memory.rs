//! Main memory: 64 byte-wide cells, addressed 0x00-0x3F.

use crate::isa::MEMORY_SIZE;
use serde::{Serialize, Deserialize};

/// Main memory.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMemory")]
pub struct Memory {
    cells: Vec<u8>,
}

/// Serialized form, checked for size before it becomes a [`Memory`].
#[derive(Deserialize)]
struct RawMemory {
    cells: Vec<u8>,
}

impl TryFrom<RawMemory> for Memory {
    type Error = MemoryError;

    fn try_from(raw: RawMemory) -> Result<Self, Self::Error> {
        if raw.cells.len() != MEMORY_SIZE {
            return Err(MemoryError::WrongSize(raw.cells.len()));
        }
        Ok(Self { cells: raw.cells })
    }
}

impl Memory {
    /// Create a new memory with all cells zeroed.
    pub fn new() -> Self {
        Self {
            cells: vec![0; MEMORY_SIZE],
        }
    }

    /// Read a cell, or `None` if `addr` is outside 0-63.
    #[inline]
    pub fn read(&self, addr: u8) -> Option<u8> {
        self.cells.get(addr as usize).copied()
    }

    /// Write a cell.
    pub fn write(&mut self, addr: u8, value: u8) -> Result<(), MemoryError> {
        let cell = self.cells
            .get_mut(addr as usize)
            .ok_or(MemoryError::AddressOutOfRange(addr))?;
        *cell = value;
        Ok(())
    }

    /// Clear all memory to zeros.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = 0);
    }

    /// All cells, address 0 first.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Dump a range of cells (for display).
    pub fn dump(&self, start: usize, count: usize) -> Vec<(usize, u8)> {
        let end = start.saturating_add(count).min(MEMORY_SIZE);
        (start.min(end)..end)
            .map(|i| (i, self.cells[i]))
            .collect()
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only show non-zero cells
        let non_zero: Vec<(usize, u8)> = self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell != 0)
            .map(|(i, cell)| (i, *cell))
            .collect();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    #[error("memory address {0} out of range (0-63)")]
    AddressOutOfRange(u8),

    #[error("memory image has {0} cells, expected 64")]
    WrongSize(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_read_write() {
        let mut mem = Memory::new();
        mem.write(10, 42).unwrap();
        assert_eq!(mem.read(10), Some(42));
    }

    #[test]
    fn test_memory_bounds() {
        let mut mem = Memory::new();
        assert!(mem.write(63, 1).is_ok());
        assert_eq!(mem.write(64, 1), Err(MemoryError::AddressOutOfRange(64)));
        assert_eq!(mem.read(64), None);
    }

    #[test]
    fn test_deserialize_checks_size() {
        let mut mem = Memory::new();
        mem.write(3, 9).unwrap();
        let json = serde_json::to_string(&mem).unwrap();
        assert_eq!(serde_json::from_str::<Memory>(&json).unwrap(), mem);

        let err = serde_json::from_str::<Memory>(r#"{ "cells": [1, 2, 3] }"#).unwrap_err();
        assert!(err.to_string().contains("3 cells"));
    }

    #[test]
    fn test_clear_and_dump() {
        let mut mem = Memory::new();
        mem.write(1, 5).unwrap();
        mem.write(2, 6).unwrap();
        assert_eq!(mem.dump(1, 2), vec![(1, 5), (2, 6)]);
        assert_eq!(mem.dump(62, 10).len(), 2);

        mem.clear();
        assert!(mem.cells().iter().all(|c| *c == 0));
    }
}
