//! Register file, special registers and flags.
//!
//! The machine has:
//! - R0-R7: eight 8-bit general-purpose registers
//! - PC: index of the next program line to fetch
//! - IR: the most recently fetched instruction
//! - MAR/MDR: address and data staged during a memory access
//! - Flags: Z, N, C, V

use crate::isa::{Instruction, Reg, REGISTER_COUNT};
use serde::{Serialize, Deserialize};
use std::fmt;

/// The general-purpose register file.
#[derive(Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Registers {
    values: [u8; REGISTER_COUNT],
}

impl Registers {
    /// Create a register file with all values zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all registers to zero.
    pub fn reset(&mut self) {
        self.values = [0; REGISTER_COUNT];
    }

    #[inline]
    pub fn get(&self, reg: Reg) -> u8 {
        self.values[reg.index()]
    }

    #[inline]
    pub fn set(&mut self, reg: Reg, value: u8) {
        self.values[reg.index()] = value;
    }

    /// All register values, R0 first.
    pub fn values(&self) -> &[u8; REGISTER_COUNT] {
        &self.values
    }
}

impl fmt::Debug for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "R{}={}", i, value)?;
        }
        Ok(())
    }
}

/// Condition flags.
///
/// Only arithmetic and compare instructions write these; transfers and
/// jumps leave them as they were.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flags {
    /// Z: result was zero
    pub zero: bool,
    /// N: bit 7 of the result was set
    pub negative: bool,
    /// C: unsigned carry out (ADD/MUL) or borrow (SUB/CMP)
    pub carry: bool,
    /// V: signed overflow
    pub overflow: bool,
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Z:{} N:{} C:{} V:{}",
            self.zero as u8, self.negative as u8, self.carry as u8, self.overflow as u8)
    }
}

/// PC, IR, MAR and MDR.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpecialRegisters {
    /// Program counter: 0-based program line, equal to the program length when halted.
    pub pc: usize,
    /// Instruction register: last fetched instruction.
    pub ir: Option<Instruction>,
    /// Memory address register.
    pub mar: u8,
    /// Memory data register.
    pub mdr: u8,
}

impl SpecialRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_read_write() {
        let mut regs = Registers::new();
        let r5 = Reg::new(5).unwrap();
        regs.set(r5, 200);
        assert_eq!(regs.get(r5), 200);
        assert_eq!(regs.values()[5], 200);

        regs.reset();
        assert_eq!(regs.values(), &[0; 8]);
    }

    #[test]
    fn test_flags_display() {
        let flags = Flags { zero: true, carry: true, ..Flags::default() };
        assert_eq!(flags.to_string(), "Z:1 N:0 C:1 V:0");
    }

    #[test]
    fn test_special_reset() {
        let mut special = SpecialRegisters { pc: 4, ir: None, mar: 9, mdr: 12 };
        special.reset();
        assert_eq!(special, SpecialRegisters::new());
    }
}
