//! Operands: registers, immediates, memory addresses and line numbers.

use super::{MEMORY_SIZE, REGISTER_COUNT};
use serde::{Serialize, Deserialize};
use std::fmt;

/// A general-purpose register index, always in 0-7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Reg(u8);

impl Reg {
    /// Create a register reference, or `None` if `index` is not 0-7.
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < REGISTER_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// The register index as a `usize`.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// All eight registers, R0 first.
    pub fn all() -> impl Iterator<Item = Reg> {
        (0..REGISTER_COUNT as u8).map(Reg)
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// The kind of value an operand slot expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperandKind {
    /// `R0`-`R7`
    Register,
    /// Unsigned value 0-255
    Immediate,
    /// Memory address 0-63
    Address,
    /// Program line, 0-based, inside the program
    Line,
}

impl OperandKind {
    /// Inclusive upper bound for numeric kinds.
    ///
    /// `Line` has no static bound; it is checked against the program length.
    pub fn max_value(self) -> Option<u32> {
        match self {
            OperandKind::Immediate => Some(u8::MAX as u32),
            OperandKind::Address => Some(MEMORY_SIZE as u32 - 1),
            OperandKind::Register | OperandKind::Line => None,
        }
    }
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperandKind::Register => "register",
            OperandKind::Immediate => "immediate value",
            OperandKind::Address => "memory address",
            OperandKind::Line => "line number",
        };
        f.write_str(name)
    }
}

/// A parsed operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    Register(Reg),
    Immediate(u8),
    Address(u8),
    Line(usize),
}

impl Operand {
    /// The kind tag of this operand.
    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::Register(_) => OperandKind::Register,
            Operand::Immediate(_) => OperandKind::Immediate,
            Operand::Address(_) => OperandKind::Address,
            Operand::Line(_) => OperandKind::Line,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(r) => write!(f, "{}", r),
            Operand::Immediate(v) | Operand::Address(v) => write!(f, "{}", v),
            Operand::Line(l) => write!(f, "{}", l),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reg_bounds() {
        assert_eq!(Reg::new(0).map(Reg::index), Some(0));
        assert_eq!(Reg::new(7).map(Reg::index), Some(7));
        assert!(Reg::new(8).is_none());
        assert_eq!(Reg::all().count(), 8);
    }

    #[test]
    fn test_kind_bounds() {
        assert_eq!(OperandKind::Immediate.max_value(), Some(255));
        assert_eq!(OperandKind::Address.max_value(), Some(63));
        assert_eq!(OperandKind::Line.max_value(), None);
    }

    #[test]
    fn test_operand_display() {
        let r = Reg::new(3).unwrap();
        assert_eq!(Operand::Register(r).to_string(), "R3");
        assert_eq!(Operand::Immediate(200).to_string(), "200");
        assert_eq!(Operand::Line(4).kind(), OperandKind::Line);
    }
}
