//! Instruction model for the simulated CPU.
//!
//! This module defines the closed instruction set:
//! - [`Opcode`] - one of 15 mnemonics, each with fixed operand shapes
//! - [`Operand`] - a register, immediate, memory address or line number
//! - [`Instruction`] / [`Program`] - validated, immutable program text

mod opcode;
mod operand;
mod program;

pub use opcode::Opcode;
pub use operand::{Operand, OperandKind, Reg};
pub use program::{Instruction, Program};

/// Number of general-purpose registers (R0-R7).
pub const REGISTER_COUNT: usize = 8;

/// Number of memory cells (addresses 0x00-0x3F).
pub const MEMORY_SIZE: usize = 64;

/// Largest program accepted by the parser.
///
/// Keeps every fetch address representable on the 8-bit address bus.
pub const MAX_PROGRAM_LEN: usize = 256;
