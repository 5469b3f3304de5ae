//! CPU state and execution engine.
//!
//! This module implements the simulated 8-bit machine:
//! - 8 general-purpose byte registers (R0-R7)
//! - 64 byte-wide memory cells
//! - PC, IR, MAR, MDR and the Z/N/C/V flags
//! - address, data and control buses
//!
//! [`CpuState`] is a plain value: cloning it yields a fully independent
//! copy, which the history uses for snapshots.

pub mod memory;
pub mod registers;
pub mod bus;
pub mod alu;
pub mod decode;
pub mod execute;

pub use memory::{Memory, MemoryError};
pub use registers::{Flags, Registers, SpecialRegisters};
pub use bus::{Bus, BusTrace, ControlSignal};
pub use decode::{decode, AluOp, Condition, DecodeError, Op};
pub use execute::{run_limited, step, Change, ControlEvent, ExecutionError, StepRecord, StepResult};

use crate::isa::{Instruction, Program, Reg};
use serde::{Serialize, Deserialize};

/// The complete machine state.
///
/// Read access is public. Writes go through the `pub(crate)` mutators,
/// which only the execution engine and the history restore path use.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CpuState {
    regs: Registers,
    mem: Memory,
    special: SpecialRegisters,
    flags: Flags,
    bus: Bus,
}

impl CpuState {
    /// Create a new machine with zeroed state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every field to zero/false and set PC to 0.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.special.reset();
        self.flags = Flags::default();
        self.bus = Bus::default();
    }

    // ==================== Accessors ====================

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    #[inline]
    pub fn register(&self, reg: Reg) -> u8 {
        self.regs.get(reg)
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    pub fn special(&self) -> &SpecialRegisters {
        &self.special
    }

    #[inline]
    pub fn pc(&self) -> usize {
        self.special.pc
    }

    pub fn ir(&self) -> Option<&Instruction> {
        self.special.ir.as_ref()
    }

    pub fn mar(&self) -> u8 {
        self.special.mar
    }

    pub fn mdr(&self) -> u8 {
        self.special.mdr
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn bus(&self) -> Bus {
        self.bus
    }

    /// Whether PC has run past the last line of `program`.
    pub fn is_halted(&self, program: &Program) -> bool {
        self.special.pc >= program.len()
    }

    // ==================== Mutators ====================

    pub(crate) fn set_register(&mut self, reg: Reg, value: u8) {
        self.regs.set(reg, value);
    }

    pub(crate) fn set_memory(&mut self, addr: u8, value: u8) -> Result<(), MemoryError> {
        self.mem.write(addr, value)
    }

    pub(crate) fn set_flags(&mut self, flags: Flags) {
        self.flags = flags;
    }

    pub(crate) fn set_bus(&mut self, bus: Bus) {
        self.bus = bus;
    }

    pub(crate) fn set_pc(&mut self, pc: usize) {
        self.special.pc = pc;
    }

    pub(crate) fn set_ir(&mut self, instr: Instruction) {
        self.special.ir = Some(instr);
    }

    /// Latch a memory transfer into MAR/MDR.
    pub(crate) fn stage_memory(&mut self, mar: u8, mdr: u8) {
        self.special.mar = mar;
        self.special.mdr = mdr;
    }
}

impl std::fmt::Debug for CpuState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuState")
            .field("pc", &self.special.pc)
            .field("regs", &self.regs)
            .field("flags", &self.flags)
            .field("bus", &self.bus)
            .field("mem", &self.mem)
            .finish()
    }
}
