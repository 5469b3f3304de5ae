//! # ISS Simulator
//!
//! An instructional simulator of a small 8-bit Von Neumann CPU.
//!
//! Source text is parsed and validated into a [`Program`], executed one
//! instruction at a time against a [`CpuState`] (eight registers, 64 bytes
//! of memory, PC/IR/MAR/MDR, Z/N/C/V flags and three buses), and every
//! step can be undone and redone. Front ends observe state snapshots,
//! bus traces and the control signal log; they never mutate state directly.

pub mod isa;
pub mod asm;
pub mod cpu;
pub mod history;
pub mod config;
pub mod sim;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use isa::{Instruction, Opcode, Operand, OperandKind, Program, Reg};
pub use asm::{parse, validate, ValidationError};
pub use cpu::{Bus, BusTrace, ControlEvent, ControlSignal, CpuState, ExecutionError, Flags, StepRecord, StepResult};
pub use history::{ControlLog, History, HistoryError, Snapshot};
pub use config::SimConfig;
pub use sim::Simulator;
