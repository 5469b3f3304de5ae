//! Execution engine.
//!
//! Implements the fetch-decode-execute cycle over a [`Program`]. A step
//! works on a scratch copy of the state and only commits it on success, so
//! an error leaves the caller's state untouched.

use super::alu::{self, AluResult};
use super::bus::{Bus, BusTrace, ControlSignal};
use super::decode::{self, AluOp, Condition, DecodeError, Op};
use super::memory::MemoryError;
use super::registers::Flags;
use super::CpuState;
use crate::isa::{Instruction, Program, Reg};
use serde::{Serialize, Deserialize};
use std::fmt;
use thiserror::Error;

/// One observable effect of an executed instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Change {
    Register { reg: Reg, old: u8, new: u8 },
    Memory { addr: u8, old: u8, new: u8 },
    Flags { old: Flags, new: Flags },
}

/// Human-readable record of one executed step, as kept in the control log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlEvent {
    /// Program line that was executed.
    pub line: usize,
    /// The instruction that was executed.
    pub instruction: Instruction,
    /// Register, memory and flag deltas, in the order they happened.
    pub changes: Vec<Change>,
    /// Short description of what happened, e.g. `R2 <- 30`.
    pub summary: String,
}

impl fmt::Display for ControlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}: {} | {}", self.line, self.instruction, self.summary)
    }
}

/// Everything a viewer needs about one executed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Final bus values for the step.
    pub bus: BusTrace,
    /// The event appended to the control log.
    pub event: ControlEvent,
    /// Program counter after the step.
    pub next_pc: usize,
    /// Whether a jump redirected the program counter.
    pub jumped: bool,
}

/// Outcome of a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepResult {
    /// One instruction was executed.
    Executed(StepRecord),
    /// PC is past the last line; nothing was executed.
    Halted,
}

impl StepResult {
    pub fn is_halted(&self) -> bool {
        matches!(self, StepResult::Halted)
    }

    /// The step record, if an instruction was executed.
    pub fn record(&self) -> Option<&StepRecord> {
        match self {
            StepResult::Executed(record) => Some(record),
            StepResult::Halted => None,
        }
    }
}

/// Execute the instruction at `state.pc()`.
///
/// Returns [`StepResult::Halted`] without touching the state once PC has
/// passed the end of the program. On error the state is left unchanged.
pub fn step(program: &Program, state: &mut CpuState) -> Result<StepResult, ExecutionError> {
    let pc = state.pc();
    let Some(instr) = program.get(pc) else {
        return Ok(StepResult::Halted);
    };

    let mut next = state.clone();
    let record = execute(program, pc, instr, &mut next)?;
    *state = next;

    log::debug!("{}", record.event);
    log::trace!("bus: {}", record.bus);
    Ok(StepResult::Executed(record))
}

/// Step until halted or `max_steps` instructions have executed.
///
/// The results end with [`StepResult::Halted`] iff the program halted
/// within the limit.
pub fn run_limited(
    program: &Program,
    state: &mut CpuState,
    max_steps: u64,
) -> Result<Vec<StepResult>, ExecutionError> {
    let mut results = Vec::new();
    let mut executed = 0u64;

    loop {
        if executed >= max_steps && !state.is_halted(program) {
            break;
        }
        let result = step(program, state)?;
        let halted = result.is_halted();
        results.push(result);
        if halted {
            break;
        }
        executed += 1;
    }

    Ok(results)
}

/// Fetch, decode and execute one instruction on `cpu`.
fn execute(
    program: &Program,
    pc: usize,
    instr: &Instruction,
    cpu: &mut CpuState,
) -> Result<StepRecord, ExecutionError> {
    // Fetch
    let fetch_addr = u8::try_from(pc).map_err(|_| ExecutionError::PcOutOfRange(pc))?;
    cpu.set_ir(instr.clone());
    cpu.set_bus(Bus::new(fetch_addr, 0, ControlSignal::Fetch));

    // Decode
    let op = decode::decode(instr, program.len())?;

    // Execute
    let mut changes = Vec::new();
    let mut next_pc = pc + 1;
    let mut jumped = false;

    let summary = match op {
        // ==================== Data Transfer ====================

        Op::Load { rd, value } => {
            write_register(cpu, rd, value, &mut changes);
            cpu.stage_memory(fetch_addr, value);
            cpu.set_bus(Bus::new(fetch_addr, value, ControlSignal::RegWrite));
            format!("{} <- {}", rd, value)
        }

        Op::Store { rs, addr } => {
            let value = cpu.register(rs);
            let old = cpu.memory().read(addr).ok_or(MemoryError::AddressOutOfRange(addr))?;
            cpu.stage_memory(addr, value);
            cpu.set_memory(addr, value)?;
            changes.push(Change::Memory { addr, old, new: value });
            cpu.set_bus(Bus::new(addr, value, ControlSignal::MemWrite));
            format!("[{}] <- {}", addr, value)
        }

        Op::Mov { rd, rs } => {
            let value = cpu.register(rs);
            write_register(cpu, rd, value, &mut changes);
            cpu.set_bus(Bus::new(fetch_addr, value, ControlSignal::RegWrite));
            format!("{} <- {} ({})", rd, rs, value)
        }

        // ==================== Arithmetic ====================

        Op::Alu { op, rd, lhs, rhs } => {
            let (a, b) = (cpu.register(lhs), cpu.register(rhs));
            let result = match op {
                AluOp::Add => alu::add(a, b),
                AluOp::Sub => alu::sub(a, b),
                AluOp::Mul => alu::mul(a, b),
            };
            apply_alu(cpu, rd, result, fetch_addr, &mut changes)
        }

        Op::Inc { rd } => {
            let result = alu::inc(cpu.register(rd));
            apply_alu(cpu, rd, result, fetch_addr, &mut changes)
        }

        Op::Dec { rd } => {
            let result = alu::dec(cpu.register(rd));
            apply_alu(cpu, rd, result, fetch_addr, &mut changes)
        }

        Op::Cmp { lhs, rhs } => {
            let (a, b) = (cpu.register(lhs), cpu.register(rhs));
            let flags = alu::compare(a, b);
            write_flags(cpu, flags, &mut changes);
            cpu.set_bus(Bus::new(fetch_addr, a.wrapping_sub(b), ControlSignal::Compare));
            format!("{} - {} -> {}", lhs, rhs, flags)
        }

        // ==================== Control Flow ====================

        Op::Jump { cond, target } => {
            if condition_holds(cond, cpu.flags()) {
                next_pc = target;
                jumped = true;
                // target < program.len() <= 256, checked by decode
                cpu.set_bus(Bus::new(target as u8, 0, ControlSignal::Branch));
                format!("jump to {}", target)
            } else {
                format!("no jump, continue at {}", next_pc)
            }
        }

        Op::Nop => {
            cpu.set_bus(Bus::new(fetch_addr, 0, ControlSignal::Idle));
            "no operation".to_string()
        }
    };

    debug_assert_eq!(
        changes.iter().any(|c| matches!(c, Change::Flags { .. })),
        instr.opcode().defines_flags(),
        "flag writes must follow Opcode::defines_flags for {}",
        instr.opcode(),
    );

    cpu.set_pc(next_pc);

    Ok(StepRecord {
        bus: cpu.bus(),
        event: ControlEvent {
            line: pc,
            instruction: instr.clone(),
            changes,
            summary,
        },
        next_pc,
        jumped,
    })
}

fn write_register(cpu: &mut CpuState, reg: Reg, value: u8, changes: &mut Vec<Change>) {
    let old = cpu.register(reg);
    cpu.set_register(reg, value);
    changes.push(Change::Register { reg, old, new: value });
}

fn write_flags(cpu: &mut CpuState, flags: Flags, changes: &mut Vec<Change>) {
    let old = cpu.flags();
    cpu.set_flags(flags);
    changes.push(Change::Flags { old, new: flags });
}

fn apply_alu(
    cpu: &mut CpuState,
    rd: Reg,
    result: AluResult,
    fetch_addr: u8,
    changes: &mut Vec<Change>,
) -> String {
    write_register(cpu, rd, result.value, changes);
    write_flags(cpu, result.flags, changes);
    cpu.set_bus(Bus::new(fetch_addr, result.value, ControlSignal::Alu));
    format!("{} <- {} ({})", rd, result.value, result.flags)
}

fn condition_holds(cond: Condition, flags: Flags) -> bool {
    match cond {
        Condition::Always => true,
        Condition::Zero => flags.zero,
        Condition::NotZero => !flags.zero,
        Condition::Carry => flags.carry,
        Condition::Negative => flags.negative,
    }
}

/// Errors that can occur during execution.
///
/// None of these are reachable for a program produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("program counter {0} does not fit on the address bus")]
    PcOutOfRange(usize),
}
