//! The simulator: program, machine state, history and control log together.
//!
//! [`Simulator`] is the surface a front end drives. Every operation takes
//! `&mut self` and runs to completion, so one simulator has exactly one
//! writer at a time; callers sharing it across threads wrap it in a lock.

use crate::asm::{parse, ValidationError};
use crate::config::SimConfig;
use crate::cpu::{self, Bus, ControlEvent, CpuState, ExecutionError, Flags, Memory, Registers, SpecialRegisters, StepResult};
use crate::history::{ControlLog, History, HistoryError, Snapshot};
use crate::isa::Program;

/// A simulator instance.
#[derive(Debug, Clone)]
pub struct Simulator {
    program: Program,
    state: CpuState,
    history: History,
    log: ControlLog,
    config: SimConfig,
}

impl Simulator {
    /// Create a simulator with an empty program and default config.
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// Create a simulator with an empty program.
    pub fn with_config(config: SimConfig) -> Self {
        Self {
            program: Program::default(),
            state: CpuState::new(),
            history: History::new(config.history_limit),
            log: ControlLog::new(config.log_capacity),
            config,
        }
    }

    /// Parse `source` and create a simulator ready to run it.
    pub fn from_source(source: &str) -> Result<Self, Vec<ValidationError>> {
        let mut sim = Self::new();
        sim.load(source)?;
        Ok(sim)
    }

    /// Parse and install a new program, resetting the machine.
    ///
    /// If the source has errors they are all returned and the current
    /// program and state are kept as they were.
    pub fn load(&mut self, source: &str) -> Result<(), Vec<ValidationError>> {
        let program = parse(source)?;
        self.load_program(program);
        Ok(())
    }

    /// Install an already parsed program, resetting the machine.
    pub fn load_program(&mut self, program: Program) {
        log::info!("loaded program with {} instructions", program.len());
        self.program = program;
        self.reset();
    }

    /// Execute one instruction.
    ///
    /// An executed step records the prior state for undo and appends its
    /// event to the log. A halted step or an error records nothing.
    pub fn step(&mut self) -> Result<StepResult, ExecutionError> {
        let before = Snapshot::capture(&self.state, self.log.len());
        let result = cpu::step(&self.program, &mut self.state)?;

        if let StepResult::Executed(record) = &result {
            self.history.record(before);
            self.log.push(record.event.clone());
        }

        Ok(result)
    }

    /// Step until halted, or until `max_steps` instructions have run.
    ///
    /// Equivalent to calling [`step`](Self::step) repeatedly; every step is
    /// individually undoable. The results end with [`StepResult::Halted`]
    /// iff the program halted within the budget.
    ///
    /// If a step fails, the error is returned and the steps before it stay
    /// applied. They remain in the history and the control log, which is
    /// where a caller finds out what ran.
    pub fn run_all(&mut self) -> Result<Vec<StepResult>, ExecutionError> {
        let max_steps = self.config.max_steps;
        let mut results = Vec::new();
        let mut executed = 0u64;

        loop {
            if executed >= max_steps && !self.is_halted() {
                log::warn!("stopped after {} steps without halting", executed);
                break;
            }
            let result = self.step().map_err(|e| {
                log::warn!("run stopped by error after {} steps: {}", executed, e);
                e
            })?;
            let halted = result.is_halted();
            results.push(result);
            if halted {
                break;
            }
            executed += 1;
        }

        Ok(results)
    }

    /// Restore the state from before the most recent step.
    pub fn undo(&mut self) -> Result<&CpuState, HistoryError> {
        let current = Snapshot::capture(&self.state, self.log.len());
        let previous = self.history.undo(current)?;
        self.restore(previous);
        Ok(&self.state)
    }

    /// Re-apply the most recently undone step.
    pub fn redo(&mut self) -> Result<&CpuState, HistoryError> {
        let current = Snapshot::capture(&self.state, self.log.len());
        let next = self.history.redo(current)?;
        self.restore(next);
        Ok(&self.state)
    }

    /// Clear the machine state, history and log. The program stays loaded.
    pub fn reset(&mut self) {
        self.state.reset();
        self.history.clear();
        self.log.clear();
        log::info!("simulator reset");
    }

    fn restore(&mut self, snapshot: Snapshot) {
        let (state, log_len) = snapshot.into_parts();
        self.state = state;
        self.log.rewind_to(log_len);
        log::debug!("restored state at PC={}", self.state.pc());
    }

    // ==================== Accessors ====================

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn state(&self) -> &CpuState {
        &self.state
    }

    pub fn registers(&self) -> &Registers {
        self.state.registers()
    }

    pub fn memory(&self) -> &Memory {
        self.state.memory()
    }

    pub fn special(&self) -> &SpecialRegisters {
        self.state.special()
    }

    pub fn flags(&self) -> Flags {
        self.state.flags()
    }

    pub fn bus(&self) -> Bus {
        self.state.bus()
    }

    pub fn log(&self) -> &ControlLog {
        &self.log
    }

    /// The most recent `n` control events, oldest first.
    pub fn recent_events(&self, n: usize) -> Vec<&ControlEvent> {
        self.log.recent(n)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn is_halted(&self) -> bool {
        self.state.is_halted(&self.program)
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}
