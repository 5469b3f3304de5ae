//! WebAssembly bindings for the simulator.
//!
//! This module provides JavaScript-friendly wrappers around [`Simulator`].

use wasm_bindgen::prelude::*;
use crate::{Simulator, StepResult};
use crate::asm::validate;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly simulator wrapper.
#[wasm_bindgen]
pub struct WasmSimulator {
    sim: Simulator,
}

#[wasm_bindgen]
impl WasmSimulator {
    /// Create a new simulator instance.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            sim: Simulator::new(),
        }
    }

    /// Load a program from source. Returns the instruction count.
    #[wasm_bindgen]
    pub fn load(&mut self, source: &str) -> Result<usize, JsError> {
        self.sim.load(source).map_err(|errors| {
            let lines: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            JsError::new(&lines.join("\n"))
        })?;
        Ok(self.sim.program().len())
    }

    /// Step one instruction. Returns the step record as JSON, or `null` when halted.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<String, JsError> {
        let result = self.sim.step()
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        match result {
            StepResult::Executed(record) => serde_json::to_string(&record)
                .map_err(|e| JsError::new(&format!("{}", e))),
            StepResult::Halted => Ok("null".to_string()),
        }
    }

    /// Run until halt or the configured step limit. Returns the number of steps executed.
    #[wasm_bindgen]
    pub fn run_all(&mut self) -> Result<usize, JsError> {
        let results = self.sim.run_all()
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        Ok(results.iter().filter(|r| !r.is_halted()).count())
    }

    /// Undo the last step.
    #[wasm_bindgen]
    pub fn undo(&mut self) -> Result<(), JsError> {
        self.sim.undo()
            .map(|_| ())
            .map_err(|e| JsError::new(&format!("{}", e)))
    }

    /// Redo the last undone step.
    #[wasm_bindgen]
    pub fn redo(&mut self) -> Result<(), JsError> {
        self.sim.redo()
            .map(|_| ())
            .map_err(|e| JsError::new(&format!("{}", e)))
    }

    /// Reset machine state, history and log.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.sim.reset();
    }

    /// Check if the program has run to completion.
    #[wasm_bindgen]
    pub fn is_halted(&self) -> bool {
        self.sim.is_halted()
    }

    /// Get program counter.
    #[wasm_bindgen]
    pub fn pc(&self) -> usize {
        self.sim.state().pc()
    }

    /// Get all registers, R0 first.
    #[wasm_bindgen]
    pub fn registers(&self) -> Vec<u8> {
        self.sim.registers().values().to_vec()
    }

    /// Get all memory cells, address 0 first.
    #[wasm_bindgen]
    pub fn memory(&self) -> Vec<u8> {
        self.sim.memory().cells().to_vec()
    }

    /// Get the full machine state as JSON.
    #[wasm_bindgen]
    pub fn state_json(&self) -> Result<String, JsError> {
        serde_json::to_string(self.sim.state())
            .map_err(|e| JsError::new(&format!("{}", e)))
    }

    /// Get the most recent `count` control events as a JSON array.
    #[wasm_bindgen]
    pub fn log_json(&self, count: usize) -> Result<String, JsError> {
        serde_json::to_string(&self.sim.recent_events(count))
            .map_err(|e| JsError::new(&format!("{}", e)))
    }
}

impl Default for WasmSimulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate source code, returning every error message.
#[wasm_bindgen]
pub fn wasm_validate(source: &str) -> js_sys::Array {
    validate(source)
        .iter()
        .map(|e| JsValue::from_str(&e.to_string()))
        .collect()
}
