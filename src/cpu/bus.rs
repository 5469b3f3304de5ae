//! System bus values.
//!
//! The address, data and control buses carry only the most recent transfer;
//! each step overwrites them.

use serde::{Serialize, Deserialize};
use std::fmt;

/// What the control bus signalled during the last transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlSignal {
    /// Nothing transferred yet (or NOP).
    #[default]
    Idle,
    /// Instruction fetch from the program.
    Fetch,
    /// Value written to a register.
    RegWrite,
    /// Value written to memory.
    MemWrite,
    /// ALU operation with a register result.
    Alu,
    /// ALU compare, flags only.
    Compare,
    /// Program counter redirected by a taken jump.
    Branch,
}

impl fmt::Display for ControlSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlSignal::Idle => "IDLE",
            ControlSignal::Fetch => "FETCH",
            ControlSignal::RegWrite => "REG_WRITE",
            ControlSignal::MemWrite => "MEM_WRITE",
            ControlSignal::Alu => "ALU",
            ControlSignal::Compare => "CMP",
            ControlSignal::Branch => "BRANCH",
        };
        f.write_str(name)
    }
}

/// Values on the three buses after a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bus {
    pub address: u8,
    pub data: u8,
    pub control: ControlSignal,
}

/// Final bus values reported for one executed step.
pub type BusTrace = Bus;

impl Bus {
    pub fn new(address: u8, data: u8, control: ControlSignal) -> Self {
        Self { address, data, control }
    }
}

impl fmt::Display for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "addr={} data={} ctrl={}", self.address, self.data, self.control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let bus = Bus::default();
        assert_eq!(bus, Bus::new(0, 0, ControlSignal::Idle));
    }

    #[test]
    fn test_display() {
        let bus = Bus::new(5, 30, ControlSignal::MemWrite);
        assert_eq!(bus.to_string(), "addr=5 data=30 ctrl=MEM_WRITE");
    }
}
