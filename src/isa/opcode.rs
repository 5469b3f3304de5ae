//! Opcodes and their accepted operand shapes.

use super::operand::OperandKind;
use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

use OperandKind::{Address, Immediate, Line, Register};

/// The closed opcode set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    // ==================== Data Transfer ====================
    /// `LOAD Rx, val`: Rx := val
    Load,
    /// `STORE Rx, addr`: [addr] := Rx
    Store,
    /// `MOV Rd, Rs`: Rd := Rs
    Mov,

    // ==================== Arithmetic ====================
    /// `ADD Rd, Rs` or `ADD Rd, Rs1, Rs2`
    Add,
    /// `SUB Rd, Rs` or `SUB Rd, Rs1, Rs2`
    Sub,
    /// `MUL Rd, Rs` or `MUL Rd, Rs1, Rs2`
    Mul,
    /// `INC Rx`: Rx := Rx + 1
    Inc,
    /// `DEC Rx`: Rx := Rx - 1
    Dec,
    /// `CMP Rx, Ry`: flags from Rx - Ry, no register written
    Cmp,

    // ==================== Control Flow ====================
    /// Unconditional jump
    Jmp,
    /// Jump if Z
    Jz,
    /// Jump if not Z
    Jnz,
    /// Jump if C
    Jc,
    /// Jump if N
    Jn,

    /// No operation
    Nop,
}

const REG: &[OperandKind] = &[Register];
const REG_REG: &[OperandKind] = &[Register, Register];
const REG_REG_REG: &[OperandKind] = &[Register, Register, Register];
const REG_IMM: &[OperandKind] = &[Register, Immediate];
const REG_ADDR: &[OperandKind] = &[Register, Address];
const LINE: &[OperandKind] = &[Line];
const NONE: &[OperandKind] = &[];

impl Opcode {
    /// Every opcode, in listing order.
    pub const ALL: [Opcode; 15] = [
        Opcode::Load, Opcode::Store, Opcode::Mov,
        Opcode::Add, Opcode::Sub, Opcode::Mul, Opcode::Inc, Opcode::Dec, Opcode::Cmp,
        Opcode::Jmp, Opcode::Jz, Opcode::Jnz, Opcode::Jc, Opcode::Jn,
        Opcode::Nop,
    ];

    /// Canonical upper-case mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Load => "LOAD",
            Opcode::Store => "STORE",
            Opcode::Mov => "MOV",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Inc => "INC",
            Opcode::Dec => "DEC",
            Opcode::Cmp => "CMP",
            Opcode::Jmp => "JMP",
            Opcode::Jz => "JZ",
            Opcode::Jnz => "JNZ",
            Opcode::Jc => "JC",
            Opcode::Jn => "JN",
            Opcode::Nop => "NOP",
        }
    }

    /// The operand-kind signatures this opcode accepts.
    ///
    /// Validation and decode both dispatch on these; an operand list is
    /// well-formed iff its kinds equal one of the returned slices.
    pub fn shapes(self) -> &'static [&'static [OperandKind]] {
        match self {
            Opcode::Load => &[REG_IMM],
            Opcode::Store => &[REG_ADDR],
            Opcode::Mov | Opcode::Cmp => &[REG_REG],
            Opcode::Add | Opcode::Sub | Opcode::Mul => &[REG_REG, REG_REG_REG],
            Opcode::Inc | Opcode::Dec => &[REG],
            Opcode::Jmp | Opcode::Jz | Opcode::Jnz | Opcode::Jc | Opcode::Jn => &[LINE],
            Opcode::Nop => &[NONE],
        }
    }

    /// Find the shape with exactly `arity` operands, if any.
    pub fn shape_for_arity(self, arity: usize) -> Option<&'static [OperandKind]> {
        self.shapes().iter().copied().find(|shape| shape.len() == arity)
    }

    /// Human-readable list of accepted operand counts, e.g. `"2 or 3"`.
    pub fn arity_description(self) -> String {
        let counts: Vec<String> = self.shapes().iter().map(|s| s.len().to_string()).collect();
        counts.join(" or ")
    }

    /// Whether this opcode may redirect the program counter.
    pub fn is_jump(self) -> bool {
        matches!(self, Opcode::Jmp | Opcode::Jz | Opcode::Jnz | Opcode::Jc | Opcode::Jn)
    }

    /// Whether executing this opcode recomputes the flags.
    pub fn defines_flags(self) -> bool {
        matches!(
            self,
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Inc | Opcode::Dec | Opcode::Cmp
        )
    }
}

impl FromStr for Opcode {
    type Err = ();

    /// Case-insensitive mnemonic lookup. `MOVE` is accepted for `MOV`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        match upper.as_str() {
            "MOVE" => Ok(Opcode::Mov),
            other => Opcode::ALL
                .iter()
                .copied()
                .find(|op| op.mnemonic() == other)
                .ok_or(()),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
