//! Decode stage: turn an [`Instruction`] into an executable [`Op`].
//!
//! The parser only builds instructions that match one of their opcode's
//! shapes, so a decode failure means an internal inconsistency.

use crate::isa::{Instruction, Opcode, Operand, Reg};
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// ALU operation selector for the arithmetic family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AluOp {
    Add,
    Sub,
    Mul,
}

/// Jump condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    Always,
    Zero,
    NotZero,
    Carry,
    Negative,
}

/// A decoded, executable operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    // ==================== Data Transfer ====================

    /// Rd := value
    Load { rd: Reg, value: u8 },

    /// [addr] := Rs
    Store { rs: Reg, addr: u8 },

    /// Rd := Rs
    Mov { rd: Reg, rs: Reg },

    // ==================== Arithmetic ====================

    /// Rd := lhs (op) rhs. The two-operand form decodes with `lhs == rd`.
    Alu { op: AluOp, rd: Reg, lhs: Reg, rhs: Reg },

    /// Rd := Rd + 1
    Inc { rd: Reg },

    /// Rd := Rd - 1
    Dec { rd: Reg },

    /// Flags from lhs - rhs
    Cmp { lhs: Reg, rhs: Reg },

    // ==================== Control Flow ====================

    /// PC := target if the condition holds
    Jump { cond: Condition, target: usize },

    /// No operation
    Nop,
}

/// Decode an instruction for a program of `program_len` lines.
pub fn decode(instr: &Instruction, program_len: usize) -> Result<Op, DecodeError> {
    use Operand::{Address, Immediate, Line, Register};

    let opcode = instr.opcode();
    let op = match (opcode, instr.operands()) {
        (Opcode::Load, [Register(rd), Immediate(value)]) => Op::Load { rd: *rd, value: *value },
        (Opcode::Store, [Register(rs), Address(addr)]) => Op::Store { rs: *rs, addr: *addr },
        (Opcode::Mov, [Register(rd), Register(rs)]) => Op::Mov { rd: *rd, rs: *rs },

        (Opcode::Add | Opcode::Sub | Opcode::Mul, operands) => {
            let alu = match opcode {
                Opcode::Add => AluOp::Add,
                Opcode::Sub => AluOp::Sub,
                _ => AluOp::Mul,
            };
            match operands {
                [Register(rd), Register(rs)] => Op::Alu { op: alu, rd: *rd, lhs: *rd, rhs: *rs },
                [Register(rd), Register(lhs), Register(rhs)] => {
                    Op::Alu { op: alu, rd: *rd, lhs: *lhs, rhs: *rhs }
                }
                _ => return Err(malformed(instr)),
            }
        }

        (Opcode::Inc, [Register(rd)]) => Op::Inc { rd: *rd },
        (Opcode::Dec, [Register(rd)]) => Op::Dec { rd: *rd },
        (Opcode::Cmp, [Register(lhs), Register(rhs)]) => Op::Cmp { lhs: *lhs, rhs: *rhs },

        (Opcode::Jmp | Opcode::Jz | Opcode::Jnz | Opcode::Jc | Opcode::Jn, [Line(target)]) => {
            if *target >= program_len {
                return Err(DecodeError::JumpOutOfBounds {
                    line: instr.source_line(),
                    target: *target,
                    len: program_len,
                });
            }
            let cond = match opcode {
                Opcode::Jmp => Condition::Always,
                Opcode::Jz => Condition::Zero,
                Opcode::Jnz => Condition::NotZero,
                Opcode::Jc => Condition::Carry,
                _ => Condition::Negative,
            };
            Op::Jump { cond, target: *target }
        }

        (Opcode::Nop, []) => Op::Nop,

        _ => return Err(malformed(instr)),
    };

    Ok(op)
}

fn malformed(instr: &Instruction) -> DecodeError {
    DecodeError::Malformed {
        line: instr.source_line(),
        opcode: instr.opcode(),
        operands: instr.operands().len(),
    }
}

/// Errors that can occur during instruction decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("source line {line}: {opcode} with {operands} operand(s) does not match any shape")]
    Malformed { line: usize, opcode: Opcode, operands: usize },

    #[error("source line {line}: jump target {target} outside program of {len} line(s)")]
    JumpOutOfBounds { line: usize, target: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reg(i: u8) -> Reg {
        Reg::new(i).unwrap()
    }

    #[test]
    fn test_decode_two_operand_alu() {
        let instr = Instruction::new(
            Opcode::Sub,
            vec![Operand::Register(reg(1)), Operand::Register(reg(2))],
            1,
        );
        assert_eq!(
            decode(&instr, 1),
            Ok(Op::Alu { op: AluOp::Sub, rd: reg(1), lhs: reg(1), rhs: reg(2) })
        );
    }

    #[test]
    fn test_decode_jump_conditions() {
        let cases = [
            (Opcode::Jmp, Condition::Always),
            (Opcode::Jz, Condition::Zero),
            (Opcode::Jnz, Condition::NotZero),
            (Opcode::Jc, Condition::Carry),
            (Opcode::Jn, Condition::Negative),
        ];
        for (opcode, cond) in cases {
            let instr = Instruction::new(opcode, vec![Operand::Line(0)], 1);
            assert_eq!(decode(&instr, 1), Ok(Op::Jump { cond, target: 0 }));
        }
    }

    #[test]
    fn test_malformed_is_rejected() {
        let instr = Instruction::new(Opcode::Load, vec![Operand::Immediate(3)], 7);
        assert_eq!(
            decode(&instr, 1),
            Err(DecodeError::Malformed { line: 7, opcode: Opcode::Load, operands: 1 })
        );

        let instr = Instruction::new(Opcode::Nop, vec![Operand::Line(0)], 2);
        assert!(decode(&instr, 1).is_err());
    }

    #[test]
    fn test_jump_past_end_is_rejected() {
        let instr = Instruction::new(Opcode::Jmp, vec![Operand::Line(3)], 4);
        assert!(matches!(decode(&instr, 3), Err(DecodeError::JumpOutOfBounds { target: 3, .. })));
    }
}
