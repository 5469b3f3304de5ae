//! Parser and validator for assembly source.
//!
//! Syntax:
//! ```text
//! ; Comment            (a '#' also starts a comment)
//!     LOAD R0, 10      ; R0 := 10
//!     LOAD R1, 0x14    ; hex and 0b binary literals are accepted
//!     ADD  R2, R0, R1  ; R2 := R0 + R1
//!     STORE R2, 5      ; [5] := R2
//!     JNZ  0           ; jump targets are 0-based program lines
//! ```
//!
//! Blank and comment-only lines do not count as program lines.

use crate::isa::{Instruction, Opcode, Operand, OperandKind, Program, Reg, MAX_PROGRAM_LEN};
use std::str::FromStr;
use thiserror::Error;

/// Parse and validate source text into a [`Program`].
///
/// Every line is checked; on failure all errors are returned together, in
/// source order. Parsing never touches CPU state.
pub fn parse(source: &str) -> Result<Program, Vec<ValidationError>> {
    let mut parser = Parser::new();
    parser.parse(source)
}

/// Validate source text, returning every error found (empty if valid).
pub fn validate(source: &str) -> Vec<ValidationError> {
    parse(source).err().unwrap_or_default()
}

/// The parser state.
struct Parser {
    /// Successfully parsed instructions.
    instructions: Vec<Instruction>,
    /// Non-blank, non-comment lines seen, valid or not.
    line_count: usize,
    /// Jump targets to check once the line count is known: (target, source_line).
    pending_jumps: Vec<(u64, usize)>,
    /// Source line of the first program line past `MAX_PROGRAM_LEN`.
    overflow_line: Option<usize>,
    /// Errors collected so far.
    errors: Vec<ValidationError>,
}

impl Parser {
    fn new() -> Self {
        Self {
            instructions: Vec::new(),
            line_count: 0,
            pending_jumps: Vec::new(),
            overflow_line: None,
            errors: Vec::new(),
        }
    }

    fn parse(&mut self, source: &str) -> Result<Program, Vec<ValidationError>> {
        // Pass 1: tokenize and type-check every line
        for (idx, raw) in source.lines().enumerate() {
            self.process_line(raw, idx + 1);
        }

        // Pass 2: jump targets against the final program length
        self.resolve_jumps();

        if let Some(line) = self.overflow_line {
            self.errors.push(ValidationError::ProgramTooLong {
                line,
                len: self.line_count,
                max: MAX_PROGRAM_LEN,
            });
        }

        if self.errors.is_empty() {
            log::debug!("parsed program with {} instructions", self.instructions.len());
            Ok(Program::new(std::mem::take(&mut self.instructions)))
        } else {
            self.errors.sort_by_key(ValidationError::line);
            log::debug!("validation failed with {} error(s)", self.errors.len());
            Err(std::mem::take(&mut self.errors))
        }
    }

    fn process_line(&mut self, raw: &str, line_num: usize) {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            return;
        }
        self.line_count += 1;
        if self.line_count == MAX_PROGRAM_LEN + 1 {
            self.overflow_line = Some(line_num);
        }

        match self.parse_instruction(line, line_num) {
            Ok(instr) => self.instructions.push(instr),
            Err(errors) => self.errors.extend(errors),
        }
    }

    /// Parse one line. Every bad operand on the line is reported, not just the first.
    fn parse_instruction(&mut self, line: &str, line_num: usize) -> Result<Instruction, Vec<ValidationError>> {
        let (mnemonic, rest) = match line.split_once(char::is_whitespace) {
            Some((m, r)) => (m, r.trim()),
            None => (line, ""),
        };

        let opcode = Opcode::from_str(mnemonic).map_err(|_| {
            vec![ValidationError::UnknownOpcode {
                line: line_num,
                opcode: mnemonic.to_string(),
            }]
        })?;

        let tokens: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split(',').map(str::trim).collect()
        };

        let shape = opcode.shape_for_arity(tokens.len()).ok_or_else(|| {
            vec![ValidationError::WrongOperandCount {
                line: line_num,
                opcode,
                expected: opcode.arity_description(),
                found: tokens.len(),
            }]
        })?;

        let mut operands = Vec::with_capacity(tokens.len());
        let mut errors = Vec::new();
        for (position, (token, kind)) in tokens.iter().zip(shape.iter()).enumerate() {
            match self.parse_operand(token, *kind, position + 1, line_num) {
                Ok(operand) => operands.push(operand),
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(Instruction::new(opcode, operands, line_num))
        } else {
            Err(errors)
        }
    }

    fn parse_operand(
        &mut self,
        token: &str,
        kind: OperandKind,
        position: usize,
        line_num: usize,
    ) -> Result<Operand, ValidationError> {
        let invalid = || ValidationError::InvalidOperand {
            line: line_num,
            position,
            token: token.to_string(),
            expected: kind,
        };

        match kind {
            OperandKind::Register => {
                let digits = token
                    .strip_prefix('R')
                    .or_else(|| token.strip_prefix('r'))
                    .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
                    // R07 is not a register name
                    .filter(|d| d.len() == 1 || !d.starts_with('0'))
                    .ok_or_else(invalid)?;
                let index: u64 = digits.parse().map_err(|_| invalid())?;
                u8::try_from(index)
                    .ok()
                    .and_then(Reg::new)
                    .map(Operand::Register)
                    .ok_or(ValidationError::RegisterOutOfRange { line: line_num, index })
            }

            OperandKind::Immediate | OperandKind::Address => {
                let value = parse_literal(token).ok_or_else(invalid)?;
                let max = kind.max_value().unwrap_or(u8::MAX as u32);
                if value > max as u64 {
                    return Err(ValidationError::ValueOutOfRange { line: line_num, kind, value, max });
                }
                // max <= 255 for both kinds
                let byte = value as u8;
                Ok(if kind == OperandKind::Immediate {
                    Operand::Immediate(byte)
                } else {
                    Operand::Address(byte)
                })
            }

            OperandKind::Line => {
                let target = parse_literal(token).ok_or_else(invalid)?;
                self.pending_jumps.push((target, line_num));
                Ok(Operand::Line(usize::try_from(target).unwrap_or(usize::MAX)))
            }
        }
    }

    fn resolve_jumps(&mut self) {
        let len = self.line_count;
        for &(target, line) in &self.pending_jumps {
            if target >= len as u64 {
                self.errors.push(ValidationError::JumpOutOfBounds { line, target, len });
            }
        }
    }
}

/// Cut the line at the first `;` or `#`.
fn strip_comment(line: &str) -> &str {
    match line.find(&[';', '#'][..]) {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Parse an unsigned literal: decimal, `0x` hex or `0b` binary.
fn parse_literal(token: &str) -> Option<u64> {
    let lower = token.to_ascii_lowercase();
    let (digits, radix) = if let Some(hex) = lower.strip_prefix("0x") {
        (hex, 16)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        (bin, 2)
    } else {
        (lower.as_str(), 10)
    };

    // from_str_radix would accept a leading '+'
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    // Anything too large for u64 is certainly out of range; saturate
    Some(u64::from_str_radix(digits, radix).unwrap_or(u64::MAX))
}

/// Errors reported while validating source text.
///
/// Every variant carries the 1-based source line it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("line {line}: unknown opcode '{opcode}'")]
    UnknownOpcode { line: usize, opcode: String },

    #[error("line {line}: {opcode} takes {expected} operand(s), found {found}")]
    WrongOperandCount { line: usize, opcode: Opcode, expected: String, found: usize },

    #[error("line {line}: operand {position} '{token}' is not a valid {expected}")]
    InvalidOperand { line: usize, position: usize, token: String, expected: OperandKind },

    #[error("line {line}: register R{index} does not exist (R0-R7)")]
    RegisterOutOfRange { line: usize, index: u64 },

    #[error("line {line}: {kind} {value} out of range (0-{max})")]
    ValueOutOfRange { line: usize, kind: OperandKind, value: u64, max: u32 },

    #[error("line {line}: jump target {target} outside program of {len} line(s)")]
    JumpOutOfBounds { line: usize, target: u64, len: usize },

    #[error("line {line}: program has {len} instructions, at most {max} allowed")]
    ProgramTooLong { line: usize, len: usize, max: usize },
}

impl ValidationError {
    /// The 1-based source line this error refers to.
    pub fn line(&self) -> usize {
        match self {
            ValidationError::UnknownOpcode { line, .. }
            | ValidationError::WrongOperandCount { line, .. }
            | ValidationError::InvalidOperand { line, .. }
            | ValidationError::RegisterOutOfRange { line, .. }
            | ValidationError::ValueOutOfRange { line, .. }
            | ValidationError::JumpOutOfBounds { line, .. }
            | ValidationError::ProgramTooLong { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(i: u8) -> Operand {
        Operand::Register(Reg::new(i).unwrap())
    }

    #[test]
    fn test_parse_simple() {
        let source = r#"
            ; Simple test program
            LOAD R0, 10
            LOAD R1, 20
            ADD R2, R0, R1   # trailing comment
            STORE R2, 5
        "#;

        let program = parse(source).unwrap();
        assert_eq!(program.len(), 4);
        let add = program.get(2).unwrap();
        assert_eq!(add.opcode(), Opcode::Add);
        assert_eq!(add.operands(), &[r(2), r(0), r(1)]);
        assert_eq!(program.get(3).unwrap().operands(), &[r(2), Operand::Address(5)]);
    }

    #[test]
    fn test_line_numbers_skip_blank_and_comments() {
        let source = "\n; header\nNOP\n\n# note\nJMP 0\n";
        let program = parse(source).unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program.get(1).unwrap().jump_target(), Some(0));
        assert_eq!(program.get(1).unwrap().source_line(), 6);
    }

    #[test]
    fn test_case_insensitive_and_alias() {
        let program = parse("load r1, 0x1F\nmove R2, r1\nmov R3,R2").unwrap();
        assert_eq!(program.get(0).unwrap().operands(), &[r(1), Operand::Immediate(31)]);
        assert_eq!(program.get(1).unwrap().opcode(), Opcode::Mov);
        assert_eq!(program.get(2).unwrap().operands(), &[r(3), r(2)]);
    }

    #[test]
    fn test_binary_literal() {
        let program = parse("LOAD R0, 0b1010").unwrap();
        assert_eq!(program.get(0).unwrap().operands()[1], Operand::Immediate(10));
    }

    #[test]
    fn test_two_and_three_operand_forms() {
        let program = parse("SUB R1, R2\nMUL R0, R1, R2").unwrap();
        assert_eq!(program.get(0).unwrap().operands().len(), 2);
        assert_eq!(program.get(1).unwrap().operands().len(), 3);
    }

    #[test]
    fn test_invalid_register_rejected() {
        let errors = parse("LOAD R0, 1\nADD R9, R0, R1").unwrap_err();
        assert_eq!(errors, vec![ValidationError::RegisterOutOfRange { line: 2, index: 9 }]);
    }

    #[test]
    fn test_all_errors_collected() {
        let source = "FOO R1\nLOAD R1\nINC 5\nLOAD R0, 256\nSTORE R0, 64\nJMP 99";
        let errors = parse(source).unwrap_err();
        let lines: Vec<usize> = errors.iter().map(ValidationError::line).collect();
        assert_eq!(lines, vec![1, 2, 3, 4, 5, 6]);
        assert!(matches!(errors[0], ValidationError::UnknownOpcode { .. }));
        assert!(matches!(errors[1], ValidationError::WrongOperandCount { found: 1, .. }));
        assert!(matches!(errors[2], ValidationError::InvalidOperand { position: 1, .. }));
        assert!(matches!(errors[3], ValidationError::ValueOutOfRange { value: 256, max: 255, .. }));
        assert!(matches!(errors[4], ValidationError::ValueOutOfRange { value: 64, max: 63, .. }));
        assert!(matches!(errors[5], ValidationError::JumpOutOfBounds { target: 99, len: 6, .. }));
    }

    #[test]
    fn test_forward_and_backward_jumps() {
        let program = parse("JMP 2\nNOP\nJZ 0").unwrap();
        assert_eq!(program.get(0).unwrap().jump_target(), Some(2));
        assert_eq!(program.get(2).unwrap().jump_target(), Some(0));
    }

    #[test]
    fn test_jump_to_end_rejected() {
        let errors = parse("NOP\nJMP 2").unwrap_err();
        assert!(matches!(errors[0], ValidationError::JumpOutOfBounds { line: 2, target: 2, len: 2 }));
    }

    #[test]
    fn test_negative_and_garbage_literals() {
        assert!(parse("LOAD R0, -1").is_err());
        assert!(parse("LOAD R0, +1").is_err());
        assert!(parse("LOAD R0, 0x").is_err());
        assert!(parse("LOAD R0, R1").is_err());
        assert!(parse("MOV R0, 5").is_err());
        assert!(parse("ADD R0,,R1").is_err());
    }

    #[test]
    fn test_nop_takes_no_operands() {
        assert!(parse("NOP").is_ok());
        let errors = parse("NOP R1").unwrap_err();
        assert!(matches!(errors[0], ValidationError::WrongOperandCount { found: 1, .. }));
    }

    #[test]
    fn test_program_too_long() {
        let source = "NOP\n".repeat(MAX_PROGRAM_LEN + 1);
        let errors = parse(&source).unwrap_err();
        assert!(matches!(errors[0], ValidationError::ProgramTooLong { line: 257, .. }));
        assert!(parse(&"NOP\n".repeat(MAX_PROGRAM_LEN)).is_ok());
    }

    #[test]
    fn test_program_too_long_after_bad_line() {
        let source = format!("BOGUS\n{}", "NOP\n".repeat(MAX_PROGRAM_LEN));
        let errors = parse(&source).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ValidationError::UnknownOpcode { line: 1, .. }));
        assert_eq!(
            errors[1],
            ValidationError::ProgramTooLong { line: 257, len: 257, max: MAX_PROGRAM_LEN }
        );
    }

    #[test]
    fn test_every_bad_operand_on_a_line_reported() {
        let errors = parse("ADD R9, R8, R10").unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::RegisterOutOfRange { line: 1, index: 9 },
                ValidationError::RegisterOutOfRange { line: 1, index: 8 },
                ValidationError::RegisterOutOfRange { line: 1, index: 10 },
            ]
        );

        let errors = parse("NOP\nSTORE R1, 99\nLOAD X, 300").unwrap_err();
        let lines: Vec<usize> = errors.iter().map(ValidationError::line).collect();
        assert_eq!(lines, vec![2, 3, 3]);
        assert!(matches!(errors[1], ValidationError::InvalidOperand { position: 1, .. }));
        assert!(matches!(errors[2], ValidationError::ValueOutOfRange { value: 300, .. }));
    }

    #[test]
    fn test_register_leading_zero_rejected() {
        for token in ["R07", "R007", "r00"] {
            let errors = parse(&format!("INC {}", token)).unwrap_err();
            assert!(matches!(errors[0], ValidationError::InvalidOperand { position: 1, .. }));
        }
        assert!(parse("INC R0").is_ok());
    }

    #[test]
    fn test_empty_source() {
        assert!(parse("").unwrap().is_empty());
        assert!(validate("; only a comment").is_empty());
    }
}
