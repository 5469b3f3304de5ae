//! Validated instructions and programs.

use super::{Opcode, Operand};
use serde::{Serialize, Deserialize};

/// One instruction: an opcode and its ordered operands.
///
/// Only the parser builds these for public use, so an `Instruction` reached
/// through a [`Program`] always matches one of its opcode's shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub(crate) opcode: Opcode,
    pub(crate) operands: Vec<Operand>,
    /// 1-based line in the source text this came from.
    pub(crate) source_line: usize,
}

impl Instruction {
    pub(crate) fn new(opcode: Opcode, operands: Vec<Operand>, source_line: usize) -> Self {
        Self { opcode, operands, source_line }
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    /// 1-based line in the source text.
    pub fn source_line(&self) -> usize {
        self.source_line
    }

    /// The jump target, if this is a jump.
    pub fn jump_target(&self) -> Option<usize> {
        match (self.opcode.is_jump(), self.operands.as_slice()) {
            (true, [Operand::Line(target)]) => Some(*target),
            _ => None,
        }
    }
}

/// An immutable, validated sequence of instructions.
///
/// Line numbers are 0-based positions in this sequence; they are the unit
/// jump targets refer to. Programs are only built by the parser, so there is
/// no `Deserialize`; persisted programs are source text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub(crate) fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Instruction at `line`, or `None` past the end.
    #[inline]
    pub fn get(&self, line: usize) -> Option<&Instruction> {
        self.instructions.get(line)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::Reg;

    #[test]
    fn test_jump_target() {
        let jmp = Instruction::new(Opcode::Jnz, vec![Operand::Line(2)], 5);
        assert_eq!(jmp.jump_target(), Some(2));

        let r0 = Reg::new(0).unwrap();
        let inc = Instruction::new(Opcode::Inc, vec![Operand::Register(r0)], 1);
        assert_eq!(inc.jump_target(), None);
    }

    #[test]
    fn test_program_indexing() {
        let program = Program::new(vec![
            Instruction::new(Opcode::Nop, vec![], 1),
            Instruction::new(Opcode::Jmp, vec![Operand::Line(0)], 3),
        ]);
        assert_eq!(program.len(), 2);
        assert_eq!(program.get(1).map(|i| i.opcode()), Some(Opcode::Jmp));
        assert!(program.get(2).is_none());
    }
}
