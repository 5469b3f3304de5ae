//! Canonical text form of instructions and programs.
//!
//! Converts parsed instructions back to readable assembly.

use crate::isa::{Instruction, Program};
use std::fmt;

/// Format one instruction as canonical assembly text, e.g. `ADD R2, R0, R1`.
pub fn format_instruction(instr: &Instruction) -> String {
    if instr.operands().is_empty() {
        return instr.opcode().mnemonic().to_string();
    }
    let operands: Vec<String> = instr.operands().iter().map(|op| op.to_string()).collect();
    format!("{} {}", instr.opcode(), operands.join(", "))
}

/// List a program with its 0-based line numbers.
pub fn disassemble(program: &Program) -> String {
    let mut output = String::new();
    output.push_str("; Program listing\n");
    output.push_str("; ---------------\n\n");

    for (line, instr) in program.iter().enumerate() {
        output.push_str(&format!("{:03}: {:<20} ; source line {}\n",
            line, format_instruction(instr), instr.source_line()));
    }

    output
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_instruction(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::parse;

    #[test]
    fn test_format_canonical() {
        let program = parse("add r2,r0 ,  r1\nnop\nmove R1, R2\nLOAD R0, 0x10").unwrap();
        assert_eq!(format_instruction(program.get(0).unwrap()), "ADD R2, R0, R1");
        assert_eq!(format_instruction(program.get(1).unwrap()), "NOP");
        assert_eq!(program.get(2).unwrap().to_string(), "MOV R1, R2");
        assert_eq!(program.get(3).unwrap().to_string(), "LOAD R0, 16");
    }

    #[test]
    fn test_listing_has_line_numbers() {
        let program = parse("; c\nNOP\nJMP 0").unwrap();
        let text = disassemble(&program);
        assert!(text.contains("000: NOP"));
        assert!(text.contains("001: JMP 0"));
        assert!(text.contains("source line 3"));
    }

    #[test]
    fn test_canonical_text_reparses() {
        let program = parse("LOAD R6, 0\nLOAD R7, 5\nINC R6\nCMP R6, R7\nJNZ 2").unwrap();
        let text: Vec<String> = program.iter().map(format_instruction).collect();
        let reparsed = parse(&text.join("\n")).unwrap();
        let ops: Vec<_> = reparsed.iter().map(|i| i.operands().to_vec()).collect();
        let orig: Vec<_> = program.iter().map(|i| i.operands().to_vec()).collect();
        assert_eq!(ops, orig);
    }
}
