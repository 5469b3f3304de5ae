//! Parser, validator and listing for simulator programs.
//!
//! This module provides:
//! - A two-pass parser/validator (text → [`Program`](crate::isa::Program))
//! - A disassembler (program → canonical text)
//! - Plain-text program file loading and saving

pub mod parser;
pub mod disasm;
pub mod source;

pub use parser::{parse, validate, ValidationError};
pub use disasm::{disassemble, format_instruction};
pub use source::{load_source, save_source, SourceError, SourceFile};
