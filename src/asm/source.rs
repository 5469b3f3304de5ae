//! Loading and saving program source files.
//!
//! Programs are persisted as their plain assembly text and re-parsed on
//! load; there is no binary format.

use super::parser::{parse, ValidationError};
use crate::isa::Program;
use std::path::Path;
use thiserror::Error;

/// A program loaded from disk, with the text it was parsed from.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// The raw source text.
    pub text: String,
    /// The validated program.
    pub program: Program,
}

impl SourceFile {
    /// Parse source text held in memory.
    pub fn from_text(text: impl Into<String>) -> Result<Self, SourceError> {
        let text = text.into();
        let program = parse(&text).map_err(SourceError::Invalid)?;
        Ok(Self { text, program })
    }

    /// Number of program lines.
    pub fn len(&self) -> usize {
        self.program.len()
    }

    pub fn is_empty(&self) -> bool {
        self.program.is_empty()
    }
}

/// Read and parse a program source file.
pub fn load_source<P: AsRef<Path>>(path: P) -> Result<SourceFile, SourceError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| SourceError::Io(format!("{}: {}", path.display(), e)))?;
    log::info!("loaded {} bytes of source from {}", text.len(), path.display());
    SourceFile::from_text(text)
}

/// Write program source text to disk.
pub fn save_source<P: AsRef<Path>>(path: P, text: &str) -> Result<(), SourceError> {
    let path = path.as_ref();
    std::fs::write(path, text)
        .map_err(|e| SourceError::Io(format!("{}: {}", path.display(), e)))
}

/// Errors that can occur while loading program files.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("program has {} validation error(s)", .0.len())]
    Invalid(Vec<ValidationError>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text() {
        let file = SourceFile::from_text("LOAD R0, 1\nINC R0").unwrap();
        assert_eq!(file.len(), 2);
        assert!(file.text.starts_with("LOAD"));
    }

    #[test]
    fn test_invalid_text() {
        match SourceFile::from_text("BOGUS\nLOAD R8, 1") {
            Err(SourceError::Invalid(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation errors, got {:?}", other),
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = std::env::temp_dir().join(format!("iss-sim-test-{}.asm", std::process::id()));
        save_source(&path, "LOAD R1, 7\nSTORE R1, 3\n").unwrap();
        let file = load_source(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(file.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(load_source("/nonexistent/iss-sim.asm"), Err(SourceError::Io(_))));
    }
}
