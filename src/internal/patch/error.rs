//! Error types for patch parsing and application.

use std::path::PathBuf;

use thiserror::Error;

/// A malformed patch file. Always fatal: nothing is touched on disk once parsing fails.
#[derive(Debug, PartialEq, Eq, Error, Clone)]
pub enum ParseError {
    #[error("line {line_number}: expected an action line (REPLACE, PATCH or CREATE_METHOD) after 'FILE {path}', got '{found}'")]
    MissingAction {
        path: String,
        found: String,
        line_number: usize,
    },
    #[error("line {line_number}: '{keyword}' requires a method anchor")]
    EmptyAnchor { keyword: String, line_number: usize },
    #[error("line {line_number}: '{directive}' requires a path")]
    EmptyPath {
        directive: String,
        line_number: usize,
    },
    #[error("line {line_number}: block has no 'END' terminator")]
    MissingEnd { line_number: usize },
    #[error("line {line_number}: unexpected line outside of a block: '{found}'")]
    UnexpectedLine { found: String, line_number: usize },
}

/// Why a single block could not be applied. Scoped to that block (or its file).
#[derive(Debug, PartialEq, Eq, Error, Clone)]
pub enum BlockError {
    #[error("target file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("could not read target file {}: {message}", .path.display())]
    ReadFailed { path: PathBuf, message: String },
    #[error("path escapes the work directory: {0}")]
    PathOutsideWorkDir(String),
    #[error("method not found: {0}")]
    MethodNotFound(String),
    #[error("method '{anchor}' starting at line {start_line} has no '{end_marker}' line")]
    MethodEndMissing {
        anchor: String,
        start_line: usize,
        end_marker: String,
    },
    #[error("context mismatch at line {line_number}: expected '{expected}', found '{found}'")]
    ContextMismatch {
        line_number: usize,
        expected: String,
        found: String,
    },
    #[error("remove mismatch at line {line_number}: expected '{expected}', found '{found}'")]
    RemoveMismatch {
        line_number: usize,
        expected: String,
        found: String,
    },
    #[error("patch runs past the end of the method at line {line_number}")]
    OutOfMethodBounds { line_number: usize },
    #[error("could not write {}: {message}", .path.display())]
    WriteFailed { path: PathBuf, message: String },
}

/// Storage failure while persisting a target file.
#[derive(Debug, Error)]
#[error("{context}: {source}")]
pub struct WriteError {
    pub context: String,
    #[source]
    pub source: std::io::Error,
}
