//! Smali patch engine: parse a patch file, locate methods, edit lines, write files back.

pub mod error;
pub mod executor;
pub mod locator;
pub mod orchestrator;
pub mod parser;
pub mod report;
pub mod target;

pub use error::{BlockError, ParseError, WriteError};
pub use orchestrator::{ApplyOptions, apply_patch_file};
pub use parser::{Action, ActionKind, PatchBlock, PatchFile, TaggedLine, parse_patch};
pub use report::{ApplyResult, BlockStatus, FileChange, RunReport};
