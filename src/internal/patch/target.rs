//! Loading a target file into lines and writing it back.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::warn;

use super::error::{BlockError, WriteError};

/// A target file held in memory while its blocks are applied.
///
/// Created once per distinct path, mutated only by the executors and persisted at most once.
#[derive(Debug, Clone)]
pub struct TargetFile {
    pub path: PathBuf,
    pub lines: Vec<String>,
    original: Vec<String>,
    on_disk: bool,
    created: bool,
}

impl TargetFile {
    /// Reads `path`. A missing file is not an error here: it yields an absent target
    /// that only a CREATE block can bring into existence.
    pub fn load(path: PathBuf) -> Result<Self, BlockError> {
        match fs::read_to_string(&path) {
            Ok(contents) => {
                let lines = split_lines(&contents);
                Ok(Self {
                    path,
                    original: lines.clone(),
                    lines,
                    on_disk: true,
                    created: false,
                })
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self {
                path,
                lines: Vec::new(),
                original: Vec::new(),
                on_disk: false,
                created: false,
            }),
            Err(err) => Err(BlockError::ReadFailed {
                path,
                message: err.to_string(),
            }),
        }
    }

    pub fn exists(&self) -> bool {
        self.on_disk || self.created
    }

    /// Fills an absent target with `content`.
    pub fn create(&mut self, content: &[String]) {
        self.lines = content.to_vec();
        self.created = true;
    }

    /// Whether persisting would change anything on disk.
    pub fn is_modified(&self) -> bool {
        (self.created && !self.on_disk) || self.lines != self.original
    }

    pub fn original_contents(&self) -> String {
        join_lines(&self.original)
    }

    pub fn contents(&self) -> String {
        join_lines(&self.lines)
    }

    /// Atomically replaces the file on disk: the new contents go to a temporary file in
    /// the same directory which is then renamed over the target.
    pub fn persist(&self) -> Result<(), WriteError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|source| WriteError {
            context: format!("Failed to create parent directories for {}", self.path.display()),
            source,
        })?;

        let mut temp = NamedTempFile::new_in(parent).map_err(|source| WriteError {
            context: format!("Failed to create temporary file in {}", parent.display()),
            source,
        })?;
        temp.write_all(self.contents().as_bytes())
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|source| WriteError {
                context: format!("Failed to write file {}", self.path.display()),
                source,
            })?;
        if let Ok(metadata) = fs::metadata(&self.path)
            && let Err(err) = fs::set_permissions(temp.path(), metadata.permissions())
        {
            // the temp file keeps its 0600 mode
            warn!(
                "could not copy permissions of {}: {}",
                self.path.display(),
                err
            );
        }
        temp.persist(&self.path).map_err(|err| WriteError {
            context: format!("Failed to replace file {}", self.path.display()),
            source: err.error,
        })?;
        Ok(())
    }
}

/// Splits file contents into lines, dropping a `\r` before each `\n` and the empty
/// element produced by the final newline.
pub(crate) fn split_lines(contents: &str) -> Vec<String> {
    let mut lines: Vec<String> = contents
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect();
    if lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}

/// Joins lines with `\n`, always ending with a newline unless there are no lines.
pub(crate) fn join_lines(lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut contents = lines.join("\n");
    contents.push('\n');
    contents
}
