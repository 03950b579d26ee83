//! This module turns the text of a `.smalipatch` file into an ordered list of blocks.
//! (It does not check that the blocks can be applied to any file.)
//!
//! The grammar is line oriented:
//!
//! start: (blank | comment | file_block | create_block)*
//! file_block: "FILE " path LF action_block+ ("END" LF)?
//! action_block: (blank | comment)* action LF content* "END" LF
//! action: "REPLACE " anchor | "PATCH " anchor | "CREATE_METHOD"
//! create_block: "CREATE " path LF content* "END" LF
//! comment: "#" /(.*)/ LF
//!
//! Content lines are kept verbatim. Inside a PATCH block, a line whose first
//! non-indent character is `-` or `+` is a removal or an addition; every other
//! line (blank lines included) is context that must match the target exactly.

use tracing::debug;

use super::error::ParseError::{self, *};

const FILE_MARKER: &str = "FILE";
const CREATE_MARKER: &str = "CREATE";
const REPLACE_MARKER: &str = "REPLACE";
const PATCH_MARKER: &str = "PATCH";
const CREATE_METHOD_MARKER: &str = "CREATE_METHOD";
const END_MARKER: &str = "END";
const COMMENT_MARKER: char = '#';

/// Role of a single content line inside a PATCH block.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LineKind {
    Context,
    Add,
    Remove,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TaggedLine {
    pub kind: LineKind,
    /// Line text with the `+`/`-` marker (and one following space) stripped.
    pub text: String,
}

impl TaggedLine {
    pub fn context(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Context,
            text: text.into(),
        }
    }

    pub fn add(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Add,
            text: text.into(),
        }
    }

    pub fn remove(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Remove,
            text: text.into(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Action {
    /// Swap the whole located method (declaration through end marker) for `content`.
    Replace { anchor: String, content: Vec<String> },
    /// Sequential, context-verified line edit inside the located method.
    Patch {
        anchor: String,
        lines: Vec<TaggedLine>,
    },
    /// Insert a new method before the class end marker (or at end of file).
    CreateMethod { content: Vec<String> },
    /// Create the target file with `content` if it does not exist yet.
    CreateFile { content: Vec<String> },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Replace { .. } => ActionKind::Replace,
            Action::Patch { .. } => ActionKind::Patch,
            Action::CreateMethod { .. } => ActionKind::CreateMethod,
            Action::CreateFile { .. } => ActionKind::CreateFile,
        }
    }
}

/// Payload-free tag of an [`Action`], kept in results after the block is dropped.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ActionKind {
    Replace,
    Patch,
    CreateMethod,
    CreateFile,
}

impl ActionKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ActionKind::Replace => REPLACE_MARKER,
            ActionKind::Patch => PATCH_MARKER,
            ActionKind::CreateMethod => CREATE_METHOD_MARKER,
            ActionKind::CreateFile => CREATE_MARKER,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PatchBlock {
    /// Path as written after `FILE`/`CREATE`, relative to the work directory.
    pub target_path: String,
    pub action: Action,
    /// 1-based line of the `FILE`/`CREATE` directive this block belongs to.
    pub line_number: usize,
}

/// An ordered, read-only list of blocks in patch-file order.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct PatchFile {
    pub blocks: Vec<PatchBlock>,
}

impl PatchFile {
    /// Distinct target paths in order of first reference.
    pub fn target_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = Vec::new();
        for block in &self.blocks {
            if !paths.contains(&block.target_path.as_str()) {
                paths.push(&block.target_path);
            }
        }
        paths
    }
}

pub fn parse_patch(text: &str) -> Result<PatchFile, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut blocks = Vec::new();
    let mut remaining_lines = &lines[..];
    let mut line_number = 1;

    while !remaining_lines.is_empty() {
        if is_skippable(remaining_lines[0]) {
            remaining_lines = &remaining_lines[1..];
            line_number += 1;
            continue;
        }
        let (directive_blocks, directive_lines) = parse_one_directive(remaining_lines, line_number)?;
        blocks.extend(directive_blocks);
        line_number += directive_lines;
        remaining_lines = &remaining_lines[directive_lines..];
    }

    debug!("parsed {} patch block(s)", blocks.len());
    Ok(PatchFile { blocks })
}

/// Blank lines and `#` comments between blocks.
fn is_skippable(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with(COMMENT_MARKER)
}

/// Returns the text after `keyword` when `line` is exactly that keyword or the
/// keyword followed by whitespace.
fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

/// Parses one `FILE` or `CREATE` directive from the start of `lines`.
/// Returns its blocks and the number of lines it spans.
fn parse_one_directive(
    lines: &[&str],
    line_number: usize,
) -> Result<(Vec<PatchBlock>, usize), ParseError> {
    let first_line = lines[0].trim();

    if let Some(path) = strip_keyword(first_line, FILE_MARKER) {
        if path.is_empty() {
            return Err(EmptyPath {
                directive: FILE_MARKER.to_string(),
                line_number,
            });
        }
        return parse_file_directive(lines, path, line_number);
    }

    if let Some(path) = strip_keyword(first_line, CREATE_MARKER) {
        if path.is_empty() {
            return Err(EmptyPath {
                directive: CREATE_MARKER.to_string(),
                line_number,
            });
        }
        let (content, consumed) = read_content(lines, 1, line_number)?;
        let block = PatchBlock {
            target_path: path.to_string(),
            action: Action::CreateFile { content },
            line_number,
        };
        return Ok((vec![block], consumed));
    }

    Err(UnexpectedLine {
        found: first_line.to_string(),
        line_number,
    })
}

/// A `FILE` directive owns every action that follows it, each closed by its own `END`,
/// up to the next directive. An extra `END` right after the last action closes the
/// directive explicitly.
fn parse_file_directive(
    lines: &[&str],
    path: &str,
    line_number: usize,
) -> Result<(Vec<PatchBlock>, usize), ParseError> {
    let mut blocks = Vec::new();
    let mut index = 1;

    while let Some(offset) = lines[index..].iter().position(|line| !is_skippable(line)) {
        let action_index = index + offset;
        let action_line = lines[action_index].trim();
        if !blocks.is_empty() && action_line == END_MARKER {
            index = action_index + 1;
            break;
        }
        let Some((action, next_index)) = parse_action(lines, action_index, line_number)? else {
            if blocks.is_empty() {
                return Err(MissingAction {
                    path: path.to_string(),
                    found: action_line.to_string(),
                    line_number: line_number + action_index,
                });
            }
            break;
        };
        blocks.push(PatchBlock {
            target_path: path.to_string(),
            action,
            line_number,
        });
        index = next_index;
    }

    if blocks.is_empty() {
        return Err(MissingAction {
            path: path.to_string(),
            found: "<end of input>".to_string(),
            line_number: line_number + lines.len(),
        });
    }
    Ok((blocks, index))
}

/// Parses the action starting at `lines[action_index]` and its content.
/// Returns `None` when that line is not an action keyword.
fn parse_action(
    lines: &[&str],
    action_index: usize,
    directive_line_number: usize,
) -> Result<Option<(Action, usize)>, ParseError> {
    let action_line = lines[action_index].trim();
    let action_line_number = directive_line_number + action_index;

    let parsed = if let Some(anchor) = strip_keyword(action_line, REPLACE_MARKER) {
        require_anchor(anchor, REPLACE_MARKER, action_line_number)?;
        let (content, next_index) = read_content(lines, action_index + 1, directive_line_number)?;
        (
            Action::Replace {
                anchor: anchor.to_string(),
                content,
            },
            next_index,
        )
    } else if let Some(anchor) = strip_keyword(action_line, PATCH_MARKER) {
        require_anchor(anchor, PATCH_MARKER, action_line_number)?;
        let (content, next_index) = read_content(lines, action_index + 1, directive_line_number)?;
        (
            Action::Patch {
                anchor: anchor.to_string(),
                lines: content.iter().map(|line| classify_line(line)).collect(),
            },
            next_index,
        )
    } else if action_line == CREATE_METHOD_MARKER {
        let (content, next_index) = read_content(lines, action_index + 1, directive_line_number)?;
        (Action::CreateMethod { content }, next_index)
    } else {
        return Ok(None);
    };
    Ok(Some(parsed))
}

fn require_anchor(anchor: &str, keyword: &str, line_number: usize) -> Result<(), ParseError> {
    if anchor.is_empty() {
        return Err(EmptyAnchor {
            keyword: keyword.to_string(),
            line_number,
        });
    }
    Ok(())
}

/// Collects content lines from `start` up to the `END` line.
/// Returns the content and the index just past `END`.
///
/// Running into the next `FILE`/`CREATE` directive (at column 0) before `END`
/// is reported as a missing terminator instead of swallowing the next block.
fn read_content(
    lines: &[&str],
    start: usize,
    block_line_number: usize,
) -> Result<(Vec<String>, usize), ParseError> {
    let mut content = Vec::new();
    for (offset, line) in lines.iter().enumerate().skip(start) {
        if line.trim() == END_MARKER {
            return Ok((content, offset + 1));
        }
        if strip_keyword(line, FILE_MARKER).is_some_and(|p| !p.is_empty())
            || strip_keyword(line, CREATE_MARKER).is_some_and(|p| !p.is_empty())
        {
            break;
        }
        content.push(line.to_string());
    }
    Err(MissingEnd {
        line_number: block_line_number,
    })
}

fn classify_line(raw: &str) -> TaggedLine {
    let body = raw.trim_start();
    let kind = match body.chars().next() {
        Some('-') => LineKind::Remove,
        Some('+') => LineKind::Add,
        _ => return TaggedLine::context(raw),
    };
    let text = &body[1..];
    let text = text.strip_prefix(' ').unwrap_or(text);
    TaggedLine {
        kind,
        text: text.to_string(),
    }
}
