//! Line-level mutations of a loaded target file.
//!
//! All three operations work on an index-addressable `Vec<String>` and change it with a
//! single `splice`, so the length delta of each edit is explicit:
//!
//! * [`replace_method`]: `len(content) - span.line_count()`
//! * [`patch_method`]: `#add - #remove`
//! * [`insert_method`]: `len(content)` plus an optional blank separator line
//!
//! [`patch_method`] edits a copy of the method and splices it back only once every
//! tagged line has been consumed, so a failed patch leaves the file untouched.

use tracing::{debug, trace};

use super::{
    error::BlockError,
    locator::{MethodSpan, contains_declaration},
    parser::{LineKind, TaggedLine},
};

/// Swaps every line of `span` for `content`. The patch author supplies the declaration
/// and end marker lines, so nothing is validated here.
pub fn replace_method(lines: &mut Vec<String>, span: MethodSpan, content: &[String]) {
    debug!(
        "replacing lines {}..={} with {} line(s)",
        span.start + 1,
        span.end + 1,
        content.len()
    );
    lines.splice(span.start..=span.end, content.iter().cloned());
}

/// Counts of lines touched by a successful [`patch_method`].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct PatchStats {
    pub added: usize,
    pub removed: usize,
}

/// Applies context/add/remove lines in order inside `span`.
///
/// The first context or remove line aligns the cursor: it is looked up exactly inside
/// the method, starting at the declaration. From there on every line is matched
/// strictly at the cursor with no skipping. A block made only of additions inserts
/// right after the declaration line.
pub fn patch_method(
    lines: &mut Vec<String>,
    span: MethodSpan,
    edits: &[TaggedLine],
) -> Result<PatchStats, BlockError> {
    let mut method: Vec<String> = lines[span.start..=span.end].to_vec();
    let mut cursor = align_cursor(&method, edits);
    let mut stats = PatchStats::default();

    for edit in edits {
        // 1-based line in the file as it looks with the edits made so far
        let line_number = span.start + cursor + 1;
        let Some(current) = method.get(cursor) else {
            return Err(BlockError::OutOfMethodBounds { line_number });
        };

        match edit.kind {
            LineKind::Context => {
                if *current != edit.text {
                    return Err(BlockError::ContextMismatch {
                        line_number,
                        expected: edit.text.clone(),
                        found: current.clone(),
                    });
                }
                cursor += 1;
            }
            LineKind::Remove => {
                if *current != edit.text {
                    return Err(BlockError::RemoveMismatch {
                        line_number,
                        expected: edit.text.clone(),
                        found: current.clone(),
                    });
                }
                method.remove(cursor);
                stats.removed += 1;
            }
            LineKind::Add => {
                method.insert(cursor, edit.text.clone());
                cursor += 1;
                stats.added += 1;
            }
        }
        trace!("{:?} '{}' -> cursor {}", edit.kind, edit.text, cursor);
    }

    lines.splice(span.start..=span.end, method);
    Ok(stats)
}

/// Cursor position inside the copied method where the first edit applies.
fn align_cursor(method: &[String], edits: &[TaggedLine]) -> usize {
    let Some(leading_adds) = edits.iter().position(|edit| edit.kind != LineKind::Add) else {
        return 1;
    };
    let first_match = &edits[leading_adds];
    // Nothing matches: start at the declaration so the first check reports the mismatch.
    let Some(anchor) = method.iter().position(|line| *line == first_match.text) else {
        return 0;
    };
    debug!(
        "patch aligned at method line {} ({} leading addition(s))",
        anchor + 1,
        leading_adds
    );
    anchor
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MethodInsert {
    Inserted { at: usize },
    AlreadyPresent,
}

/// Inserts `content` as a new method before the last `class_end_marker` line, or at the
/// end of the file when there is none. Skips the insert when the declaration (first
/// non-blank content line) is already in the file.
pub fn insert_method(
    lines: &mut Vec<String>,
    content: &[String],
    class_end_marker: &str,
) -> MethodInsert {
    if let Some(declaration) = content.iter().find(|line| !line.trim().is_empty())
        && contains_declaration(lines, declaration)
    {
        return MethodInsert::AlreadyPresent;
    }

    let at = lines
        .iter()
        .rposition(|line| line.trim() == class_end_marker)
        .unwrap_or(lines.len());

    let mut new_content = Vec::with_capacity(content.len() + 1);
    if at > 0 && !lines[at - 1].trim().is_empty() {
        new_content.push(String::new());
    }
    new_content.extend(content.iter().cloned());

    debug!("inserting new method before line {}", at + 1);
    lines.splice(at..at, new_content);
    MethodInsert::Inserted { at }
}
