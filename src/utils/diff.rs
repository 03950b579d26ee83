//! Unified diff rendering for files touched by a run.

use colored::Colorize;

/// Unified diff of `original` -> `updated`, with `a/<path>` and `b/<path>` headers.
pub fn unified_diff(path: &str, original: &str, updated: &str) -> String {
    let patch = diffy::create_patch(original, updated).to_string();
    // drop diffy's own "--- original" / "+++ modified" header lines
    let hunks = patch
        .split_once('\n')
        .and_then(|(_, rest)| rest.split_once('\n'))
        .map(|(_, rest)| rest)
        .unwrap_or_default();
    format!("--- a/{path}\n+++ b/{path}\n{hunks}")
}

pub fn colorize_diff(diff_text: &str) -> String {
    let mut output = String::with_capacity(diff_text.len() + 500);

    for line in diff_text.lines() {
        let colored_line = if line.starts_with("---") || line.starts_with("+++") {
            line.bold().to_string()
        } else if line.starts_with("@@") {
            line.cyan().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else if line.starts_with('+') {
            line.green().to_string()
        } else {
            line.to_string()
        };

        output.push_str(&colored_line);
        output.push('\n');
    }
    output
}
