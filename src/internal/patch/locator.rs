//! Method lookup inside a target file.
//!
//! Scans from the top for the first line whose trimmed text equals or starts with the
//! anchor, then forward for the first line equal to the method end marker. Methods in
//! disassembled class files never nest, so no depth tracking is needed.
//!
//! When an anchor is a prefix of several declarations (`.method a` also matches
//! `.method abc()V`) the first one in the file wins.

use super::error::BlockError;

/// Default terminator of a method body in smali.
pub const METHOD_END_MARKER: &str = ".end method";

/// Inclusive line range of a method, from its declaration to its end marker.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct MethodSpan {
    pub start: usize,
    pub end: usize,
}

impl MethodSpan {
    pub fn line_count(&self) -> usize {
        self.end - self.start + 1
    }
}

pub fn locate_method(
    lines: &[String],
    anchor: &str,
    end_marker: &str,
) -> Result<MethodSpan, BlockError> {
    let anchor = anchor.trim();
    let Some(start) = lines.iter().position(|line| line.trim().starts_with(anchor)) else {
        return Err(BlockError::MethodNotFound(anchor.to_string()));
    };

    match lines[start + 1..]
        .iter()
        .position(|line| line.trim() == end_marker)
    {
        Some(offset) => Ok(MethodSpan {
            start,
            end: start + 1 + offset,
        }),
        None => Err(BlockError::MethodEndMissing {
            anchor: anchor.to_string(),
            start_line: start + 1,
            end_marker: end_marker.to_string(),
        }),
    }
}

/// Whether some line of the file equals `declaration`, ignoring surrounding whitespace.
pub(crate) fn contains_declaration(lines: &[String], declaration: &str) -> bool {
    let declaration = declaration.trim();
    !declaration.is_empty() && lines.iter().any(|line| line.trim() == declaration)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_vec(strings: &[&str]) -> Vec<String> {
        strings.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> Vec<String> {
        to_vec(&[
            ".class public Lcom/example/Foo;",
            ".super Ljava/lang/Object;",
            "",
            ".method public constructor <init>()V",
            "    .registers 1",
            "    return-void",
            ".end method",
            "",
            ".method private methodOne()V",
            "    .registers 2",
            "    return-void",
            ".end method",
        ])
    }

    #[test]
    fn test_locate_exact_anchor() {
        assert_eq!(
            locate_method(&sample(), ".method private methodOne()V", METHOD_END_MARKER),
            Ok(MethodSpan { start: 8, end: 11 })
        );
    }

    #[test]
    fn test_locate_prefix_anchor_first_match_wins() {
        let span = locate_method(&sample(), ".method", METHOD_END_MARKER).unwrap();
        assert_eq!(span, MethodSpan { start: 3, end: 6 });
        assert_eq!(span.line_count(), 4);
    }

    #[test]
    fn test_locate_ignores_surrounding_whitespace() {
        let mut lines = sample();
        lines[8] = "  .method private methodOne()V   ".to_string();
        lines[11] = ".end method  ".to_string();
        assert_eq!(
            locate_method(&lines, ".method private methodOne()V  ", METHOD_END_MARKER),
            Ok(MethodSpan { start: 8, end: 11 })
        );
    }

    #[test]
    fn test_locate_missing_anchor() {
        assert_eq!(
            locate_method(&sample(), ".method private methodTwo()V", METHOD_END_MARKER),
            Err(BlockError::MethodNotFound(
                ".method private methodTwo()V".to_string()
            ))
        );
        assert!(locate_method(&[], ".method", METHOD_END_MARKER).is_err());
    }

    #[test]
    fn test_locate_missing_end_marker() {
        let mut lines = sample();
        lines.pop();
        assert_eq!(
            locate_method(&lines, ".method private methodOne()V", METHOD_END_MARKER),
            Err(BlockError::MethodEndMissing {
                anchor: ".method private methodOne()V".to_string(),
                start_line: 9,
                end_marker: METHOD_END_MARKER.to_string(),
            })
        );
    }

    #[test]
    fn test_locate_custom_end_marker() {
        let lines = to_vec(&["func a", "  body", "endfunc"]);
        assert_eq!(
            locate_method(&lines, "func a", "endfunc"),
            Ok(MethodSpan { start: 0, end: 2 })
        );
    }

    #[test]
    fn test_contains_declaration() {
        assert!(contains_declaration(&sample(), ".method private methodOne()V"));
        assert!(!contains_declaration(&sample(), ".method private methodTwo()V"));
        assert!(!contains_declaration(&sample(), "   "));
    }
}
