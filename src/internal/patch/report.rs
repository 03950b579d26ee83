//! Per-block outcomes accumulated by the orchestrator.
//!
//! Nothing here prints: the report renders plain outcome lines and the caller decides
//! where they go (stdout, a test buffer).

use super::{error::BlockError, parser::ActionKind};

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum BlockStatus {
    Success,
    /// Nothing to do (file or method already present). Not a failure.
    Skipped(String),
    Failed(BlockError),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ApplyResult {
    /// Target path as written in the patch file.
    pub target_path: String,
    /// 0-based position of the block in the patch file.
    pub block_index: usize,
    pub action: ActionKind,
    pub status: BlockStatus,
}

impl ApplyResult {
    pub fn is_success(&self) -> bool {
        matches!(self.status, BlockStatus::Success)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, BlockStatus::Failed(_))
    }

    /// The line shown to the operator for this block.
    pub fn outcome_line(&self) -> String {
        let path = &self.target_path;
        let block = self.block_index + 1;
        match &self.status {
            BlockStatus::Success => match self.action {
                ActionKind::Replace => format!("SUCCESS: Replaced method in {path}"),
                ActionKind::Patch => format!("SUCCESS: Patched method in {path}"),
                ActionKind::CreateMethod => format!("SUCCESS: Added method to {path}"),
                ActionKind::CreateFile => format!("SUCCESS: Created file {path}"),
            },
            BlockStatus::Skipped(reason) => format!("SKIPPED: {reason} in {path} (block {block})"),
            BlockStatus::Failed(err) => format!("FAILED: {err} in {path} (block {block})"),
        }
    }
}

/// Content of a file before and after its blocks ran.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct FileChange {
    pub target_path: String,
    pub original: String,
    pub updated: String,
    /// False on dry runs and when persisting failed.
    pub written: bool,
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct RunReport {
    pub results: Vec<ApplyResult>,
    pub changes: Vec<FileChange>,
    pub dry_run: bool,
    /// Set when fail-fast stopped the run before every block was attempted.
    pub stopped_early: bool,
    /// Number of blocks in the patch file, attempted or not.
    pub total_blocks: usize,
}

impl RunReport {
    /// True when no block failed and every block was attempted.
    pub fn is_success(&self) -> bool {
        !self.stopped_early && self.failed_count() == 0
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_failure()).count()
    }

    pub fn applied_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_failure()).count()
    }

    pub fn outcome_lines(&self) -> Vec<String> {
        self.results.iter().map(ApplyResult::outcome_line).collect()
    }

    pub fn summary_line(&self) -> String {
        let mut summary = format!(
            "Result: {}/{} block(s) applied successfully.",
            self.applied_count(),
            self.total_blocks
        );
        let failed = self.failed_count();
        if failed > 0 {
            summary.push_str(&format!(" ({failed} failed)."));
        }
        if self.stopped_early {
            let not_run = self.total_blocks - self.results.len();
            summary.push_str(&format!(
                " Stopped after the first failure, {not_run} block(s) not attempted."
            ));
        }
        if self.dry_run {
            summary.push_str(" Dry run: no files were written.");
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(action: ActionKind, status: BlockStatus) -> ApplyResult {
        ApplyResult {
            target_path: "smali/com/android/server/SystemServer.smali".to_string(),
            block_index: 2,
            action,
            status,
        }
    }

    #[test]
    fn test_success_lines() {
        assert_eq!(
            result(ActionKind::Replace, BlockStatus::Success).outcome_line(),
            "SUCCESS: Replaced method in smali/com/android/server/SystemServer.smali"
        );
        assert_eq!(
            result(ActionKind::Patch, BlockStatus::Success).outcome_line(),
            "SUCCESS: Patched method in smali/com/android/server/SystemServer.smali"
        );
        assert_eq!(
            result(ActionKind::CreateMethod, BlockStatus::Success).outcome_line(),
            "SUCCESS: Added method to smali/com/android/server/SystemServer.smali"
        );
        assert_eq!(
            result(ActionKind::CreateFile, BlockStatus::Success).outcome_line(),
            "SUCCESS: Created file smali/com/android/server/SystemServer.smali"
        );
    }

    #[test]
    fn test_failure_and_skip_lines() {
        let failed = result(
            ActionKind::Replace,
            BlockStatus::Failed(BlockError::MethodNotFound(".method a()V".to_string())),
        );
        assert!(failed.is_failure());
        assert_eq!(
            failed.outcome_line(),
            "FAILED: method not found: .method a()V in smali/com/android/server/SystemServer.smali (block 3)"
        );

        let skipped = result(
            ActionKind::CreateFile,
            BlockStatus::Skipped("file already exists".to_string()),
        );
        assert!(!skipped.is_failure());
        assert!(!skipped.is_success());
        assert_eq!(
            skipped.outcome_line(),
            "SKIPPED: file already exists in smali/com/android/server/SystemServer.smali (block 3)"
        );
    }

    #[test]
    fn test_summary_line() {
        let mut report = RunReport {
            results: vec![
                result(ActionKind::Replace, BlockStatus::Success),
                result(
                    ActionKind::Patch,
                    BlockStatus::Failed(BlockError::MethodNotFound("x".to_string())),
                ),
            ],
            total_blocks: 2,
            ..Default::default()
        };
        assert!(!report.is_success());
        assert_eq!(
            report.summary_line(),
            "Result: 1/2 block(s) applied successfully. (1 failed)."
        );

        report.results.pop();
        report.total_blocks = 1;
        report.dry_run = true;
        assert!(report.is_success());
        assert_eq!(
            report.summary_line(),
            "Result: 1/1 block(s) applied successfully. Dry run: no files were written."
        );
    }
}
