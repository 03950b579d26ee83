//! Applies a parsed patch file to a work directory.
//!
//! Target files are processed in order of first reference. Each file is loaded once,
//! its blocks run in patch order with every outcome recorded independently, and the
//! file is written back once if at least one block succeeded.

use std::path::Path;

use tracing::{debug, info, warn};

use super::{
    error::BlockError,
    executor::{MethodInsert, insert_method, patch_method, replace_method},
    locator::{METHOD_END_MARKER, locate_method},
    parser::{Action, PatchBlock, PatchFile},
    report::{ApplyResult, BlockStatus, FileChange, RunReport},
    target::TargetFile,
};
use crate::utils::path::resolve_in_work_dir;

pub const CLASS_END_MARKER: &str = ".end class";

/// Knobs for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Compute everything, write nothing.
    pub dry_run: bool,
    /// Stop attempting blocks after the first failure.
    pub fail_fast: bool,
    pub method_end_marker: String,
    pub class_end_marker: String,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            fail_fast: false,
            method_end_marker: METHOD_END_MARKER.to_string(),
            class_end_marker: CLASS_END_MARKER.to_string(),
        }
    }
}

/// Applies every block of `patch` to files under `work_dir`.
///
/// Per-block and per-file failures never abort the run (unless `fail_fast` is set);
/// they are collected into the returned report.
pub fn apply_patch_file(patch: &PatchFile, work_dir: &Path, options: &ApplyOptions) -> RunReport {
    let mut report = RunReport {
        dry_run: options.dry_run,
        total_blocks: patch.blocks.len(),
        ..Default::default()
    };

    for target_path in patch.target_paths() {
        let blocks: Vec<(usize, &PatchBlock)> = patch
            .blocks
            .iter()
            .enumerate()
            .filter(|(_, block)| block.target_path == target_path)
            .collect();
        info!(
            "processing {} ({} block(s))",
            target_path,
            blocks.len()
        );

        let target = resolve_in_work_dir(work_dir, target_path)
            .ok_or_else(|| BlockError::PathOutsideWorkDir(target_path.to_string()))
            .and_then(TargetFile::load);
        let mut target = match target {
            Ok(target) => target,
            Err(err) => {
                warn!("skipping {}: {}", target_path, err);
                for (block_index, block) in &blocks {
                    push_result(&mut report, *block_index, block, BlockStatus::Failed(err.clone()));
                }
                if options.fail_fast {
                    report.stopped_early = report.results.len() < report.total_blocks;
                    break;
                }
                continue;
            }
        };

        let first_result = report.results.len();
        let mut stop = false;
        for (block_index, block) in &blocks {
            let status = apply_block(&mut target, block, options);
            let failed = matches!(status, BlockStatus::Failed(_));
            push_result(&mut report, *block_index, block, status);
            if failed && options.fail_fast {
                stop = true;
                break;
            }
        }

        if let Some(change) = write_back(
            &target,
            target_path,
            &mut report.results[first_result..],
            options.dry_run,
        ) {
            report.changes.push(change);
        }

        if stop {
            report.stopped_early = report.results.len() < report.total_blocks;
            break;
        }
    }

    report
}

/// Persists `target` when at least one of its blocks succeeded and its content changed.
///
/// A failed write turns every successful result of the file into `WriteFailed`.
fn write_back(
    target: &TargetFile,
    target_path: &str,
    file_results: &mut [ApplyResult],
    dry_run: bool,
) -> Option<FileChange> {
    if !file_results.iter().any(ApplyResult::is_success) || !target.is_modified() {
        return None;
    }
    let mut change = FileChange {
        target_path: target_path.to_string(),
        original: target.original_contents(),
        updated: target.contents(),
        written: false,
    };
    if dry_run {
        info!("dry run: not writing {}", target.path.display());
        return Some(change);
    }

    match target.persist() {
        Ok(()) => {
            debug!("wrote {}", target.path.display());
            change.written = true;
        }
        Err(err) => {
            warn!("{}", err);
            let write_failure = BlockError::WriteFailed {
                path: target.path.clone(),
                message: err.to_string(),
            };
            for result in file_results.iter_mut().filter(|r| r.is_success()) {
                result.status = BlockStatus::Failed(write_failure.clone());
            }
        }
    }
    Some(change)
}

fn push_result(report: &mut RunReport, block_index: usize, block: &PatchBlock, status: BlockStatus) {
    report.results.push(ApplyResult {
        target_path: block.target_path.clone(),
        block_index,
        action: block.action.kind(),
        status,
    });
}

fn apply_block(target: &mut TargetFile, block: &PatchBlock, options: &ApplyOptions) -> BlockStatus {
    match try_apply_block(target, block, options) {
        Ok(status) => status,
        Err(err) => {
            debug!("block at line {} failed: {}", block.line_number, err);
            BlockStatus::Failed(err)
        }
    }
}

fn try_apply_block(
    target: &mut TargetFile,
    block: &PatchBlock,
    options: &ApplyOptions,
) -> Result<BlockStatus, BlockError> {
    match &block.action {
        Action::CreateFile { content } => {
            if target.exists() {
                return Ok(BlockStatus::Skipped("file already exists".to_string()));
            }
            target.create(content);
        }
        _ if !target.exists() => {
            return Err(BlockError::FileNotFound(target.path.clone()));
        }
        Action::Replace { anchor, content } => {
            let span = locate_method(&target.lines, anchor, &options.method_end_marker)?;
            replace_method(&mut target.lines, span, content);
        }
        Action::Patch { anchor, lines } => {
            let span = locate_method(&target.lines, anchor, &options.method_end_marker)?;
            let stats = patch_method(&mut target.lines, span, lines)?;
            debug!("patched {}: +{} -{}", anchor, stats.added, stats.removed);
        }
        Action::CreateMethod { content } => {
            if insert_method(&mut target.lines, content, &options.class_end_marker)
                == MethodInsert::AlreadyPresent
            {
                return Ok(BlockStatus::Skipped("method already exists".to_string()));
            }
        }
    }
    Ok(BlockStatus::Success)
}
