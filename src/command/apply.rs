use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, bail};
use clap::Parser;
use colored::Colorize;
use tracing::info;

use crate::{
    internal::{
        config::{ColorChoice, load_config},
        patch::{BlockStatus, RunReport, apply_patch_file, parse_patch},
    },
    utils::diff::{colorize_diff, unified_diff},
};

#[derive(Parser, Debug)]
pub struct ApplyArgs {
    /// Root directory the target paths in the patch file are relative to
    pub work_dir: PathBuf,

    /// The `.smalipatch` file to apply
    pub patch_file: PathBuf,

    /// Report what would change without writing any file
    #[clap(short = 'n', long)]
    pub dry_run: bool,

    /// Print a unified diff of every changed file
    #[clap(short, long)]
    pub diff: bool,

    /// Stop after the first failed block
    #[clap(long)]
    pub fail_fast: bool,

    /// Config file to use instead of `<WORK_DIR>/.smalipatch.toml`
    #[clap(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// When to color the output
    #[clap(long, value_enum, value_name = "WHEN")]
    pub color: Option<ColorChoice>,
}

/// Runs one patch file against one work directory and prints the outcome to stdout.
///
/// Errors are fatal (bad arguments, unreadable or malformed patch file, bad config).
/// Block failures are not errors: they are in the returned report.
pub fn execute(args: ApplyArgs) -> anyhow::Result<RunReport> {
    if !args.work_dir.is_dir() {
        bail!("work directory {} is not a directory", args.work_dir.display());
    }
    let patch_text = fs::read_to_string(&args.patch_file)
        .with_context(|| format!("failed to read patch file {}", args.patch_file.display()))?;

    let mut config = load_config(args.config.as_deref(), &args.work_dir)?;
    // flags only switch options on
    config.dry_run |= args.dry_run;
    config.show_diff |= args.diff;
    config.fail_fast |= args.fail_fast;
    if let Some(color) = args.color {
        config.color = color;
    }

    let patch = parse_patch(&patch_text)
        .with_context(|| format!("invalid patch file {}", args.patch_file.display()))?;
    if patch.blocks.is_empty() {
        bail!("patch file {} contains no blocks", args.patch_file.display());
    }
    info!(
        "applying {} block(s) from {} to {}",
        patch.blocks.len(),
        args.patch_file.display(),
        args.work_dir.display()
    );

    let report = apply_patch_file(&patch, &args.work_dir, &config.apply_options());

    colored::control::set_override(config.color.should_color());
    print_report(&report, config.show_diff, &mut io::stdout().lock())
        .context("failed to write report")?;
    Ok(report)
}

/// Writes one line per block, the diffs when asked for, then the summary line.
pub fn print_report(report: &RunReport, show_diff: bool, w: &mut impl Write) -> io::Result<()> {
    for result in &report.results {
        let line = result.outcome_line();
        let line = match result.status {
            BlockStatus::Success => line.green(),
            BlockStatus::Skipped(_) => line.yellow(),
            BlockStatus::Failed(_) => line.red(),
        };
        writeln!(w, "{line}")?;
    }

    if show_diff {
        for change in &report.changes {
            let diff = unified_diff(&change.target_path, &change.original, &change.updated);
            write!(w, "{}", colorize_diff(&diff))?;
        }
    }

    let summary = report.summary_line();
    if report.is_success() {
        writeln!(w, "{}", summary.bold())
    } else {
        writeln!(w, "{}", summary.bold().red())
    }
}
