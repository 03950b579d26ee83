//! CLI entry for smalipatch: argument definitions and dispatch to the apply command.

use clap::{ArgAction, Parser};

use crate::{
    command::{self, apply::ApplyArgs},
    internal::patch::RunReport,
};

// The Cli struct represents the root of the command line interface.
#[derive(Parser, Debug)]
#[command(
    name = "smalipatch",
    about = "Apply .smalipatch files to disassembled smali sources",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub apply: ApplyArgs,

    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Parses the command-line arguments and runs the patch.
/// - `args`: parse from command line if it's `None`, otherwise parse from the given args
pub fn parse(args: Option<&[&str]>) -> anyhow::Result<RunReport> {
    let cli = match args {
        Some(args) => Cli::try_parse_from(args)?,
        None => Cli::parse(),
    };
    execute(cli)
}

pub fn execute(cli: Cli) -> anyhow::Result<RunReport> {
    command::apply::execute(cli.apply)
}

/// this test is to verify that the CLI can be built without panicking
/// according [clap dock](https://docs.rs/clap/latest/clap/_derive/_tutorial/chapter_4/index.html)
#[test]
fn verify_cli() {
    use clap::CommandFactory;

    Cli::command().debug_assert()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_count() {
        let cli = Cli::try_parse_from(["smalipatch", "-vv", "work", "p.smalipatch"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.apply.work_dir.to_str(), Some("work"));
    }

    #[test]
    fn test_parse_rejects_missing_work_dir() {
        let err = parse(Some(&["smalipatch", "/nonexistent/work/dir", "p.smalipatch"]))
            .unwrap_err();
        assert!(err.to_string().contains("is not a directory"));
    }
}
