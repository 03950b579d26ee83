//! Optional TOML configuration for a patch run.
//!
//! Looked up at `--config <path>` when given, otherwise at `<work_dir>/.smalipatch.toml`.
//! Every key is optional; missing keys fall back to [`PatchConfig::default`].
//!
//! ```toml
//! method_end_marker = ".end method"
//! class_end_marker = ".end class"
//! dry_run = false
//! show_diff = true
//! fail_fast = false
//! color = "auto"
//! ```

use std::{
    fs,
    io::{self, IsTerminal},
    path::Path,
};

use anyhow::Context;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::internal::patch::{
    ApplyOptions, locator::METHOD_END_MARKER, orchestrator::CLASS_END_MARKER,
};

pub const DEFAULT_CONFIG_FILE: &str = ".smalipatch.toml";

#[derive(Clone, Copy, Debug, Deserialize, Serialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn should_color(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => io::stdout().is_terminal(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PatchConfig {
    pub method_end_marker: String,
    pub class_end_marker: String,
    pub dry_run: bool,
    pub show_diff: bool,
    pub fail_fast: bool,
    pub color: ColorChoice,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            method_end_marker: METHOD_END_MARKER.to_string(),
            class_end_marker: CLASS_END_MARKER.to_string(),
            dry_run: false,
            show_diff: false,
            fail_fast: false,
            color: ColorChoice::Auto,
        }
    }
}

impl PatchConfig {
    pub fn apply_options(&self) -> ApplyOptions {
        ApplyOptions {
            dry_run: self.dry_run,
            fail_fast: self.fail_fast,
            method_end_marker: self.method_end_marker.clone(),
            class_end_marker: self.class_end_marker.clone(),
        }
    }
}

/// Loads the run configuration.
///
/// An explicit path must exist. The default file in `work_dir` is optional. A file that
/// exists but does not parse is an error either way.
pub fn load_config(explicit: Option<&Path>, work_dir: &Path) -> anyhow::Result<PatchConfig> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (work_dir.join(DEFAULT_CONFIG_FILE), false),
    };

    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if !required && err.kind() == io::ErrorKind::NotFound => {
            debug!("no config at {}, using defaults", path.display());
            return Ok(PatchConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config {}", path.display()));
        }
    };

    let config: PatchConfig = toml::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    anyhow::ensure!(
        !config.method_end_marker.trim().is_empty(),
        "config {}: method_end_marker must not be empty",
        path.display()
    );
    anyhow::ensure!(
        !config.class_end_marker.trim().is_empty(),
        "config {}: class_end_marker must not be empty",
        path.display()
    );
    debug!("loaded config from {}: {:?}", path.display(), config);
    Ok(config)
}
