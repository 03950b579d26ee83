//! Resolution of patch-file target paths against the work directory.

use std::path::{Path, PathBuf};

use path_absolutize::Absolutize;
use tracing::warn;

/// Joins `relative` onto `work_dir` and normalises `.`/`..` lexically.
///
/// Returns `None` when the path is absolute or the result leaves `work_dir`.
pub fn resolve_in_work_dir(work_dir: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    if relative.is_absolute() || relative.has_root() {
        return None;
    }

    let root = match work_dir.absolutize() {
        Ok(root) => root.into_owned(),
        Err(err) => {
            warn!("cannot resolve work directory {}: {}", work_dir.display(), err);
            return None;
        }
    };
    let candidate = match root.join(relative).absolutize() {
        Ok(candidate) => candidate.into_owned(),
        Err(err) => {
            warn!("cannot resolve {}: {}", relative.display(), err);
            return None;
        }
    };

    if candidate.starts_with(&root) && candidate != root {
        Some(candidate)
    } else {
        None
    }
}
