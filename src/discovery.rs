//! Project root discovery with an explicit per-directory cache
//!
//! The project root is the nearest ancestor of the working directory
//! that contains a `changes/` directory. Callers hold a `RootCache`
//! value and pass it in; the cache is keyed by the working directory
//! and recomputed whenever that key changes. No process-global state.

use crate::error::ConvertError;
use std::path::{Path, PathBuf};

/// Directory that marks a project root and holds the change directories
pub const CHANGES_DIR: &str = "changes";

/// Walk ancestors of `cwd` looking for the project marker
pub fn find_project_root(cwd: &Path) -> Option<PathBuf> {
    cwd.ancestors()
        .find(|dir| dir.join(CHANGES_DIR).is_dir())
        .map(Path::to_path_buf)
}

/// Memoized root lookup, keyed by working directory
#[derive(Debug, Clone, Default)]
pub struct RootCache {
    key: Option<PathBuf>,
    root: Option<PathBuf>,
}

impl RootCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the project root for `cwd`, reusing the cached answer
    /// when the working directory has not changed.
    pub fn resolve(&mut self, cwd: &Path) -> Result<PathBuf, ConvertError> {
        if self.key.as_deref() != Some(cwd) {
            log::debug!("root cache miss for {}", cwd.display());
            self.key = Some(cwd.to_path_buf());
            self.root = find_project_root(cwd);
        }
        self.root.clone().ok_or_else(|| ConvertError::SourceNotFound {
            path: cwd.join(CHANGES_DIR),
        })
    }
}
