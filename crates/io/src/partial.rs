//! Write-then-rename handling for output files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::IoError;

/// Suffix appended to the target file name while it is being written.
pub const PARTIAL_SUFFIX: &str = ".partial";

/// A temporary sibling of an output file that replaces the target only when
/// committed. Dropping an uncommitted `PartialFile` removes the temporary.
#[derive(Debug)]
pub(crate) struct PartialFile {
    target: PathBuf,
    partial: PathBuf,
    committed: bool,
}

impl PartialFile {
    /// Prepare `<target>.partial`, creating the parent directory and removing
    /// any stale temporary from an earlier run.
    pub(crate) fn new(target: &Path) -> Result<Self, IoError> {
        let file_name = target
            .file_name()
            .ok_or_else(|| IoError::Filesystem {
                path: target.to_path_buf(),
                reason: "output path has no file name".to_string(),
            })?
            .to_string_lossy()
            .into_owned();
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| IoError::Filesystem {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })?;
        }
        let partial = target.with_file_name(format!("{file_name}{PARTIAL_SUFFIX}"));
        if partial.exists() {
            debug!(path = %partial.display(), "removing stale partial file");
            fs::remove_file(&partial).map_err(|e| IoError::Filesystem {
                path: partial.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(Self {
            target: target.to_path_buf(),
            partial,
            committed: false,
        })
    }

    /// Path being written.
    pub(crate) fn path(&self) -> &Path {
        &self.partial
    }

    /// Final destination.
    pub(crate) fn target(&self) -> &Path {
        &self.target
    }

    /// Move the temporary over the target, replacing any existing file.
    pub(crate) fn commit(mut self) -> Result<PathBuf, IoError> {
        fs::rename(&self.partial, &self.target).map_err(|e| IoError::Filesystem {
            path: self.target.clone(),
            reason: e.to_string(),
        })?;
        self.committed = true;
        Ok(self.target.clone())
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.committed || !self.partial.exists() {
            return;
        }
        if let Err(e) = fs::remove_file(&self.partial) {
            warn!(path = %self.partial.display(), error = %e, "failed to remove partial file");
        }
    }
}
