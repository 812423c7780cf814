//! Filesystem working tree.

use std::fs;
use std::path::{Path, PathBuf};

use crate::worktree::{WorkTree, WorkTreeError, validate_path};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Working tree backed by a directory on disk.
///
/// Relative paths are joined onto the root; error paths stay relative so
/// messages match the directive that caused them.
#[derive(Debug, Clone)]
pub struct FsWorkTree {
    root: PathBuf,
}

impl FsWorkTree {
    /// Create a working tree rooted at `root`. The directory is not created.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str, allow_root: bool) -> Result<PathBuf, WorkTreeError> {
        validate_path(path, allow_root, BACKEND)?;
        Ok(self.root.join(path))
    }

    fn io_error(err: std::io::Error, path: &str) -> WorkTreeError {
        WorkTreeError::io(err, path).with_backend(BACKEND)
    }
}

impl WorkTree for FsWorkTree {
    fn ensure_dir(&self, path: &str) -> Result<(), WorkTreeError> {
        let full = self.resolve(path, true)?;
        fs::create_dir_all(&full).map_err(|e| Self::io_error(e, path))
    }

    fn write_file(&self, path: &str, contents: &str) -> Result<(), WorkTreeError> {
        let full = self.resolve(path, false)?;
        tracing::debug!(path, bytes = contents.len(), "Writing file");
        fs::write(&full, contents).map_err(|e| Self::io_error(e, path))
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), WorkTreeError> {
        let source = self.resolve(from, false)?;
        let target = self.resolve(to, false)?;
        tracing::debug!(from, to, "Renaming");
        fs::rename(&source, &target).map_err(|e| Self::io_error(e, from))
    }

    fn remove(&self, path: &str) -> Result<(), WorkTreeError> {
        let full = self.resolve(path, false)?;
        let meta = fs::symlink_metadata(&full).map_err(|e| Self::io_error(e, path))?;

        tracing::debug!(path, dir = meta.is_dir(), "Removing");
        let result = if meta.is_dir() {
            fs::remove_dir_all(&full)
        } else {
            fs::remove_file(&full)
        };
        result.map_err(|e| Self::io_error(e, path))
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path, true).is_ok_and(|full| full.exists())
    }
}
