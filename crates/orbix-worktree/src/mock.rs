//! Mock working tree for testing.
//!
//! Provides [`MockWorkTree`] for unit testing without filesystem access.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::RwLock;

use crate::worktree::{WorkTree, WorkTreeError, WorkTreeErrorKind, parent_dir, validate_path};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// A recorded working-tree operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkTreeOp {
    EnsureDir(String),
    Write { path: String, contents: String },
    Rename { from: String, to: String },
    Remove(String),
}

/// In-memory working tree.
///
/// Files live in a map keyed by path; directories are implied by file paths
/// or created explicitly. Every successful mutation is appended to an
/// operation log.
///
/// # Example
///
/// ```ignore
/// use orbix_worktree::{MockWorkTree, WorkTree};
///
/// let tree = MockWorkTree::new()
///     .with_file("src/old.ts", "x")
///     .with_failure("src/locked.ts");
///
/// tree.rename("src/old.ts", "src/new.ts").unwrap();
/// assert!(tree.write_file("src/locked.ts", "y").is_err());
/// ```
#[derive(Debug, Default)]
pub struct MockWorkTree {
    files: RwLock<BTreeMap<String, String>>,
    dirs: RwLock<BTreeSet<String>>,
    failures: RwLock<HashSet<String>>,
    ops: RwLock<Vec<WorkTreeOp>>,
}

impl MockWorkTree {
    /// Create a new empty mock tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.files
            .write()
            .unwrap()
            .insert(path.into(), contents.into());
        self
    }

    /// Add an empty directory.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_dir(self, path: impl Into<String>) -> Self {
        self.dirs.write().unwrap().insert(path.into());
        self
    }

    /// Make every mutation touching `path` fail with a permission error.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, path: impl Into<String>) -> Self {
        self.failures.write().unwrap().insert(path.into());
        self
    }

    /// Contents of a file, if present.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<String> {
        self.files.read().unwrap().get(path).cloned()
    }

    /// All file paths, sorted.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.files.read().unwrap().keys().cloned().collect()
    }

    /// Successful operations in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn ops(&self) -> Vec<WorkTreeOp> {
        self.ops.read().unwrap().clone()
    }

    fn check(&self, path: &str, allow_root: bool) -> Result<(), WorkTreeError> {
        validate_path(path, allow_root, BACKEND)?;
        if self.failures.read().unwrap().contains(path) {
            return Err(WorkTreeError::new(WorkTreeErrorKind::PermissionDenied)
                .with_path(path)
                .with_backend(BACKEND));
        }
        Ok(())
    }

    fn record(&self, op: WorkTreeOp) {
        self.ops.write().unwrap().push(op);
    }

    fn is_dir(&self, path: &str) -> bool {
        if path.is_empty() {
            return true;
        }
        let prefix = format!("{path}/");
        self.dirs
            .read()
            .unwrap()
            .iter()
            .any(|d| d == path || d.starts_with(&prefix))
            || self
                .files
                .read()
                .unwrap()
                .keys()
                .any(|f| f.starts_with(&prefix))
    }

    fn not_found(path: &str) -> WorkTreeError {
        WorkTreeError::new(WorkTreeErrorKind::NotFound)
            .with_path(path)
            .with_backend(BACKEND)
    }
}

/// Rebase `path` from under `from` to under `to`, if it lies below `from`.
fn rebase(path: &str, from: &str, to: &str) -> Option<String> {
    path.strip_prefix(from)
        .and_then(|rest| rest.strip_prefix('/'))
        .map(|rest| format!("{to}/{rest}"))
}

impl WorkTree for MockWorkTree {
    fn ensure_dir(&self, path: &str) -> Result<(), WorkTreeError> {
        self.check(path, true)?;
        if !path.is_empty() {
            self.dirs.write().unwrap().insert(path.to_owned());
        }
        self.record(WorkTreeOp::EnsureDir(path.to_owned()));
        Ok(())
    }

    fn write_file(&self, path: &str, contents: &str) -> Result<(), WorkTreeError> {
        self.check(path, false)?;
        if !self.is_dir(parent_dir(path)) {
            return Err(Self::not_found(path));
        }
        self.files
            .write()
            .unwrap()
            .insert(path.to_owned(), contents.to_owned());
        self.record(WorkTreeOp::Write {
            path: path.to_owned(),
            contents: contents.to_owned(),
        });
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), WorkTreeError> {
        self.check(from, false)?;
        self.check(to, false)?;
        if !self.exists(from) {
            return Err(Self::not_found(from));
        }
        if !self.is_dir(parent_dir(to)) {
            return Err(Self::not_found(to));
        }

        {
            let mut files = self.files.write().unwrap();
            if let Some(contents) = files.remove(from) {
                files.insert(to.to_owned(), contents);
            }
            let moved: Vec<String> = files
                .keys()
                .filter(|p| rebase(p, from, to).is_some())
                .cloned()
                .collect();
            for old in moved {
                if let (Some(new), Some(contents)) = (rebase(&old, from, to), files.remove(&old)) {
                    files.insert(new, contents);
                }
            }
        }
        {
            let mut dirs = self.dirs.write().unwrap();
            let moved: Vec<String> = dirs
                .iter()
                .filter(|d| *d == from || rebase(d, from, to).is_some())
                .cloned()
                .collect();
            for old in moved {
                dirs.remove(&old);
                dirs.insert(rebase(&old, from, to).unwrap_or_else(|| to.to_owned()));
            }
        }

        self.record(WorkTreeOp::Rename {
            from: from.to_owned(),
            to: to.to_owned(),
        });
        Ok(())
    }

    fn remove(&self, path: &str) -> Result<(), WorkTreeError> {
        self.check(path, false)?;
        if !self.exists(path) {
            return Err(Self::not_found(path));
        }

        let prefix = format!("{path}/");
        self.files
            .write()
            .unwrap()
            .retain(|p, _| p != path && !p.starts_with(&prefix));
        self.dirs
            .write()
            .unwrap()
            .retain(|d| d != path && !d.starts_with(&prefix));

        self.record(WorkTreeOp::Remove(path.to_owned()));
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        validate_path(path, true, BACKEND).is_ok()
            && (self.files.read().unwrap().contains_key(path) || self.is_dir(path))
    }
}
