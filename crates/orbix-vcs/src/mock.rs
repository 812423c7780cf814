//! Mock version control for testing.

use std::collections::HashSet;
use std::sync::RwLock;

use crate::author::Author;
use crate::vcs::{VcsError, VersionControl};

/// A recorded version-control call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    Stage(String),
    Remove(String),
    Commit { message: String, author: Author },
}

/// Version control that records calls instead of touching a repository.
///
/// Commits return deterministic fake hashes (`0000...0001`, `0000...0002`).
///
/// # Example
///
/// ```ignore
/// use orbix_vcs::{Author, MockVcs, VcsCall, VersionControl};
///
/// let vcs = MockVcs::new().with_status(["notes.md"]);
/// vcs.stage("src/a.ts").unwrap();
/// vcs.commit("msg", &Author::default()).unwrap();
/// assert_eq!(vcs.calls().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MockVcs {
    calls: RwLock<Vec<VcsCall>>,
    status: RwLock<Vec<String>>,
    failing_paths: RwLock<HashSet<String>>,
    fail_commit: RwLock<bool>,
}

impl MockVcs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths reported by [`status`](VersionControl::status).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_status<I, S>(self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.status.write().unwrap() = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Make staging or removing `path` fail.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failing_path(self, path: impl Into<String>) -> Self {
        self.failing_paths.write().unwrap().insert(path.into());
        self
    }

    /// Make every commit fail.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failing_commit(self) -> Self {
        *self.fail_commit.write().unwrap() = true;
        self
    }

    /// Successful calls in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<VcsCall> {
        self.calls.read().unwrap().clone()
    }

    /// Messages of recorded commits.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn commits(&self) -> Vec<String> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                VcsCall::Commit { message, .. } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn check_path(&self, path: &str) -> Result<(), VcsError> {
        if self.failing_paths.read().unwrap().contains(path) {
            return Err(VcsError::Other(format!("cannot update index for {path}")));
        }
        Ok(())
    }
}

impl VersionControl for MockVcs {
    fn stage(&self, path: &str) -> Result<(), VcsError> {
        self.check_path(path)?;
        self.calls
            .write()
            .unwrap()
            .push(VcsCall::Stage(path.to_owned()));
        Ok(())
    }

    fn remove(&self, path: &str) -> Result<(), VcsError> {
        self.check_path(path)?;
        self.calls
            .write()
            .unwrap()
            .push(VcsCall::Remove(path.to_owned()));
        Ok(())
    }

    fn commit(&self, message: &str, author: &Author) -> Result<String, VcsError> {
        if *self.fail_commit.read().unwrap() {
            return Err(VcsError::Other("commit rejected".to_owned()));
        }
        let mut calls = self.calls.write().unwrap();
        calls.push(VcsCall::Commit {
            message: message.to_owned(),
            author: author.clone(),
        });
        let count = calls
            .iter()
            .filter(|c| matches!(c, VcsCall::Commit { .. }))
            .count();
        Ok(format!("{count:040x}"))
    }

    fn status(&self) -> Result<Vec<String>, VcsError> {
        Ok(self.status.read().unwrap().clone())
    }
}
