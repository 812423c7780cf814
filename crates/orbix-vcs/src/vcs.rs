//! Version-control trait and error type.

use std::path::PathBuf;

use crate::author::Author;

/// Version-control error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum VcsError {
    /// No repository at the given path.
    #[error("No git repository at {}", .0.display())]
    NotARepository(PathBuf),
    /// Error reported by libgit2.
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
    /// Repository has no working directory.
    #[error("Repository is bare")]
    Bare,
    /// Backend-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Staging, committing and status of an app repository.
///
/// Paths are canonical relative paths from the repository root.
pub trait VersionControl: Send + Sync {
    /// Stage a file or directory as added or modified.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError`] if the index cannot be updated.
    fn stage(&self, path: &str) -> Result<(), VcsError>;

    /// Stage the removal of a file or directory.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError`] if the index cannot be updated.
    fn remove(&self, path: &str) -> Result<(), VcsError>;

    /// Commit the index and return the new commit's hash.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError`] if the commit cannot be created.
    fn commit(&self, message: &str, author: &Author) -> Result<String, VcsError>;

    /// Paths with uncommitted changes, untracked files included.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError`] if the status cannot be computed.
    fn status(&self) -> Result<Vec<String>, VcsError>;
}
