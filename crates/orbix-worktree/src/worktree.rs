//! Working-tree trait and error types.
//!
//! # Path Convention
//!
//! All path parameters are canonical relative paths: `/` separated, no `.`
//! segments, no trailing separator (e.g. `"src/components/Todo.tsx"`). The
//! empty path denotes the tree root and is only accepted by
//! [`WorkTree::ensure_dir`]. Absolute paths and `..` segments are rejected
//! with [`WorkTreeErrorKind::InvalidPath`].

use std::path::PathBuf;

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum WorkTreeErrorKind {
    /// Resource does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Resource already exists.
    AlreadyExists,
    /// Path is empty, absolute or escapes the tree.
    InvalidPath,
    /// Other/unknown error category.
    Other,
}

/// Working-tree error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct WorkTreeError {
    /// Semantic error category.
    pub kind: WorkTreeErrorKind,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl WorkTreeError {
    #[must_use]
    pub fn new(kind: WorkTreeErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create an invalid path error.
    #[must_use]
    pub fn invalid_path(path: impl Into<PathBuf>) -> Self {
        Self::new(WorkTreeErrorKind::InvalidPath).with_path(path)
    }

    /// Create a working-tree error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => WorkTreeErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => WorkTreeErrorKind::PermissionDenied,
            std::io::ErrorKind::AlreadyExists => WorkTreeErrorKind::AlreadyExists,
            _ => WorkTreeErrorKind::Other,
        };
        Self::new(kind).with_path(path).with_source(err)
    }
}

impl std::fmt::Display for WorkTreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: src/a.ts)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            WorkTreeErrorKind::NotFound => "Not found",
            WorkTreeErrorKind::PermissionDenied => "Permission denied",
            WorkTreeErrorKind::AlreadyExists => "Already exists",
            WorkTreeErrorKind::InvalidPath => "Invalid path",
            WorkTreeErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for WorkTreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Filesystem primitives on an app's working tree.
///
/// Implementations resolve paths against their own root and reject paths
/// that would escape it.
pub trait WorkTree: Send + Sync {
    /// Create a directory and all of its parents. Existing directories are fine.
    ///
    /// # Errors
    ///
    /// Returns [`WorkTreeError`] if the path is invalid or creation fails.
    fn ensure_dir(&self, path: &str) -> Result<(), WorkTreeError>;

    /// Create or replace a file with `contents`.
    ///
    /// The parent directory must exist.
    ///
    /// # Errors
    ///
    /// Returns [`WorkTreeError`] if the path is invalid or the write fails.
    fn write_file(&self, path: &str, contents: &str) -> Result<(), WorkTreeError>;

    /// Move a file or directory. The destination's parent must exist.
    ///
    /// # Errors
    ///
    /// Returns [`WorkTreeError`] if either path is invalid or the move fails.
    fn rename(&self, from: &str, to: &str) -> Result<(), WorkTreeError>;

    /// Delete a file, or a directory with everything below it.
    ///
    /// # Errors
    ///
    /// Returns [`WorkTreeError`] if the path is invalid or removal fails.
    fn remove(&self, path: &str) -> Result<(), WorkTreeError>;

    /// Check if a file or directory exists. Invalid paths never exist.
    fn exists(&self, path: &str) -> bool;
}

/// Parent directory of a canonical relative path (`""` for top-level entries).
///
/// ```
/// use orbix_worktree::parent_dir;
///
/// assert_eq!(parent_dir("src/components/Todo.tsx"), "src/components");
/// assert_eq!(parent_dir("README.md"), "");
/// ```
#[must_use]
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(parent, _)| parent)
}

/// Reject paths that are absolute or contain `..`; empty paths unless `allow_root`.
pub(crate) fn validate_path(
    path: &str,
    allow_root: bool,
    backend: &'static str,
) -> Result<(), WorkTreeError> {
    let invalid = (path.is_empty() && !allow_root)
        || path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|segment| segment == "..");

    if invalid {
        return Err(WorkTreeError::invalid_path(path).with_backend(backend));
    }
    Ok(())
}
