//! Result types for batch application.

use serde::Serialize;

/// Number of executed directives per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeCounts {
    pub written: usize,
    pub renamed: usize,
    pub deleted: usize,
    /// Renames and deletes skipped because the source did not exist.
    pub skipped: usize,
}

impl ChangeCounts {
    /// Number of executed file mutations.
    #[must_use]
    pub fn total(&self) -> usize {
        self.written + self.renamed + self.deleted
    }
}

/// Outcome of applying one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    /// A commit was created.
    pub updated_files: bool,
    /// Hash of the created commit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    /// Changed files not produced by the batch, folded into the commit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_files: Option<Vec<String>>,
    /// Why extra files could not be staged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_files_error: Option<String>,
    /// Working-tree failure that stopped the batch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Packages requested by `Orbix-add-dependency`, left to the installer.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    pub counts: ChangeCounts,
}
