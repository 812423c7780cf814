//! Error types for batch application.

use orbix_vcs::VcsError;
use orbix_worktree::WorkTreeError;

/// Error that aborts a batch.
///
/// Working-tree failures do not appear here: they stop the batch but are
/// reported in [`BatchResult::error`](crate::BatchResult::error) so that
/// earlier changes can still be committed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApplyError {
    /// The app id does not name an app directory.
    #[error("Cannot resolve app '{app_id}': {reason}")]
    Resolve {
        /// Requested app id.
        app_id: String,
        /// Why resolution failed.
        reason: String,
    },

    /// Staging or committing failed.
    #[error("Version control error: {0}")]
    Vcs(#[from] VcsError),
}

/// Failure of a single directive step.
#[derive(Debug)]
pub(crate) enum StepError {
    Fs(WorkTreeError),
    Vcs(VcsError),
}

impl From<WorkTreeError> for StepError {
    fn from(err: WorkTreeError) -> Self {
        Self::Fs(err)
    }
}

impl From<VcsError> for StepError {
    fn from(err: VcsError) -> Self {
        Self::Vcs(err)
    }
}
