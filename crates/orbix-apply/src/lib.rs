//! Batch application of Orbix directives.
//!
//! Takes a finished assistant response, executes its write, rename, and
//! delete directives against an app's working tree, and records everything
//! in a single commit.
//!
//! ```ignore
//! use orbix_apply::{BatchApplier, CommitRequest};
//! use orbix_vcs::{Author, GitRepository};
//! use orbix_worktree::FsWorkTree;
//!
//! let tree = FsWorkTree::new("apps/todo");
//! let repo = GitRepository::open("apps/todo")?;
//! let author = Author::default();
//!
//! let result = BatchApplier::new(&tree, &repo, &author)
//!     .apply(response, &CommitRequest::default())?;
//! println!("{:?}", result.commit);
//! ```

mod error;
mod executor;
mod message;
mod resolver;
mod result;

use orbix_config::GitConfig;
use orbix_vcs::{Author, GitRepository};
use orbix_worktree::FsWorkTree;

pub use error::ApplyError;
pub use executor::BatchApplier;
pub use resolver::AppResolver;
pub use result::{BatchResult, ChangeCounts};

/// Caller-provided commit metadata.
#[derive(Debug, Clone, Default)]
pub struct CommitRequest {
    /// Commit subject. Falls back to the response's chat summary.
    pub summary: Option<String>,
    /// Chat message the batch belongs to, for logging.
    pub message_id: Option<i64>,
}

/// Apply `text` to the app named `app_id` using its on-disk git repository.
///
/// # Errors
///
/// Returns [`ApplyError::Resolve`] if the app does not exist and
/// [`ApplyError::Vcs`] if its repository cannot be opened or committed to.
pub fn apply_to_app(
    resolver: &dyn AppResolver,
    git: &GitConfig,
    app_id: &str,
    text: &str,
    request: &CommitRequest,
) -> Result<BatchResult, ApplyError> {
    let root = resolver.app_root(app_id)?;
    let tree = FsWorkTree::new(&root);
    let repo = GitRepository::open(&root)?;
    let author = Author::new(&git.author_name, &git.author_email);

    tracing::debug!(app_id, root = %root.display(), "Applying batch");
    BatchApplier::new(&tree, &repo, &author)
        .message_prefix(&git.message_prefix)
        .apply(text, request)
}
