//! Version control for Orbix apps.
//!
//! The batch applier records its changes through the [`VersionControl`]
//! trait: paths are staged as added or removed and then committed together
//! with an [`Author`] supplied by an [`AuthorProvider`].
//!
//! - [`GitRepository`] implements the trait with `git2`, without spawning
//!   `git` subprocesses
//! - [`MockVcs`] records calls for testing (behind `mock` feature flag)

mod author;
mod git;
#[cfg(feature = "mock")]
mod mock;
mod vcs;

pub use author::{Author, AuthorProvider};
pub use git::GitRepository;
#[cfg(feature = "mock")]
pub use mock::{MockVcs, VcsCall};
pub use vcs::{VcsError, VersionControl};
