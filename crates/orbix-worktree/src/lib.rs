//! Working-tree abstraction for Orbix apps.
//!
//! The batch applier mutates an app's files only through the [`WorkTree`]
//! trait, so the same pipeline runs against the real filesystem and against
//! an in-memory tree in tests.
//!
//! - [`WorkTree`] with `ensure_dir()`, `write_file()`, `rename()`, `remove()`
//!   and `exists()` on canonical relative paths
//! - [`FsWorkTree`] rooted at an app directory
//! - [`MockWorkTree`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use orbix_worktree::{FsWorkTree, WorkTree};
//!
//! let tree = FsWorkTree::new("apps/todo");
//! tree.ensure_dir("src/components")?;
//! tree.write_file("src/components/Todo.tsx", "export {}")?;
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod worktree;

pub use fs::FsWorkTree;
#[cfg(feature = "mock")]
pub use mock::{MockWorkTree, WorkTreeOp};
pub use worktree::{WorkTree, WorkTreeError, WorkTreeErrorKind, parent_dir};
