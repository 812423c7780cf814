//! `git2`-backed repository.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use git2::{ErrorCode, IndexAddOption, Repository, Signature, Status, StatusOptions};

use crate::author::Author;
use crate::vcs::{VcsError, VersionControl};

/// A non-bare git repository on disk.
///
/// The `git2` handle is not `Sync`, so it sits behind a mutex.
pub struct GitRepository {
    repo: Mutex<Repository>,
    workdir: PathBuf,
}

impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("workdir", &self.workdir)
            .finish_non_exhaustive()
    }
}

impl GitRepository {
    /// Open the repository whose working directory is `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, VcsError> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|e| match e.code() {
            ErrorCode::NotFound => VcsError::NotARepository(path.to_path_buf()),
            _ => VcsError::Git(e),
        })?;
        Self::from_repository(repo)
    }

    /// Create a new repository at `path`.
    pub fn init(path: impl AsRef<Path>) -> Result<Self, VcsError> {
        let repo = Repository::init(path.as_ref())?;
        tracing::info!(path = %path.as_ref().display(), "Initialized git repository");
        Self::from_repository(repo)
    }

    fn from_repository(repo: Repository) -> Result<Self, VcsError> {
        let workdir = repo.workdir().ok_or(VcsError::Bare)?.to_path_buf();
        Ok(Self {
            repo: Mutex::new(repo),
            workdir,
        })
    }

    /// Working directory of the repository.
    #[must_use]
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn lock(&self) -> Result<MutexGuard<'_, Repository>, VcsError> {
        self.repo
            .lock()
            .map_err(|_| VcsError::Other("repository lock poisoned".to_owned()))
    }
}

impl VersionControl for GitRepository {
    fn stage(&self, path: &str) -> Result<(), VcsError> {
        let repo = self.lock()?;
        let mut index = repo.index()?;
        index.add_all([path], IndexAddOption::DEFAULT, None)?;
        // `add_all` does not drop entries whose files are gone.
        index.update_all([path], None)?;
        index.write()?;
        tracing::debug!(path, "Staged");
        Ok(())
    }

    fn remove(&self, path: &str) -> Result<(), VcsError> {
        let repo = self.lock()?;
        let mut index = repo.index()?;
        index.remove_all([path], None)?;
        index.write()?;
        tracing::debug!(path, "Staged removal");
        Ok(())
    }

    fn commit(&self, message: &str, author: &Author) -> Result<String, VcsError> {
        let repo = self.lock()?;
        let mut index = repo.index()?;
        let tree = repo.find_tree(index.write_tree()?)?;
        let signature = Signature::now(&author.name, &author.email)?;

        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => None,
            Err(e) => return Err(e.into()),
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let oid = repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;
        Ok(oid.to_string())
    }

    fn status(&self) -> Result<Vec<String>, VcsError> {
        let repo = self.lock()?;
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = repo.statuses(Some(&mut options))?;
        let mut paths: Vec<String> = statuses
            .iter()
            .filter(|entry| entry.status() != Status::CURRENT)
            .filter_map(|entry| entry.path().map(str::to_owned))
            .collect();
        paths.sort();
        paths.dedup();
        Ok(paths)
    }
}
