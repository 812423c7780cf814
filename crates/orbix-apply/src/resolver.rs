//! App id to working-tree root resolution.

use std::path::PathBuf;

use orbix_config::AppsConfig;

use crate::error::ApplyError;

/// Maps an app id to the root directory of its working tree.
pub trait AppResolver: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ApplyError::Resolve`] if the app does not exist.
    fn app_root(&self, app_id: &str) -> Result<PathBuf, ApplyError>;
}

/// Apps live in `<apps.dir>/<app_id>`.
impl AppResolver for AppsConfig {
    fn app_root(&self, app_id: &str) -> Result<PathBuf, ApplyError> {
        let resolve_error = |reason: &str| ApplyError::Resolve {
            app_id: app_id.to_owned(),
            reason: reason.to_owned(),
        };

        if app_id.is_empty() || app_id == "." || app_id == ".." || app_id.contains(['/', '\\']) {
            return Err(resolve_error("app id must be a single path segment"));
        }

        let root = self.app_dir(app_id);
        if !root.is_dir() {
            return Err(resolve_error(&format!(
                "{} is not a directory",
                root.display()
            )));
        }
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_existing_app() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("todo")).unwrap();
        let apps = AppsConfig {
            dir: dir.path().to_path_buf(),
        };

        assert_eq!(apps.app_root("todo").unwrap(), dir.path().join("todo"));
    }

    #[test]
    fn test_missing_app() {
        let dir = tempfile::tempdir().unwrap();
        let apps = AppsConfig {
            dir: dir.path().to_path_buf(),
        };

        let err = apps.app_root("ghost").unwrap_err();

        assert!(matches!(err, ApplyError::Resolve { .. }));
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_rejects_escaping_ids() {
        let dir = tempfile::tempdir().unwrap();
        let apps = AppsConfig {
            dir: dir.path().join("apps"),
        };

        for id in ["", "..", "a/b", r"a\b"] {
            assert!(apps.app_root(id).is_err(), "{id}");
        }
    }
}
