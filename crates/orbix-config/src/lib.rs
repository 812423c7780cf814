//! Configuration management for Orbix.
//!
//! Parses `orbix.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `apps.dir`
//! - `git.author_name`
//! - `git.author_email`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the apps directory.
    pub apps_dir: Option<PathBuf>,
    /// Override the commit author name.
    pub author_name: Option<String>,
    /// Override the commit author email.
    pub author_email: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "orbix.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Apps configuration (paths are relative strings from TOML).
    apps: AppsConfigRaw,
    /// Commit configuration.
    pub git: GitConfig,

    /// Resolved apps configuration (set after loading).
    #[serde(skip)]
    pub apps_resolved: AppsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw apps configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AppsConfigRaw {
    dir: Option<String>,
}

/// Resolved apps configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AppsConfig {
    /// Directory holding one working tree per app, named by app id.
    pub dir: PathBuf,
}

impl AppsConfig {
    /// Root directory of the app `app_id`.
    #[must_use]
    pub fn app_dir(&self, app_id: &str) -> PathBuf {
        self.dir.join(app_id)
    }
}

/// Commit author and message settings.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GitConfig {
    /// Commit author and committer name.
    pub author_name: String,
    /// Commit author and committer email.
    pub author_email: String,
    /// Prefix of every commit subject.
    pub message_prefix: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            author_name: "[Orbix]".to_owned(),
            author_email: "git@orbix.sh".to_owned(),
            message_prefix: "[orbix]".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`git.author_email`").
        field: String,
        /// Error message (e.g., "${`ORBIX_EMAIL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `orbix.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(apps_dir) = &settings.apps_dir {
            self.apps_resolved.dir.clone_from(apps_dir);
        }
        if let Some(name) = &settings.author_name {
            self.git.author_name.clone_from(name);
        }
        if let Some(email) = &settings.author_email {
            self.git.author_email.clone_from(email);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            apps: AppsConfigRaw::default(),
            git: GitConfig::default(),
            apps_resolved: AppsConfig {
                dir: base.join("apps"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.git.author_name, "git.author_name")?;
        require_non_empty(&self.git.author_email, "git.author_email")?;
        require_non_empty(&self.git.message_prefix, "git.message_prefix")?;

        if !self.git.author_email.contains('@') {
            return Err(ConfigError::Validation(
                "git.author_email must contain '@'".to_owned(),
            ));
        }

        if self.apps_resolved.dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("apps.dir cannot be empty".to_owned()));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.apps.dir {
            self.apps.dir = Some(expand::expand_env(dir, "apps.dir")?);
        }
        self.git.author_name = expand::expand_env(&self.git.author_name, "git.author_name")?;
        self.git.author_email = expand::expand_env(&self.git.author_email, "git.author_email")?;
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.apps_resolved = AppsConfig {
            dir: config_dir.join(self.apps.dir.as_deref().unwrap_or("apps")),
        };
    }
}
