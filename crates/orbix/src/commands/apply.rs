//! `orbix apply` command implementation.

use std::path::PathBuf;

use clap::Args;
use orbix_apply::{CommitRequest, apply_to_app};
use orbix_config::{CliSettings, Config};

use crate::error::CliError;
use crate::input::read_response;
use crate::output::Output;

/// Arguments for the apply command.
#[derive(Args)]
pub(crate) struct ApplyArgs {
    /// App to apply the response to.
    app_id: String,

    /// Finished response file (default: stdin).
    file: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover orbix.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory containing app working trees (overrides config).
    #[arg(long, env = "ORBIX_APPS_DIR")]
    apps_dir: Option<PathBuf>,

    /// Commit author name (overrides config).
    #[arg(long, env = "ORBIX_AUTHOR_NAME")]
    author_name: Option<String>,

    /// Commit author email (overrides config).
    #[arg(long, env = "ORBIX_AUTHOR_EMAIL")]
    author_email: Option<String>,

    /// Commit subject (default: the response's chat summary).
    #[arg(short, long)]
    summary: Option<String>,

    /// Chat message id, recorded in logs.
    #[arg(long)]
    message_id: Option<i64>,
}

impl ApplyArgs {
    /// Execute the apply command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the app cannot be resolved,
    /// or staging and committing fail.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            apps_dir: self.apps_dir,
            author_name: self.author_name,
            author_email: self.author_email,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(
            config = ?config.config_path,
            apps_dir = %config.apps_resolved.dir.display(),
            "Loaded configuration"
        );
        let text = read_response(self.file.as_deref())?;

        let request = CommitRequest {
            summary: self.summary,
            message_id: self.message_id,
        };
        let result = apply_to_app(
            &config.apps_resolved,
            &config.git,
            &self.app_id,
            &text,
            &request,
        )?;

        if let Some(error) = &result.error {
            output.warning(&format!("Batch stopped early: {error}"));
        }
        if let Some(error) = &result.extra_files_error {
            output.warning(&format!("Extra files not committed: {error}"));
        }
        match &result.commit {
            Some(hash) => output.success(&format!(
                "Committed {} change(s) as {hash}",
                result.counts.total()
            )),
            None => output.warning("No files changed"),
        }

        output.json(&result)
    }
}
