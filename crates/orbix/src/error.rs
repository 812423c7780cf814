//! CLI error types.

use orbix_apply::ApplyError;
use orbix_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Apply(#[from] ApplyError),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}
