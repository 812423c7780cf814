//! `orbix strip` command implementation.

use std::path::PathBuf;

use clap::Args;
use orbix_directives::strip_directives;

use crate::error::CliError;
use crate::input::read_response;
use crate::output::Output;

/// Arguments for the strip command.
#[derive(Args)]
pub(crate) struct StripArgs {
    /// Response file (default: stdin).
    file: Option<PathBuf>,
}

impl StripArgs {
    /// Execute the strip command.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let text = read_response(self.file.as_deref())?;
        output.result(&strip_directives(&text))
    }
}
