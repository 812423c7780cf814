//! `orbix extract` command implementation.

use std::path::PathBuf;

use clap::Args;
use orbix_directives::{Extraction, extract, sanitize};

use crate::error::CliError;
use crate::input::read_response;
use crate::output::Output;

/// Arguments for the extract command.
#[derive(Args)]
pub(crate) struct ExtractArgs {
    /// Response file (default: stdin).
    file: Option<PathBuf>,

    /// Skip attribute sanitization.
    #[arg(long)]
    no_sanitize: bool,
}

impl ExtractArgs {
    /// Execute the extract command.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let text = read_response(self.file.as_deref())?;
        let extraction = run(&text, !self.no_sanitize);

        for diagnostic in &extraction.diagnostics {
            output.warning(&format!(
                "Skipped {} at byte {}: {}",
                diagnostic.kind, diagnostic.offset, diagnostic.message
            ));
        }
        output.json(&extraction)
    }
}

fn run(text: &str, sanitized: bool) -> Extraction {
    if sanitized {
        extract(&sanitize(text))
    } else {
        extract(text)
    }
}
