//! Terminal output utilities.

use console::{Style, Term};
use serde::Serialize;

use crate::error::CliError;

/// Terminal output formatter.
///
/// Results go to stdout; status and errors go to stderr.
pub(crate) struct Output {
    out: Term,
    err: Term,
    green: Style,
    yellow: Style,
    red: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    /// Print a result line to stdout.
    pub(crate) fn result(&self, text: &str) -> Result<(), CliError> {
        self.out.write_line(text)?;
        Ok(())
    }

    /// Print `value` as pretty JSON to stdout.
    pub(crate) fn json<T: Serialize>(&self, value: &T) -> Result<(), CliError> {
        self.result(&serde_json::to_string_pretty(value)?)
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.err.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.err.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.err.write_line(&self.red.apply_to(msg).to_string());
    }
}
