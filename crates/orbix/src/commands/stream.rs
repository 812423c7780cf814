//! `orbix stream` command implementation.

use std::path::PathBuf;

use clap::Args;
use orbix_directives::{
    ContentPiece, RECOGNIZED_TAGS, TagState, close_unclosed, error_messages, has_unclosed_write,
    parse_content,
};
use serde::Serialize;

use crate::error::CliError;
use crate::input::read_response;
use crate::output::Output;

/// Arguments for the stream command.
#[derive(Args)]
pub(crate) struct StreamArgs {
    /// Partial response file (default: stdin).
    file: Option<PathBuf>,

    /// Treat the stream as ended, so unclosed tags are aborted.
    #[arg(long)]
    ended: bool,
}

/// Rendering of a partial response.
#[derive(Debug, Serialize)]
struct StreamReport {
    /// Text with synthetic closing tags appended.
    text: String,
    complete: bool,
    unclosed_write: bool,
    tags: Vec<TagReport>,
    errors: Vec<String>,
}

#[derive(Debug, Serialize)]
struct TagReport {
    tag: String,
    start: usize,
    state: TagState,
}

impl StreamArgs {
    /// Execute the stream command.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let text = read_response(self.file.as_deref())?;
        output.json(&report(&text, !self.ended))
    }
}

fn report(text: &str, stream_active: bool) -> StreamReport {
    let snapshot = close_unclosed(text, &RECOGNIZED_TAGS);
    let pieces = parse_content(text);

    let tags = pieces
        .iter()
        .filter_map(|piece| match piece {
            ContentPiece::Tag(info) => Some(TagReport {
                tag: info.tag.clone(),
                start: info.start,
                state: info.state(stream_active),
            }),
            ContentPiece::Markdown(_) => None,
        })
        .collect();

    StreamReport {
        complete: snapshot.is_complete(),
        unclosed_write: has_unclosed_write(text),
        errors: error_messages(&pieces),
        text: snapshot.into_text(),
        tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PARTIAL: &str = r#"Done. <Orbix-write path="a.ts">x</Orbix-write> <Orbix-write path="b.ts">con"#;

    #[test]
    fn test_active_stream() {
        let report = report(PARTIAL, true);

        assert!(!report.complete);
        assert!(report.unclosed_write);
        assert!(report.text.ends_with("con</Orbix-write>"));
        let states: Vec<_> = report.tags.iter().map(|t| t.state).collect();
        assert_eq!(states, vec![TagState::Finished, TagState::Pending]);
    }

    #[test]
    fn test_ended_stream_aborts_unclosed() {
        let report = report(PARTIAL, false);

        assert_eq!(report.tags[1].state, TagState::Aborted);
    }

    #[test]
    fn test_error_output() {
        let report = report(
            r#"<Orbix-output type="error" message="Build failed">log</Orbix-output>"#,
            true,
        );

        assert!(report.complete);
        assert_eq!(report.errors, vec!["Build failed"]);
    }
}
