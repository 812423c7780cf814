//! Streaming state tracker.
//!
//! While a response is still arriving, its prefix usually ends inside a
//! directive. [`close_unclosed`] produces a well-formed copy of the prefix by
//! appending the missing closing tags and remembers which openings it had to
//! close. Renderers use [`StreamSnapshot::state`] to show those directives as
//! pending (stream still active) or aborted (stream ended mid-directive).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

/// Tag names the live renderer understands, in matching order.
///
/// Longer names sharing a prefix (`Orbix-web-search-result`) come before the
/// shorter one (`Orbix-web-search`).
pub const RECOGNIZED_TAGS: [&str; 23] = [
    "Orbix-write",
    "Orbix-rename",
    "Orbix-delete",
    "Orbix-add-dependency",
    "Orbix-execute-sql",
    "Orbix-add-integration",
    "Orbix-output",
    "Orbix-problem-report",
    "Orbix-chat-summary",
    "Orbix-edit",
    "Orbix-codebase-context",
    "Orbix-web-search-result",
    "Orbix-web-search",
    "Orbix-web-crawl",
    "Orbix-code-search-result",
    "Orbix-code-search",
    "Orbix-read",
    "think",
    "Orbix-command",
    "Orbix-mcp-tool-call",
    "Orbix-mcp-tool-result",
    "Orbix-list-files",
    "Orbix-database-schema",
];

const WRITE_CLOSE: &str = "</Orbix-write>";

static WRITE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Orbix-write(?:\s[^>]*)?>").expect("write pattern is a valid regex"));

/// Whether an opening tag was closed by the text itself or by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "kebab-case")
)]
pub enum StreamState {
    Closed,
    AutoClosed,
}

/// Progress of one directive as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "kebab-case")
)]
pub enum TagState {
    /// Still being emitted.
    Pending,
    /// Closing tag received.
    Finished,
    /// Stream ended before the closing tag.
    Aborted,
}

impl TagState {
    /// Map a tracker state to the UI state.
    #[must_use]
    pub fn resolve(state: StreamState, stream_active: bool) -> Self {
        match (state, stream_active) {
            (StreamState::Closed, _) => Self::Finished,
            (StreamState::AutoClosed, true) => Self::Pending,
            (StreamState::AutoClosed, false) => Self::Aborted,
        }
    }
}

/// A well-formed copy of a streaming prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamSnapshot {
    text: String,
    auto_closed: BTreeMap<String, BTreeSet<usize>>,
}

impl StreamSnapshot {
    /// The prefix followed by the synthetic closing tags.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }

    /// Returns `true` if the opening `tag` at `offset` was closed by the tracker.
    #[must_use]
    pub fn is_auto_closed(&self, tag: &str, offset: usize) -> bool {
        self.auto_closed
            .get(tag)
            .is_some_and(|offsets| offsets.contains(&offset))
    }

    #[must_use]
    pub fn stream_state(&self, tag: &str, offset: usize) -> StreamState {
        if self.is_auto_closed(tag, offset) {
            StreamState::AutoClosed
        } else {
            StreamState::Closed
        }
    }

    /// UI state of the opening `tag` at `offset`.
    #[must_use]
    pub fn state(&self, tag: &str, offset: usize, stream_active: bool) -> TagState {
        TagState::resolve(self.stream_state(tag, offset), stream_active)
    }

    /// Every auto-closed opening as `(tag, offset)`.
    pub fn auto_closed(&self) -> impl Iterator<Item = (&str, usize)> {
        self.auto_closed
            .iter()
            .flat_map(|(tag, offsets)| offsets.iter().map(move |o| (tag.as_str(), *o)))
    }

    /// Returns `true` if nothing had to be closed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.auto_closed.is_empty()
    }
}

/// Close every unclosed occurrence of `tags` in `text`.
///
/// For each tag, openings are `<tag>` or `<tag` followed by whitespace,
/// attributes and `>`; closings are the literal `</tag>`. When openings
/// outnumber closings by `k`, `k` closing tags are appended and the last `k`
/// openings are marked auto-closed. Tags are processed in slice order, which
/// is also the order of the appended closings.
///
/// ```
/// use orbix_directives::{RECOGNIZED_TAGS, TagState, close_unclosed};
///
/// let snapshot = close_unclosed(r#"Hi <Orbix-write path="a.ts">const a"#, &RECOGNIZED_TAGS);
/// assert_eq!(snapshot.text(), r#"Hi <Orbix-write path="a.ts">const a</Orbix-write>"#);
/// assert_eq!(snapshot.state("Orbix-write", 3, true), TagState::Pending);
/// assert_eq!(snapshot.state("Orbix-write", 3, false), TagState::Aborted);
/// ```
#[must_use]
pub fn close_unclosed(text: &str, tags: &[&str]) -> StreamSnapshot {
    let mut out = text.to_owned();
    let mut auto_closed = BTreeMap::new();

    for &tag in tags {
        let openings = opening_offsets(text, tag);
        let closing = format!("</{tag}>");
        let close_count = text.matches(closing.as_str()).count();

        let missing = openings.len().saturating_sub(close_count);
        if missing == 0 {
            continue;
        }

        for _ in 0..missing {
            out.push_str(&closing);
        }
        let open: BTreeSet<usize> = openings[openings.len() - missing..].iter().copied().collect();
        tracing::debug!(tag, missing, "Auto-closing streaming tags");
        auto_closed.insert(tag.to_owned(), open);
    }

    StreamSnapshot {
        text: out,
        auto_closed,
    }
}

/// Whether the most recent `Orbix-write` opening lacks a closing tag after it.
///
/// Earlier occurrences are ignored, so an unclosed write followed by a closed
/// one reports `false`.
#[must_use]
pub fn has_unclosed_write(text: &str) -> bool {
    WRITE_OPEN
        .find_iter(text)
        .last()
        .is_some_and(|open| !text[open.end()..].contains(WRITE_CLOSE))
}

/// Byte offsets of complete opening tags named exactly `tag`.
fn opening_offsets(text: &str, tag: &str) -> Vec<usize> {
    let needle = format!("<{tag}");
    let mut offsets = Vec::new();
    let mut pos = 0;

    while let Some(found) = text[pos..].find(&needle) {
        let start = pos + found;
        let after = start + needle.len();
        let rest = &text[after..];

        let end = match rest.chars().next() {
            Some('>') => Some(after + 1),
            Some(c) if c.is_whitespace() => rest.find('>').map(|i| after + i + 1),
            _ => None,
        };

        match end {
            Some(end) => {
                offsets.push(start);
                pos = end;
            }
            None => pos = after,
        }
    }

    offsets
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_balanced_text_is_unchanged() {
        let text = r#"<Orbix-write path="a">x</Orbix-write> <think>hm</think>"#;
        let snapshot = close_unclosed(text, &RECOGNIZED_TAGS);
        assert_eq!(snapshot.text(), text);
        assert!(snapshot.is_complete());
        assert_eq!(snapshot.state("Orbix-write", 0, true), TagState::Finished);
    }

    #[test]
    fn test_last_openings_are_auto_closed() {
        let text = "<think>a</think><think>b<think>c";
        let snapshot = close_unclosed(text, &RECOGNIZED_TAGS);
        assert_eq!(snapshot.text(), "<think>a</think><think>b<think>c</think></think>");
        assert_eq!(
            snapshot.auto_closed().collect::<Vec<_>>(),
            vec![("think", 16), ("think", 24)]
        );
        assert!(!snapshot.is_auto_closed("think", 0));
    }

    #[test]
    fn test_closings_appended_in_tag_order() {
        let text = r#"<think>plan <Orbix-write path="a">code"#;
        let snapshot = close_unclosed(text, &RECOGNIZED_TAGS);
        assert_eq!(
            snapshot.text(),
            format!("{text}</Orbix-write></think>")
        );
    }

    #[test]
    fn test_incomplete_opening_is_not_counted() {
        let text = r#"Hello <Orbix-write path="src/"#;
        let snapshot = close_unclosed(text, &RECOGNIZED_TAGS);
        assert_eq!(snapshot.text(), text);
        assert!(snapshot.is_complete());
    }

    #[test]
    fn test_longer_tag_name_is_not_an_opening() {
        let text = "<Orbix-web-search-result>x";
        let snapshot = close_unclosed(text, &["Orbix-web-search"]);
        assert!(snapshot.is_complete());

        let snapshot = close_unclosed(text, &RECOGNIZED_TAGS);
        assert_eq!(snapshot.text(), "<Orbix-web-search-result>x</Orbix-web-search-result>");
    }

    #[test]
    fn test_surplus_closings_are_ignored() {
        let text = "a</think></think>";
        assert_eq!(close_unclosed(text, &RECOGNIZED_TAGS).text(), text);
    }

    #[test]
    fn test_tag_state_resolution() {
        assert_eq!(TagState::resolve(StreamState::Closed, true), TagState::Finished);
        assert_eq!(TagState::resolve(StreamState::Closed, false), TagState::Finished);
        assert_eq!(TagState::resolve(StreamState::AutoClosed, true), TagState::Pending);
        assert_eq!(TagState::resolve(StreamState::AutoClosed, false), TagState::Aborted);
    }

    #[test]
    fn test_unknown_tag_state_is_finished() {
        let snapshot = close_unclosed("<think>x", &RECOGNIZED_TAGS);
        assert_eq!(snapshot.state("Orbix-write", 0, true), TagState::Finished);
        assert_eq!(snapshot.state("think", 0, true), TagState::Pending);
    }

    #[test]
    fn test_unclosed_write_no_tags() {
        assert!(!has_unclosed_write("This is just regular text without any Orbix tags."));
    }

    #[test]
    fn test_unclosed_write_closed() {
        assert!(!has_unclosed_write(
            r#"<Orbix-write path="src/file.js" description="A test file">console.log('hello');</Orbix-write>"#
        ));
        assert!(!has_unclosed_write(r#"<Orbix-write path="src/file.js"></Orbix-write>"#));
    }

    #[test]
    fn test_unclosed_write_open() {
        assert!(has_unclosed_write(r#"<Orbix-write path="src/file.js">console.log('hello');"#));
        assert!(has_unclosed_write(r#"<Orbix-write path="src/file.js">"#));
        assert!(has_unclosed_write(r#"<Orbix-write path="a">text"#));
    }

    #[test]
    fn test_unclosed_write_last_occurrence_open() {
        let text = r#"<Orbix-write path="src/file1.js">code1</Orbix-write>
    Some text in between
    <Orbix-write path="src/file2.js">code2"#;
        assert!(has_unclosed_write(text));
    }

    #[test]
    fn test_unclosed_write_only_last_occurrence_matters() {
        let text = r#"<Orbix-write path="src/file1.js">completed content</Orbix-write>
    <Orbix-write path="src/file2.js">unclosed content
    <Orbix-write path="src/file3.js">final content</Orbix-write>"#;
        assert!(!has_unclosed_write(text));
    }

    #[test]
    fn test_unclosed_write_markup_in_body() {
        let text = r#"<Orbix-write path="src/file.js" description="File" version="1.0">
const regex = /<div[^>]*>/g;
</Orbix-write>"#;
        assert!(!has_unclosed_write(text));
    }

    #[test]
    fn test_unclosed_write_ignores_longer_tag_names() {
        assert!(!has_unclosed_write("<Orbix-writer>draft"));
        assert!(!has_unclosed_write(
            r#"<Orbix-write path="a">x</Orbix-write> <Orbix-write-note id="1">"#
        ));
        assert!(has_unclosed_write("<Orbix-write>draft"));
    }
}
