//! Segmentation of a (possibly streaming) response into renderable pieces.

use std::sync::LazyLock;

use regex::Regex;

use crate::grammar::Attributes;
use crate::stream::{RECOGNIZED_TAGS, TagState, close_unclosed};

/// Opening tag of any recognized tag. Alternation order follows
/// [`RECOGNIZED_TAGS`].
static OPENING: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = RECOGNIZED_TAGS.iter().map(|t| regex::escape(t)).collect();
    Regex::new(&format!(r"<({})\s*([^>]*)>", alternatives.join("|")))
        .expect("opening pattern is a valid regex")
});

/// A segment of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "type", content = "value", rename_all = "kebab-case")
)]
pub enum ContentPiece {
    /// Prose between tags, verbatim.
    Markdown(String),
    /// A recognized tag with its body.
    Tag(TagInfo),
}

/// A recognized tag found by [`parse_content`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TagInfo {
    pub tag: String,
    pub attributes: Attributes,
    /// Raw body between the opening and closing tag.
    pub content: String,
    pub full_match: String,
    /// Byte offset of the opening tag.
    pub start: usize,
    /// The closing tag was synthesized because the text ended inside the tag.
    pub in_progress: bool,
}

impl TagInfo {
    /// UI state of this tag.
    #[must_use]
    pub fn state(&self, stream_active: bool) -> TagState {
        match (self.in_progress, stream_active) {
            (false, _) => TagState::Finished,
            (true, true) => TagState::Pending,
            (true, false) => TagState::Aborted,
        }
    }
}

/// Split `text` into markdown and tag pieces.
///
/// Unclosed recognized tags are closed first with [`close_unclosed`]; the
/// pieces they produce have `in_progress` set. Empty markdown runs are not
/// emitted.
///
/// ```
/// use orbix_directives::{ContentPiece, parse_content};
///
/// let pieces = parse_content("Thinking... <think>step one");
/// assert_eq!(pieces.len(), 2);
/// let ContentPiece::Tag(info) = &pieces[1] else { panic!("expected tag") };
/// assert_eq!(info.tag, "think");
/// assert_eq!(info.content, "step one");
/// assert!(info.in_progress);
/// ```
#[must_use]
pub fn parse_content(text: &str) -> Vec<ContentPiece> {
    let snapshot = close_unclosed(text, &RECOGNIZED_TAGS);
    let text = snapshot.text();

    let mut pieces = Vec::new();
    let mut last = 0;
    let mut pos = 0;

    while let Some(caps) = OPENING.captures_at(text, pos) {
        let (Some(open), Some(tag), Some(attrs)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            break;
        };
        let closing = format!("</{}>", tag.as_str());

        let Some(body_len) = text[open.end()..].find(&closing) else {
            pos = open.start() + 1;
            continue;
        };
        let body_end = open.end() + body_len;
        let end = body_end + closing.len();

        if open.start() > last {
            pieces.push(ContentPiece::Markdown(text[last..open.start()].to_owned()));
        }

        pieces.push(ContentPiece::Tag(TagInfo {
            tag: tag.as_str().to_owned(),
            attributes: Attributes::parse(attrs.as_str()),
            content: text[open.end()..body_end].to_owned(),
            full_match: text[open.start()..end].to_owned(),
            start: open.start(),
            in_progress: snapshot.is_auto_closed(tag.as_str(), open.start()),
        }));

        last = end;
        pos = end;
    }

    if last < text.len() {
        pieces.push(ContentPiece::Markdown(text[last..].to_owned()));
    }

    pieces
}

/// Trimmed `message` attributes of `Orbix-output type="error"` pieces.
///
/// Used to offer fixing every reported error at once.
#[must_use]
pub fn error_messages(pieces: &[ContentPiece]) -> Vec<String> {
    pieces
        .iter()
        .filter_map(|piece| match piece {
            ContentPiece::Tag(info)
                if info.tag == "Orbix-output" && info.attributes.get("type") == Some("error") =>
            {
                info.attributes.get("message").map(str::trim)
            }
            _ => None,
        })
        .filter(|message| !message.is_empty())
        .map(str::to_owned)
        .collect()
}
