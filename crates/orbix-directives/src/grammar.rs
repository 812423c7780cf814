//! Table-driven directive grammar.
//!
//! Every directive kind is described by one [`TagRule`]: its tag name, the
//! attributes it requires, what happens when one is missing and how its body
//! is post-processed. A single generic scan turns each rule into
//! [`RawTagMatch`]es which [`build`] converts into [`Directive`]s.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::directive::{Directive, DirectiveKind};
use crate::path::canonicalize_path;

/// Fence marker that opens and closes a fenced code block.
const FENCE: &str = "```";

/// What to do with an occurrence that lacks a required attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MissingAttr {
    /// Skip the occurrence and report a diagnostic.
    Warn,
    /// The occurrence does not match the grammar at all.
    Unmatched,
}

/// Body post-processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyRule {
    /// Trim, then drop a leading and a trailing fence line.
    Fenced,
    /// Trim only.
    Trimmed,
    /// Body is not used.
    Ignored,
    /// Body must not contain markup.
    NoMarkup,
    /// Body must be empty.
    Empty,
}

/// How many occurrences of a kind are extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Occurrence {
    All,
    First,
}

/// Grammar rule for one directive kind.
#[derive(Debug)]
pub(crate) struct TagRule {
    pub kind: DirectiveKind,
    /// Attributes that must be present and non-empty. Each entry lists
    /// accepted aliases, the first being the canonical name.
    pub required: &'static [&'static [&'static str]],
    pub missing: MissingAttr,
    pub body: BodyRule,
    pub occurrence: Occurrence,
    pub case_insensitive: bool,
}

/// The directive grammar, in table order.
pub(crate) static RULES: [TagRule; 8] = [
    TagRule {
        kind: DirectiveKind::Write,
        required: &[&["path"]],
        missing: MissingAttr::Warn,
        body: BodyRule::Fenced,
        occurrence: Occurrence::All,
        case_insensitive: true,
    },
    TagRule {
        kind: DirectiveKind::Rename,
        required: &[&["from"], &["to"]],
        missing: MissingAttr::Unmatched,
        body: BodyRule::Ignored,
        occurrence: Occurrence::All,
        case_insensitive: false,
    },
    TagRule {
        kind: DirectiveKind::Delete,
        required: &[&["path"]],
        missing: MissingAttr::Unmatched,
        body: BodyRule::Ignored,
        occurrence: Occurrence::All,
        case_insensitive: false,
    },
    TagRule {
        kind: DirectiveKind::AddDependency,
        required: &[&["packages"]],
        missing: MissingAttr::Unmatched,
        body: BodyRule::NoMarkup,
        occurrence: Occurrence::All,
        case_insensitive: false,
    },
    TagRule {
        kind: DirectiveKind::ExecuteSql,
        required: &[],
        missing: MissingAttr::Unmatched,
        body: BodyRule::Fenced,
        occurrence: Occurrence::All,
        case_insensitive: false,
    },
    TagRule {
        kind: DirectiveKind::SearchReplace,
        required: &[&["path"]],
        missing: MissingAttr::Warn,
        body: BodyRule::Fenced,
        occurrence: Occurrence::All,
        case_insensitive: true,
    },
    TagRule {
        kind: DirectiveKind::ChatSummary,
        required: &[],
        missing: MissingAttr::Unmatched,
        body: BodyRule::Trimmed,
        occurrence: Occurrence::First,
        case_insensitive: false,
    },
    TagRule {
        kind: DirectiveKind::Command,
        required: &[&["type", "kind"]],
        missing: MissingAttr::Unmatched,
        body: BodyRule::Empty,
        occurrence: Occurrence::All,
        case_insensitive: false,
    },
];

/// Compiled `<Tag attrs>body</Tag>` pattern for each rule, indexed like [`RULES`].
static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|rule| {
            let flags = if rule.case_insensitive { "(?si)" } else { "(?s)" };
            let tag = regex::escape(rule.kind.tag());
            Regex::new(&format!(r"{flags}<{tag}(\s[^>]*)?>(.*?)</{tag}>"))
                .expect("directive pattern is a valid regex")
        })
        .collect()
});

/// `name="value"` attribute pairs.
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([\w:-]+)="([^"]*)""#).expect("attribute pattern is a valid regex")
});

/// One `<Tag attrs>body</Tag>` occurrence. Never leaves the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawTagMatch<'a> {
    pub tag: &'static str,
    pub attrs: &'a str,
    pub body: Range<usize>,
    /// Whole occurrence; `span.start` is the opening tag offset.
    pub span: Range<usize>,
}

/// Find every occurrence of `rule`'s tag in `text`, in document order.
pub(crate) fn scan<'a>(rule: &TagRule, text: &'a str) -> Vec<RawTagMatch<'a>> {
    let index = RULES
        .iter()
        .position(|r| r.kind == rule.kind)
        .unwrap_or_default();

    PATTERNS[index]
        .captures_iter(text)
        .filter_map(|caps| {
            let span = caps.get(0)?.range();
            let body = caps.get(2)?.range();
            Some(RawTagMatch {
                tag: rule.kind.tag(),
                attrs: caps.get(1).map_or("", |m| m.as_str()),
                body,
                span,
            })
        })
        .collect()
}

/// Outcome of building a directive from a raw match.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Built {
    Directive(Directive),
    /// A required attribute is missing and the rule asks for a diagnostic.
    MissingAttribute(&'static str),
    /// The occurrence does not satisfy the rule.
    Unmatched,
}

/// Convert a raw match into a directive according to `rule`.
pub(crate) fn build(rule: &TagRule, raw: &RawTagMatch<'_>, text: &str) -> Built {
    let attrs = Attributes::parse(raw.attrs);

    for aliases in rule.required {
        if aliases.iter().all(|name| attrs.non_empty(name).is_none()) {
            return match rule.missing {
                MissingAttr::Warn => Built::MissingAttribute(aliases[0]),
                MissingAttr::Unmatched => Built::Unmatched,
            };
        }
    }

    let raw_body = &text[raw.body.clone()];
    let content = match rule.body {
        BodyRule::Fenced => strip_fences(raw_body),
        BodyRule::Trimmed => raw_body.trim().to_owned(),
        BodyRule::Ignored => String::new(),
        BodyRule::NoMarkup if raw_body.contains('<') => return Built::Unmatched,
        BodyRule::NoMarkup => String::new(),
        BodyRule::Empty if !raw_body.is_empty() => return Built::Unmatched,
        BodyRule::Empty => String::new(),
    };

    let path = |name: &str| canonicalize_path(attrs.non_empty(name).unwrap_or_default());
    let description = attrs.non_empty("description").map(str::to_owned);

    let directive = match rule.kind {
        DirectiveKind::Write => Directive::Write {
            path: path("path"),
            content,
            description,
        },
        DirectiveKind::Rename => Directive::Rename {
            from: path("from"),
            to: path("to"),
        },
        DirectiveKind::Delete => Directive::Delete { path: path("path") },
        DirectiveKind::AddDependency => Directive::AddDependency {
            packages: attrs
                .non_empty("packages")
                .unwrap_or_default()
                .split_whitespace()
                .map(str::to_owned)
                .collect(),
        },
        DirectiveKind::ExecuteSql => Directive::ExecuteSql {
            content,
            description,
        },
        DirectiveKind::SearchReplace => Directive::SearchReplace {
            path: path("path"),
            content,
            description,
        },
        DirectiveKind::ChatSummary if content.is_empty() => return Built::Unmatched,
        DirectiveKind::ChatSummary => Directive::ChatSummary { text: content },
        DirectiveKind::Command => Directive::Command {
            kind: attrs
                .non_empty("type")
                .or_else(|| attrs.non_empty("kind"))
                .unwrap_or_default()
                .to_owned(),
        },
    };

    Built::Directive(directive)
}

/// Trim a body and drop a fence line at either end.
///
/// Interior lines, blank ones included, are kept verbatim.
pub(crate) fn strip_fences(body: &str) -> String {
    let mut lines: Vec<&str> = body.trim().split('\n').collect();

    if lines.first().is_some_and(|l| l.starts_with(FENCE)) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| l.starts_with(FENCE)) {
        lines.pop();
    }

    lines.join("\n")
}

/// Attributes of an opening tag, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// Parse `name="value"` pairs from the attribute part of an opening tag.
    ///
    /// ```
    /// use orbix_directives::Attributes;
    ///
    /// let attrs = Attributes::parse(r#" path="src/a.ts" description="A file""#);
    /// assert_eq!(attrs.get("path"), Some("src/a.ts"));
    /// assert_eq!(attrs.get("missing"), None);
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Self {
        Self(
            ATTRIBUTE
                .captures_iter(s)
                .map(|caps| (caps[1].to_owned(), caps[2].to_owned()))
                .collect(),
        )
    }

    /// Value of the first attribute called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Like [`get`](Self::get), treating an empty value as absent.
    fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
