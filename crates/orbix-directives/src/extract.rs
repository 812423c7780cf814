//! Directive extraction.
//!
//! [`extract`] runs every grammar rule over the text and merges the results in
//! document order. The per-kind helpers are thin filters over the same pass.
//!
//! Extraction does not sanitize; callers pass text through
//! [`sanitize`](crate::sanitize) first when attribute values may contain `<`
//! or `>`.

use crate::directive::{Directive, DirectiveKind};
use crate::grammar::{self, Built, Occurrence, RULES};

/// A skipped malformed directive occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Diagnostic {
    /// Kind of the skipped directive.
    pub kind: DirectiveKind,
    /// Byte offset of the opening tag.
    pub offset: usize,
    /// Human-readable reason.
    pub message: String,
}

/// Result of extracting directives from a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Extraction {
    /// Directives in document order.
    pub directives: Vec<Directive>,
    /// Occurrences skipped because a required attribute was missing.
    pub diagnostics: Vec<Diagnostic>,
}

impl Extraction {
    /// Directives of one kind, in document order.
    pub fn of_kind(&self, kind: DirectiveKind) -> impl Iterator<Item = &Directive> {
        self.directives.iter().filter(move |d| d.kind() == kind)
    }

    /// Returns `true` if no directive was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

/// Extract all directives from `text`.
///
/// Only well-formed occurrences (opening and closing tag present) are
/// considered. An occurrence missing a required attribute is either skipped
/// with a [`Diagnostic`] (`Orbix-write`, `Orbix-search-replace`) or does not
/// match at all (every other kind).
///
/// # Example
///
/// ```
/// use orbix_directives::{Directive, extract};
///
/// let extraction = extract(
///     r#"<Orbix-add-dependency packages="pkg1 pkg2"></Orbix-add-dependency>"#,
/// );
/// assert_eq!(
///     extraction.directives,
///     vec![Directive::AddDependency {
///         packages: vec!["pkg1".to_owned(), "pkg2".to_owned()],
///     }]
/// );
/// ```
#[must_use]
pub fn extract(text: &str) -> Extraction {
    let mut found: Vec<(usize, Directive)> = Vec::new();
    let mut diagnostics = Vec::new();

    for rule in &RULES {
        for raw in grammar::scan(rule, text) {
            match grammar::build(rule, &raw, text) {
                Built::Directive(directive) => found.push((raw.span.start, directive)),
                Built::MissingAttribute(attr) => {
                    let snippet = &text[raw.span.clone()];
                    tracing::warn!(
                        tag = raw.tag,
                        offset = raw.span.start,
                        snippet = %preview(snippet),
                        "Found <{}> tag without a valid '{attr}' attribute",
                        raw.tag
                    );
                    diagnostics.push(Diagnostic {
                        kind: rule.kind,
                        offset: raw.span.start,
                        message: format!("<{}> is missing required attribute '{attr}'", raw.tag),
                    });
                }
                Built::Unmatched => {}
            }
            // Only the first occurrence counts, whether or not it yields a directive.
            if rule.occurrence == Occurrence::First {
                break;
            }
        }
    }

    // Stable sort keeps table order for directives sharing an offset.
    found.sort_by_key(|(offset, _)| *offset);
    diagnostics.sort_by_key(|d| d.offset);

    Extraction {
        directives: found.into_iter().map(|(_, d)| d).collect(),
        diagnostics,
    }
}

/// `Orbix-write` directives.
#[must_use]
pub fn write_directives(text: &str) -> Vec<Directive> {
    only(text, DirectiveKind::Write)
}

/// `Orbix-rename` directives.
#[must_use]
pub fn rename_directives(text: &str) -> Vec<Directive> {
    only(text, DirectiveKind::Rename)
}

/// Canonical paths of `Orbix-delete` directives.
#[must_use]
pub fn delete_paths(text: &str) -> Vec<String> {
    only(text, DirectiveKind::Delete)
        .into_iter()
        .filter_map(|d| match d {
            Directive::Delete { path } => Some(path),
            _ => None,
        })
        .collect()
}

/// Packages from every `Orbix-add-dependency` directive, flattened in
/// document order. Duplicates are kept.
#[must_use]
pub fn dependency_packages(text: &str) -> Vec<String> {
    only(text, DirectiveKind::AddDependency)
        .into_iter()
        .flat_map(|d| match d {
            Directive::AddDependency { packages } => packages,
            _ => Vec::new(),
        })
        .collect()
}

/// Trimmed body of the first `Orbix-chat-summary`, if any.
#[must_use]
pub fn chat_summary(text: &str) -> Option<String> {
    only(text, DirectiveKind::ChatSummary)
        .into_iter()
        .find_map(|d| match d {
            Directive::ChatSummary { text } => Some(text),
            _ => None,
        })
}

/// `Orbix-execute-sql` directives.
#[must_use]
pub fn sql_queries(text: &str) -> Vec<Directive> {
    only(text, DirectiveKind::ExecuteSql)
}

/// `Orbix-search-replace` directives.
#[must_use]
pub fn search_replace_directives(text: &str) -> Vec<Directive> {
    only(text, DirectiveKind::SearchReplace)
}

/// Command kinds from `Orbix-command` directives.
#[must_use]
pub fn commands(text: &str) -> Vec<String> {
    only(text, DirectiveKind::Command)
        .into_iter()
        .filter_map(|d| match d {
            Directive::Command { kind } => Some(kind),
            _ => None,
        })
        .collect()
}

fn only(text: &str, kind: DirectiveKind) -> Vec<Directive> {
    extract(text)
        .directives
        .into_iter()
        .filter(|d| d.kind() == kind)
        .collect()
}

/// First line of a snippet, shortened for logs.
fn preview(snippet: &str) -> String {
    const MAX: usize = 80;
    let line = snippet.lines().next().unwrap_or_default();
    match line.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &line[..idx]),
        None => line.to_owned(),
    }
}
