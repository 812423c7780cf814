//! Directive tag stripper.

use std::sync::LazyLock;

use regex::Regex;

/// Opening tag of any `Orbix-*` name. The name is group 1.
static OPENING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(Orbix-[\w-]+)(?:\s[^>]*)?>").expect("strip pattern is a valid regex")
});

/// Remove every closed `Orbix-*` tag, body included, and trim the result.
///
/// A tag is closed when the literal `</name>` of the same name follows its
/// opening. When a tag sat directly between two words a single space is left
/// so they do not run together; otherwise the surrounding whitespace is kept
/// as is. Self-closing and unclosed tags are not touched.
///
/// ```
/// use orbix_directives::strip_directives;
///
/// let text = r#"Before text <Orbix-write path="a.js">x</Orbix-write> After text"#;
/// assert_eq!(strip_directives(text), "Before text  After text");
/// assert_eq!(strip_directives(r#"see<Orbix-delete path="a"></Orbix-delete>this"#), "see this");
/// ```
#[must_use]
pub fn strip_directives(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut pos = 0;

    while let Some(caps) = OPENING.captures_at(text, pos) {
        let (Some(open), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        if open.as_str().ends_with("/>") {
            pos = open.end();
            continue;
        }
        let closing = format!("</{}>", name.as_str());
        let Some(body_len) = text[open.end()..].find(&closing) else {
            pos = open.end();
            continue;
        };
        let end = open.end() + body_len + closing.len();

        out.push_str(&text[last..open.start()]);
        let before = out.chars().next_back();
        let after = text[end..].chars().next();
        if before.is_some_and(|c| !c.is_whitespace()) && after.is_some_and(|c| !c.is_whitespace()) {
            out.push(' ');
        }
        last = end;
        pos = end;
    }
    out.push_str(&text[last..]);

    out.trim().to_owned()
}
