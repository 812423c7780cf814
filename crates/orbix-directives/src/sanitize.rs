//! Attribute sanitizer.
//!
//! Directive opening tags are located with `[^>]*`-style patterns, so a `>`
//! inside an attribute value would end the tag early. Before extraction every
//! `<` and `>` inside a quoted attribute value of an `Orbix-` tag is replaced
//! by its fullwidth lookalike. Bodies are never touched: their end is found by
//! the literal closing tag.

use std::borrow::Cow;

use crate::directive::DirectiveKind;

/// Prefix of every opening tag the sanitizer rewrites.
const TAG_PREFIX: &str = "<Orbix-";

/// Surrogate for `<` inside attribute values (FULLWIDTH LESS-THAN SIGN).
const LT_SURROGATE: char = '\u{FF1C}';

/// Surrogate for `>` inside attribute values (FULLWIDTH GREATER-THAN SIGN).
const GT_SURROGATE: char = '\u{FF1E}';

/// Replace `<` and `>` inside quoted attribute values of `Orbix-` tags.
///
/// Returns the input unchanged (borrowed) when it contains no `Orbix-` tag.
/// The transformation is idempotent.
///
/// # Example
///
/// ```
/// use orbix_directives::sanitize;
///
/// let input = r#"<Orbix-write path="a.tsx" description="Use <a> tags">x < y</Orbix-write>"#;
/// assert_eq!(
///     sanitize(input),
///     r#"<Orbix-write path="a.tsx" description="Use ＜a＞ tags">x < y</Orbix-write>"#
/// );
/// ```
#[must_use]
pub fn sanitize(text: &str) -> Cow<'_, str> {
    if !text.contains(TAG_PREFIX) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(idx) = rest.find(TAG_PREFIX) {
        out.push_str(&rest[..idx]);
        let tag = &rest[idx..];
        let consumed = sanitize_opening_tag(tag, &mut out);
        let after = &tag[consumed..];
        let body = directive_body_len(tag_name(tag), after);
        out.push_str(&after[..body]);
        rest = &after[body..];
    }
    out.push_str(rest);

    if out == text {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(out)
    }
}

/// Map attribute surrogates back to `<` and `>` for display.
///
/// Only for human-readable attributes such as `description`. Paths must be
/// used as extracted.
#[must_use]
pub fn restore_attribute(value: &str) -> Cow<'_, str> {
    if value.contains([LT_SURROGATE, GT_SURROGATE]) {
        Cow::Owned(
            value
                .replace(LT_SURROGATE, "<")
                .replace(GT_SURROGATE, ">"),
        )
    } else {
        Cow::Borrowed(value)
    }
}

/// Name of the tag at the start of `tag`, without the leading `<`.
fn tag_name(tag: &str) -> &str {
    let name_len = tag[1..]
        .find(|c: char| !is_name_char(c))
        .unwrap_or(tag.len() - 1);
    &tag[1..=name_len]
}

/// Length of the `>`, body and closing tag that follow a directive opening.
///
/// `after` is the text right after the sanitized attributes. Zero when the
/// tag is not a directive, is self-closing or has no closing tag yet.
fn directive_body_len(name: &str, after: &str) -> usize {
    if !after.starts_with('>') {
        return 0;
    }
    let Some(kind) = DirectiveKind::ALL
        .into_iter()
        .find(|kind| kind.tag().eq_ignore_ascii_case(name))
    else {
        return 0;
    };

    // Write and search-replace tags match case-insensitively.
    let closing = format!("</{}>", kind.tag()).to_ascii_lowercase();
    after
        .to_ascii_lowercase()
        .find(&closing)
        .map_or(0, |idx| idx + closing.len())
}

/// Copy one opening tag to `out`, escaping its quoted attribute values.
///
/// `tag` starts with [`TAG_PREFIX`]. Returns the number of bytes consumed.
/// Scanning stops before the closing `>` or `/>`, or at the first thing that
/// is not a `name="value"` pair; the caller copies the remainder verbatim.
fn sanitize_opening_tag(tag: &str, out: &mut String) -> usize {
    let mut pos = 1 + tag_name(tag).len();
    out.push_str(&tag[..pos]);

    loop {
        let rest = &tag[pos..];
        let trimmed = rest.trim_start();
        let ws = rest.len() - trimmed.len();
        out.push_str(&rest[..ws]);
        pos += ws;

        let Some((consumed, value_start, value_end)) = quoted_attribute(trimmed) else {
            return pos;
        };

        out.push_str(&trimmed[..value_start]);
        for c in trimmed[value_start..value_end].chars() {
            match c {
                '<' => out.push(LT_SURROGATE),
                '>' => out.push(GT_SURROGATE),
                _ => out.push(c),
            }
        }
        out.push_str(&trimmed[value_end..consumed]);
        pos += consumed;
    }
}

/// Parse `name="value"` at the start of `s`.
///
/// Returns (bytes consumed, value start, value end).
fn quoted_attribute(s: &str) -> Option<(usize, usize, usize)> {
    let name_len = s.find(|c: char| !is_name_char(c)).unwrap_or(s.len());
    if name_len == 0 {
        return None;
    }

    let after_name = &s[name_len..];
    if !after_name.starts_with("=\"") {
        return None;
    }

    let value_start = name_len + 2;
    let value_len = s[value_start..].find('"')?;
    let value_end = value_start + value_len;
    Some((value_end + 1, value_start, value_end))
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || c == ':'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_replaces_in_description() {
        let input = r#"<Orbix-write path="src/file.tsx" description="Testing <a> tags.">content</Orbix-write>"#;
        let expected = r#"<Orbix-write path="src/file.tsx" description="Testing ＜a＞ tags.">content</Orbix-write>"#;
        assert_eq!(sanitize(input), expected);
    }

    #[test]
    fn test_replaces_in_multiple_attributes() {
        let input = r#"<Orbix-write path="src/<component>.tsx" description="Testing <div> tags.">content</Orbix-write>"#;
        let expected = r#"<Orbix-write path="src/＜component＞.tsx" description="Testing ＜div＞ tags.">content</Orbix-write>"#;
        assert_eq!(sanitize(input), expected);
    }

    #[test]
    fn test_multiple_tags_in_one_value() {
        let input = r#"<Orbix-write path="src/file.tsx" description="Testing <div> and <span> and <a> tags.">content</Orbix-write>"#;
        let expected = r#"<Orbix-write path="src/file.tsx" description="Testing ＜div＞ and ＜span＞ and ＜a＞ tags.">content</Orbix-write>"#;
        assert_eq!(sanitize(input), expected);
    }

    #[test]
    fn test_body_is_untouched() {
        let input = "\n  BEFORE TAG\n<Orbix-write path=\"src/Highlands.tsx\" description=\"Use <a> tags.\">\nconst x = <div>a</div>;\n</Orbix-write>\nAFTER TAG\n";
        let expected = "\n  BEFORE TAG\n<Orbix-write path=\"src/Highlands.tsx\" description=\"Use ＜a＞ tags.\">\nconst x = <div>a</div>;\n</Orbix-write>\nAFTER TAG\n";
        assert_eq!(sanitize(input), expected);
    }

    #[test]
    fn test_quoted_directive_in_body_is_untouched() {
        let input = r#"<Orbix-write path="docs.md">Example: <Orbix-delete path="x>y"></Orbix-delete> done</Orbix-write>"#;
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn test_scanning_resumes_after_closing_tag() {
        let input = r#"<Orbix-write path="a.md">use <Orbix-x a="<b>"></Orbix-write> <Orbix-delete path="<d>"></Orbix-delete>"#;
        let expected = r#"<Orbix-write path="a.md">use <Orbix-x a="<b>"></Orbix-write> <Orbix-delete path="＜d＞"></Orbix-delete>"#;
        assert_eq!(sanitize(input), expected);
    }

    #[test]
    fn test_unclosed_directive_keeps_scanning() {
        let input = r#"<Orbix-write path="a.md">draft <Orbix-delete path="<d>"></Orbix-delete>"#;
        let expected = r#"<Orbix-write path="a.md">draft <Orbix-delete path="＜d＞"></Orbix-delete>"#;
        assert_eq!(sanitize(input), expected);
    }

    #[test]
    fn test_rename_and_delete_tags() {
        assert_eq!(
            sanitize(r#"<Orbix-rename from="src/<old>.tsx" to="src/<new>.tsx"></Orbix-rename>"#),
            r#"<Orbix-rename from="src/＜old＞.tsx" to="src/＜new＞.tsx"></Orbix-rename>"#
        );
        assert_eq!(
            sanitize(r#"<Orbix-delete path="src/<component>.tsx"></Orbix-delete>"#),
            r#"<Orbix-delete path="src/＜component＞.tsx"></Orbix-delete>"#
        );
    }

    #[test]
    fn test_content_outside_tags_untouched() {
        let input = r#"Some text with <regular> HTML tags. <Orbix-write path="test.tsx" description="With <nested> tags.">content</Orbix-write> More <html> here."#;
        let expected = r#"Some text with <regular> HTML tags. <Orbix-write path="test.tsx" description="With ＜nested＞ tags.">content</Orbix-write> More <html> here."#;
        assert_eq!(sanitize(input), expected);
    }

    #[test]
    fn test_no_offending_characters_borrows() {
        let input = r#"<Orbix-write path="src/file.tsx" description="Normal description">content</Orbix-write>"#;
        assert!(matches!(sanitize(input), Cow::Borrowed(_)));
        assert!(matches!(sanitize("plain prose"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_extra_space_before_close() {
        let input = r#"<Orbix-write path="a.tsx" description="x > y" >body</Orbix-write>"#;
        let expected = r#"<Orbix-write path="a.tsx" description="x ＞ y" >body</Orbix-write>"#;
        assert_eq!(sanitize(input), expected);
    }

    #[test]
    fn test_unterminated_value_left_alone() {
        let input = r#"<Orbix-write path="a.tsx" description="still <streaming"#;
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn test_idempotent() {
        let input = r#"<Orbix-write path="src/<c>.tsx" description="<a> and <b>">x</Orbix-write> <Orbix-delete path="<d>"></Orbix-delete>"#;
        let once = sanitize(input).into_owned();
        let twice = sanitize(&once).into_owned();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_restore_attribute() {
        assert_eq!(restore_attribute("Use ＜a＞ tags"), "Use <a> tags");
        assert!(matches!(restore_attribute("plain"), Cow::Borrowed(_)));
    }
}
