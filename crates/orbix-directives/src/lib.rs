//! Directive grammar for Orbix assistant responses.
//!
//! An assistant response is free-form prose with embedded directives such as
//! `<Orbix-write path="src/App.tsx">...</Orbix-write>`. This crate turns that
//! text into typed [`Directive`]s and supports rendering a response while it
//! is still streaming.
//!
//! # Pipeline
//!
//! 1. [`sanitize`] neutralizes `<` and `>` inside quoted attribute values so a
//!    description like `"use <a> tags"` cannot end the opening tag early.
//! 2. [`extract`] runs the table-driven grammar over the sanitized text and
//!    returns an [`Extraction`] with the directives in document order plus
//!    diagnostics for skipped malformed occurrences.
//! 3. While a response streams, [`close_unclosed`] appends synthetic closing
//!    tags to a copy of the prefix so every recognized tag is well-formed,
//!    and [`parse_content`] splits the result into renderable pieces with a
//!    [`TagState`] per directive.
//! 4. [`strip_directives`] removes directive markup to leave readable prose.
//!
//! All functions are pure and operate on borrowed text.
//!
//! # Example
//!
//! ```
//! use orbix_directives::{Directive, extract, sanitize};
//!
//! let response = r#"Done! <Orbix-write path="src\App.tsx" description="Use <a> tags">
//! export default App;
//! </Orbix-write>"#;
//!
//! let extraction = extract(&sanitize(response));
//! assert_eq!(
//!     extraction.directives,
//!     vec![Directive::Write {
//!         path: "src/App.tsx".to_owned(),
//!         content: "export default App;".to_owned(),
//!         description: Some("Use ＜a＞ tags".to_owned()),
//!     }]
//! );
//! ```

mod content;
mod directive;
mod extract;
mod grammar;
mod path;
mod sanitize;
mod stream;
mod strip;

pub use content::{ContentPiece, TagInfo, error_messages, parse_content};
pub use directive::{Directive, DirectiveKind};
pub use extract::{
    Diagnostic, Extraction, chat_summary, commands, delete_paths, dependency_packages, extract,
    rename_directives, search_replace_directives, sql_queries, write_directives,
};
pub use grammar::Attributes;
pub use path::canonicalize_path;
pub use sanitize::{restore_attribute, sanitize};
pub use stream::{
    RECOGNIZED_TAGS, StreamSnapshot, StreamState, TagState, close_unclosed, has_unclosed_write,
};
pub use strip::strip_directives;
