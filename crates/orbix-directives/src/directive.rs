//! Typed directives extracted from a response.

/// A structured instruction embedded in an assistant response.
///
/// Paths (`path`, `from`, `to`) are always canonical relative paths, see
/// [`canonicalize_path`](crate::canonicalize_path).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "type", rename_all = "kebab-case")
)]
pub enum Directive {
    /// Create or overwrite a file with the whole of `content`.
    Write {
        path: String,
        content: String,
        description: Option<String>,
    },
    /// Move a file or directory.
    Rename { from: String, to: String },
    /// Delete a file or directory.
    Delete { path: String },
    /// Install packages. Applied by an external installer.
    AddDependency { packages: Vec<String> },
    /// Run a SQL query. Executed by an external collaborator.
    ExecuteSql {
        content: String,
        description: Option<String>,
    },
    /// Patch an existing file. The payload is carried verbatim.
    SearchReplace {
        path: String,
        content: String,
        description: Option<String>,
    },
    /// Short summary of the chat, used as the commit subject.
    ChatSummary { text: String },
    /// UI command such as `rebuild`, `restart` or `refresh`.
    Command { kind: String },
}

impl Directive {
    /// The kind of this directive.
    #[must_use]
    pub fn kind(&self) -> DirectiveKind {
        match self {
            Self::Write { .. } => DirectiveKind::Write,
            Self::Rename { .. } => DirectiveKind::Rename,
            Self::Delete { .. } => DirectiveKind::Delete,
            Self::AddDependency { .. } => DirectiveKind::AddDependency,
            Self::ExecuteSql { .. } => DirectiveKind::ExecuteSql,
            Self::SearchReplace { .. } => DirectiveKind::SearchReplace,
            Self::ChatSummary { .. } => DirectiveKind::ChatSummary,
            Self::Command { .. } => DirectiveKind::Command,
        }
    }
}

/// Directive kinds and their wire tag names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "kebab-case")
)]
pub enum DirectiveKind {
    Write,
    Rename,
    Delete,
    AddDependency,
    ExecuteSql,
    SearchReplace,
    ChatSummary,
    Command,
}

impl DirectiveKind {
    /// Every kind, in table order.
    pub const ALL: [Self; 8] = [
        Self::Write,
        Self::Rename,
        Self::Delete,
        Self::AddDependency,
        Self::ExecuteSql,
        Self::SearchReplace,
        Self::ChatSummary,
        Self::Command,
    ];

    /// Tag name used on the wire, e.g. `Orbix-write`.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Write => "Orbix-write",
            Self::Rename => "Orbix-rename",
            Self::Delete => "Orbix-delete",
            Self::AddDependency => "Orbix-add-dependency",
            Self::ExecuteSql => "Orbix-execute-sql",
            Self::SearchReplace => "Orbix-search-replace",
            Self::ChatSummary => "Orbix-chat-summary",
            Self::Command => "Orbix-command",
        }
    }

    /// Whether applying this kind mutates the working tree.
    #[must_use]
    pub fn mutates_files(self) -> bool {
        matches!(self, Self::Write | Self::Rename | Self::Delete)
    }
}

impl std::fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}
