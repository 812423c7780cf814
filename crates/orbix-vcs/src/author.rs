//! Commit authorship.

/// Default author name for commits made on behalf of the assistant.
const DEFAULT_NAME: &str = "[Orbix]";

/// Default author email.
const DEFAULT_EMAIL: &str = "git@orbix.sh";

/// Name and email recorded as commit author and committer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl Default for Author {
    fn default() -> Self {
        Self::new(DEFAULT_NAME, DEFAULT_EMAIL)
    }
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Supplies the author for the next commit.
pub trait AuthorProvider: Send + Sync {
    fn author(&self) -> Author;
}

impl AuthorProvider for Author {
    fn author(&self) -> Author {
        self.clone()
    }
}
