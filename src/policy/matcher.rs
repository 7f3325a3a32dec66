//! Path matching predicates.
//!
//! # Design Decisions
//! - Matching is case-sensitive (paths are case-sensitive)
//! - `Contains` is a plain substring test, so `/deals` also matches `/dealsweek`
//! - `Extension` is a substring test too, so `/app.js.map` counts as `.js`

/// A predicate over a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatcher {
    /// Path starts with the prefix.
    Prefix(String),
    /// Path contains the substring anywhere.
    Contains(String),
    /// Path contains any of the extensions.
    Extension(Vec<String>),
}

impl PathMatcher {
    /// Returns true if the path satisfies this predicate.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Prefix(prefix) => path.starts_with(prefix.as_str()),
            Self::Contains(needle) => path.contains(needle.as_str()),
            Self::Extension(exts) => exts.iter().any(|ext| path.contains(ext.as_str())),
        }
    }
}
