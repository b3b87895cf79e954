//! Path matching for base-relative request paths.
//!
//! # Responsibilities
//! - Match the post-base remainder of a request path
//! - Exact string match or regular expression match
//!
//! # Design Decisions
//! - Literal matches compare normalized paths, so `/x/` and `/x` are equal
//! - Patterns are compiled once at construction and tested unanchored,
//!   the caller anchors them if needed
//! - Matching never allocates beyond the request path itself

use regex::Regex;

use crate::error::SetupError;
use crate::routing::path::normalize;

/// A literal or pattern condition on the base-relative path.
#[derive(Debug, Clone)]
pub enum PathMatch {
    /// Exact equality with a normalized literal path.
    Exact(String),
    /// Regular expression tested against the remainder.
    Pattern(Regex),
}

impl PathMatch {
    /// Create a literal matcher.
    pub fn exact(path: impl AsRef<str>) -> Self {
        Self::Exact(normalize(path.as_ref()))
    }

    /// Compile a pattern matcher.
    pub fn pattern(pattern: &str) -> Result<Self, SetupError> {
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|source| SetupError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Returns true if the base-relative remainder satisfies this condition.
    pub fn matches(&self, remainder: &str) -> bool {
        match self {
            PathMatch::Exact(expected) => remainder == expected,
            PathMatch::Pattern(re) => re.is_match(remainder),
        }
    }
}

impl std::fmt::Display for PathMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathMatch::Exact(path) => write!(f, "'{}'", path),
            PathMatch::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl From<Regex> for PathMatch {
    fn from(re: Regex) -> Self {
        Self::Pattern(re)
    }
}
