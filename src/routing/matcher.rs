//! Route matching logic.
//!
//! # Responsibilities
//! - Validate mount prefixes at registration time
//! - Match path prefixes on segment boundaries (case-sensitive)
//! - Compute the remainder a handler group sees after stripping
//!
//! # Design Decisions
//! - `/api/auth` matches `/api/auth` and `/api/auth/...`, never `/api/authx`
//! - An empty remainder is presented as `/`
//! - No regex to guarantee O(n) matching

use std::fmt;

use crate::routing::RoutingError;

/// Characters that would make a prefix ambiguous with axum path syntax or
/// with the query/fragment parts of a URI.
const RESERVED: &[char] = &['?', '#', '*', '{', '}'];

/// A validated, segment-aligned path prefix such as `/api/repos`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Prefix(String);

impl Prefix {
    /// Parse and validate a prefix.
    pub fn parse(raw: impl Into<String>) -> Result<Self, RoutingError> {
        let raw = raw.into();
        let invalid = |reason: &str| RoutingError::InvalidPrefix {
            prefix: raw.clone(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("prefix must not be empty"));
        }
        if !raw.starts_with('/') {
            return Err(invalid("prefix must start with '/'"));
        }
        if raw == "/" {
            return Err(invalid("root prefix would shadow every other mount"));
        }
        if raw.ends_with('/') {
            return Err(invalid("prefix must not end with '/'"));
        }
        if raw[1..].split('/').any(str::is_empty) {
            return Err(invalid("prefix must not contain empty segments"));
        }
        if let Some(c) = raw.chars().find(|c| RESERVED.contains(c) || c.is_whitespace()) {
            return Err(invalid(&format!("prefix must not contain {c:?}")));
        }

        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, used as the default mount name.
    pub fn last_segment(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns true if `path` lies under this prefix on a segment boundary.
    pub fn matches(&self, path: &str) -> bool {
        self.strip(path).is_some()
    }

    /// Strip this prefix from `path`.
    ///
    /// Returns the remainder including its leading `/`, or `/` when the path
    /// equals the prefix exactly. Returns `None` when the path is not under
    /// this prefix.
    pub fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.0.as_str())?;
        if rest.is_empty() {
            Some("/")
        } else if rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }

    /// Returns true if every path this prefix matches is also matched by
    /// `other`.
    pub fn is_covered_by(&self, other: &Prefix) -> bool {
        other.matches(&self.0)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Prefix {
    type Error = RoutingError;

    fn try_from(raw: &str) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}
