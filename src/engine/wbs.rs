//! WBS Path Model: dot-separated hierarchical task identifiers.
//!
//! `"1"` is a root, `"1.2"` a child of `"1"`, `"1.2.3"` a grandchild.
//! Segments are arbitrary non-empty tokens; they are usually numeric but
//! nothing here depends on that.

use super::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const SEPARATOR: char = '.';

/// Splits a path into its segments.
///
/// # Errors
/// Returns `InvalidPath` for an empty string or any empty segment.
pub fn segments(path: &str) -> Result<Vec<&str>, EngineError> {
    if path.is_empty() {
        return Err(EngineError::InvalidPath(path.to_string()));
    }
    let parts: Vec<&str> = path.split(SEPARATOR).collect();
    if parts.iter().any(|s| s.is_empty()) {
        return Err(EngineError::InvalidPath(path.to_string()));
    }
    Ok(parts)
}

/// True if the path has exactly one segment.
#[must_use]
pub fn is_root(path: &str) -> bool {
    !path.contains(SEPARATOR)
}

/// The path with its last segment removed, or `None` for a root.
#[must_use]
pub fn parent(path: &str) -> Option<&str> {
    path.rfind(SEPARATOR).map(|i| &path[..i])
}

/// First segment of the path.
#[must_use]
pub fn root_of(path: &str) -> &str {
    path.split(SEPARATOR).next().unwrap_or(path)
}

/// Every strict ancestor, nearest first: `"1.2.3"` gives `["1.2", "1"]`.
#[must_use]
pub fn ancestors(path: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut current = path;
    while let Some(p) = parent(current) {
        out.push(p);
        current = p;
    }
    out
}

/// True iff `path` is `ancestor` followed by `"."` and a non-empty suffix.
///
/// `"1.2"` descends from `"1"`; `"12"` does not.
#[must_use]
pub fn is_descendant_of(path: &str, ancestor: &str) -> bool {
    path.strip_prefix(ancestor)
        .and_then(|rest| rest.strip_prefix(SEPARATOR))
        .is_some_and(|suffix| !suffix.is_empty())
}

/// Prefix shared by every descendant of `path`.
#[must_use]
pub fn descendant_prefix(path: &str) -> String {
    format!("{path}{SEPARATOR}")
}

/// A WBS path that has passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WbsPath(String);

impl WbsPath {
    /// Validates and wraps a path.
    ///
    /// # Errors
    /// Returns `InvalidPath` if the path is empty or has an empty segment.
    pub fn parse(path: &str) -> Result<Self, EngineError> {
        segments(path)?;
        Ok(Self(path.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.matches(SEPARATOR).count() + 1
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        is_root(&self.0)
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        parent(&self.0).map(|p| Self(p.to_string()))
    }

    #[must_use]
    pub fn root(&self) -> Self {
        Self(root_of(&self.0).to_string())
    }

    #[must_use]
    pub fn is_descendant_of(&self, ancestor: &Self) -> bool {
        is_descendant_of(&self.0, &ancestor.0)
    }

    /// Appends a child segment.
    ///
    /// # Errors
    /// Returns `InvalidPath` if the segment is empty or contains a separator.
    pub fn child(&self, segment: &str) -> Result<Self, EngineError> {
        if segment.is_empty() || segment.contains(SEPARATOR) {
            return Err(EngineError::InvalidPath(format!("{}{SEPARATOR}{segment}", self.0)));
        }
        Ok(Self(format!("{}{SEPARATOR}{segment}", self.0)))
    }
}

impl fmt::Display for WbsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for WbsPath {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WbsPath {
    type Error = EngineError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        segments(&s)?;
        Ok(Self(s))
    }
}

impl From<WbsPath> for String {
    fn from(p: WbsPath) -> Self {
        p.0
    }
}

impl AsRef<str> for WbsPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_split_on_dot() {
        assert_eq!(segments("1.2.3").unwrap(), vec!["1", "2", "3"]);
        assert_eq!(segments("design").unwrap(), vec!["design"]);
    }

    #[test]
    fn test_segments_reject_empty() {
        for bad in ["", ".", "1.", ".1", "1..2"] {
            assert_eq!(
                segments(bad),
                Err(EngineError::InvalidPath(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_root_and_parent() {
        assert!(is_root("1"));
        assert!(!is_root("1.2"));
        assert_eq!(parent("1"), None);
        assert_eq!(parent("1.2"), Some("1"));
        assert_eq!(parent("1.2.3"), Some("1.2"));
        assert_eq!(root_of("1.2.3"), "1");
        assert_eq!(root_of("7"), "7");
    }

    #[test]
    fn test_ancestors_nearest_first() {
        assert_eq!(ancestors("1.2.3"), vec!["1.2", "1"]);
        assert!(ancestors("1").is_empty());
    }

    #[test]
    fn test_descendant_requires_dot_boundary() {
        assert!(is_descendant_of("1.2", "1"));
        assert!(is_descendant_of("1.2.3", "1"));
        assert!(is_descendant_of("1.2.3", "1.2"));
        assert!(!is_descendant_of("12", "1"));
        assert!(!is_descendant_of("1", "1"));
        assert!(!is_descendant_of("1.", "1"));
        assert!(!is_descendant_of("2.1", "1"));
    }

    #[test]
    fn test_wbs_path_newtype() {
        let p: WbsPath = "1.4.2".parse().unwrap();
        assert_eq!(p.depth(), 3);
        assert_eq!(p.root().as_str(), "1");
        assert_eq!(p.parent().unwrap().as_str(), "1.4");
        assert!(p.is_descendant_of(&WbsPath::parse("1").unwrap()));
        assert!("1..2".parse::<WbsPath>().is_err());

        let child = p.root().child("9").unwrap();
        assert_eq!(child.to_string(), "1.9");
        assert!(p.child("").is_err());
        assert!(p.child("a.b").is_err());
    }

    #[test]
    fn test_wbs_path_serde_validates() {
        let ok: WbsPath = serde_json::from_str("\"2.1\"").unwrap();
        assert_eq!(ok.as_str(), "2.1");
        assert!(serde_json::from_str::<WbsPath>("\"2..1\"").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "\"2.1\"");
    }
}
