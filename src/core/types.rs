//! core::types
//!
//! Strong types for branch and commit concepts.
//!
//! # Types
//!
//! - [`BranchName`] - Validated Irmin branch name
//! - [`Info`] - Commit metadata attached to a mutation
//! - [`CommitRef`] - Hash returned by a mutation
//! - [`Commit`] / [`CommitInfo`] - Head commit details
//! - [`BranchInfo`] - Result of a branch `info` query
//!
//! # Examples
//!
//! ```
//! use irmin_client::core::types::{BranchName, Info};
//!
//! let branch = BranchName::new("feature/tree-sync").unwrap();
//! assert_eq!(branch.as_str(), "feature/tree-sync");
//! assert!(BranchName::new("has space").is_err());
//!
//! let info = Info::new("import fixtures").author("ci");
//! assert_eq!(info.message.as_deref(), Some("import fixtures"));
//! ```

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::client::errors::IrminError;

/// A validated branch name.
///
/// Irmin accepts ASCII letters, digits and `-`, `_`, `.`, `/`.
/// Surrounding whitespace is trimmed before validation.
///
/// # Example
///
/// ```
/// use irmin_client::core::types::BranchName;
///
/// assert_eq!(BranchName::new("  main ").unwrap().as_str(), "main");
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("a:b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `IrminError::InvalidArgument` if the name is empty or
    /// contains characters Irmin rejects.
    pub fn new(name: impl AsRef<str>) -> Result<Self, IrminError> {
        let name = name.as_ref().trim();
        Self::validate(name)?;
        Ok(Self(name.to_string()))
    }

    fn validate(name: &str) -> Result<(), IrminError> {
        if name.is_empty() {
            return Err(IrminError::InvalidArgument(
                "branch name cannot be empty".into(),
            ));
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/')))
        {
            return Err(IrminError::InvalidArgument(format!(
                "branch name '{}' contains invalid character {:?}",
                name, c
            )));
        }
        Ok(())
    }

    /// The `main` branch.
    pub fn main() -> Self {
        Self("main".to_string())
    }

    /// The `master` branch, the default of older Irmin stores.
    pub fn master() -> Self {
        Self("master".to_string())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = IrminError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for BranchName {
    type Error = IrminError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Commit metadata sent with a mutation (GraphQL `InfoInput`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    /// Commit author
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Commit message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Info {
    /// Info carrying a commit message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            author: None,
            message: Some(message.into()),
        }
    }

    /// Set the author.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// A commit identified by its hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitRef {
    /// Commit hash as rendered by the endpoint
    pub hash: String,
}

/// Metadata recorded with a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Commit message
    #[serde(default)]
    pub message: String,
    /// Commit author
    #[serde(default)]
    pub author: String,
    /// Seconds since the Unix epoch, as reported by the endpoint
    #[serde(default, deserialize_with = "string_or_number")]
    pub date: String,
}

impl CommitInfo {
    /// Commit date as a UTC timestamp, if `date` holds epoch seconds.
    ///
    /// # Example
    ///
    /// ```
    /// use irmin_client::core::types::CommitInfo;
    ///
    /// let info = CommitInfo {
    ///     message: "init".into(),
    ///     author: "me".into(),
    ///     date: "1700000000".into(),
    /// };
    /// assert_eq!(info.timestamp().unwrap().to_rfc3339(), "2023-11-14T22:13:20+00:00");
    /// ```
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let secs: i64 = self.date.trim().parse().ok()?;
        DateTime::from_timestamp(secs, 0)
    }
}

/// A commit with its metadata and parents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Commit hash
    pub hash: String,
    /// Message, author and date
    pub info: CommitInfo,
    /// Parent commits, empty for a root commit
    #[serde(default)]
    pub parents: Vec<CommitRef>,
}

/// Branch name and head commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchInfo {
    /// Branch name
    pub name: String,
    /// `None` for a branch with no commits yet
    #[serde(default)]
    pub head: Option<Commit>,
}

/// Irmin serializes `Int64` values as strings, older servers as numbers.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected a string or number date, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod branch_name {
        use super::*;

        #[test]
        fn valid_branch_names() {
            assert!(BranchName::new("main").is_ok());
            assert!(BranchName::new("master").is_ok());
            assert!(BranchName::new("feature/foo").is_ok());
            assert!(BranchName::new("fix-123").is_ok());
            assert!(BranchName::new("snake_case").is_ok());
            assert!(BranchName::new("with.dot").is_ok());
        }

        #[test]
        fn whitespace_is_trimmed() {
            assert_eq!(BranchName::new("\ttesting\n").unwrap().as_str(), "testing");
        }

        #[test]
        fn empty_name_rejected() {
            assert!(BranchName::new("").is_err());
            assert!(BranchName::new("   ").is_err());
        }

        #[test]
        fn invalid_chars_rejected() {
            for name in ["has space", "a:b", "q?", "star*", "naïve"] {
                let err = BranchName::new(name).unwrap_err();
                assert!(matches!(err, IrminError::InvalidArgument(_)), "{name}");
            }
        }

        #[test]
        fn serde_roundtrip() {
            let name = BranchName::new("feature/x").unwrap();
            let json = serde_json::to_string(&name).unwrap();
            assert_eq!(json, r#""feature/x""#);
            let parsed: BranchName = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, name);
        }

        #[test]
        fn serde_rejects_invalid() {
            assert!(serde_json::from_str::<BranchName>(r#""bad name""#).is_err());
        }
    }

    mod info {
        use super::*;

        #[test]
        fn skips_unset_fields() {
            assert_eq!(serde_json::to_value(Info::default()).unwrap(), json!({}));
            assert_eq!(
                serde_json::to_value(Info::new("msg").author("me")).unwrap(),
                json!({"author": "me", "message": "msg"})
            );
        }
    }

    mod commit {
        use super::*;

        #[test]
        fn branch_info_deserializes() {
            let info: BranchInfo = serde_json::from_value(json!({
                "name": "main",
                "head": {
                    "hash": "abc",
                    "info": {"message": "m", "author": "a", "date": "1700000000"},
                    "parents": [{"hash": "p1"}, {"hash": "p2"}]
                }
            }))
            .unwrap();
            let head = info.head.unwrap();
            assert_eq!(head.hash, "abc");
            assert_eq!(head.parents.len(), 2);
            assert!(head.info.timestamp().is_some());
        }

        #[test]
        fn branch_without_head() {
            let info: BranchInfo =
                serde_json::from_value(json!({"name": "empty", "head": null})).unwrap();
            assert!(info.head.is_none());
        }

        #[test]
        fn numeric_date_accepted() {
            let info: CommitInfo =
                serde_json::from_value(json!({"message": "", "author": "", "date": 42}))
                    .unwrap();
            assert_eq!(info.date, "42");
            assert_eq!(info.timestamp().unwrap().timestamp(), 42);
        }

        #[test]
        fn unparseable_date_has_no_timestamp() {
            let info: CommitInfo =
                serde_json::from_value(json!({"message": "", "author": "", "date": "soon"}))
                    .unwrap();
            assert!(info.timestamp().is_none());
        }
    }
}
