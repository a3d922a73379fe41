//! core::key
//!
//! Canonical representation of hierarchical keys.
//!
//! # Normalization
//!
//! A [`PathKey`] is an ordered list of non-empty segments that never
//! contain the separator. Any input normalizes to some valid key:
//! leading, trailing and repeated separators are dropped, so
//! `"a/b/c"`, `"/a/b/c/"`, `"a//b/c"` and `["a", "b", "c"]` are the
//! same key.
//!
//! The empty key is the root of the store. It renders as [`ROOT_TOKEN`]
//! rather than an empty string, so a request variable can never turn
//! into `""` by accident when the whole tree is meant.
//!
//! # Example
//!
//! ```
//! use irmin_client::PathKey;
//!
//! let key = PathKey::parse("/a//b/c/");
//! assert_eq!(key.segments(), ["a", "b", "c"]);
//! assert_eq!(key.render(), "a/b/c");
//! assert_eq!(key, PathKey::from(["a", "b", "c"]));
//!
//! assert!(PathKey::parse("/").is_root());
//! assert_eq!(PathKey::root().render(), "/");
//! ```

use std::fmt;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::client::errors::IrminError;

/// Separator between key segments.
pub const SEPARATOR: char = '/';

/// Rendering of the root key.
pub const ROOT_TOKEN: &str = "/";

/// A normalized hierarchical key.
///
/// Values are immutable; [`PathKey::append`] returns a new key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathKey {
    segments: Vec<String>,
}

impl PathKey {
    /// The root key (no segments).
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a slash-delimited key string.
    pub fn parse(input: &str) -> Self {
        Self {
            segments: split_segments(input).collect(),
        }
    }

    /// Build a key from an ordered list of segments.
    ///
    /// Segments that themselves contain the separator are split, and
    /// empty segments are dropped.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            segments: segments
                .into_iter()
                .flat_map(|s| split_segments(s.as_ref()).collect::<Vec<_>>())
                .collect(),
        }
    }

    /// The normalized segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if this is the root key.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Alias of [`PathKey::is_root`].
    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    /// Final segment, `None` for the root.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Key without its final segment, `None` for the root.
    pub fn parent(&self) -> Option<PathKey> {
        if self.is_root() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Return a new key with `segment` appended.
    ///
    /// `segment` is normalized like any other input, so `"x/y"` appends
    /// two segments and `""` appends nothing.
    pub fn append(&self, segment: impl AsRef<str>) -> PathKey {
        let mut segments = self.segments.clone();
        segments.extend(split_segments(segment.as_ref()));
        Self { segments }
    }

    /// Return a new key with every segment of `other` appended.
    pub fn join(&self, other: &PathKey) -> PathKey {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// Canonical string form: segments joined by `/`, or [`ROOT_TOKEN`].
    pub fn render(&self) -> String {
        if self.segments.is_empty() {
            ROOT_TOKEN.to_string()
        } else {
            self.segments.join("/")
        }
    }
}

fn split_segments(input: &str) -> impl Iterator<Item = String> + '_ {
    input
        .trim_matches(SEPARATOR)
        .split(SEPARATOR)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl From<&str> for PathKey {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for PathKey {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&String> for PathKey {
    fn from(s: &String) -> Self {
        Self::parse(s)
    }
}

impl From<&PathKey> for PathKey {
    fn from(k: &PathKey) -> Self {
        k.clone()
    }
}

impl From<Vec<String>> for PathKey {
    fn from(v: Vec<String>) -> Self {
        Self::from_segments(v)
    }
}

impl From<&[&str]> for PathKey {
    fn from(v: &[&str]) -> Self {
        Self::from_segments(v)
    }
}

impl<const N: usize> From<[&str; N]> for PathKey {
    fn from(v: [&str; N]) -> Self {
        Self::from_segments(v)
    }
}

impl From<Option<&str>> for PathKey {
    fn from(s: Option<&str>) -> Self {
        s.map(Self::parse).unwrap_or_default()
    }
}

impl TryFrom<&serde_json::Value> for PathKey {
    type Error = IrminError;

    /// Accept a JSON string or array of strings; `null` is the root.
    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(Self::root()),
            Value::String(s) => Ok(Self::parse(s)),
            Value::Array(items) => {
                let segments = items
                    .iter()
                    .map(|item| {
                        item.as_str().ok_or_else(|| {
                            IrminError::InvalidArgument(format!(
                                "key segment must be a string, got {}",
                                item
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::from_segments(segments))
            }
            other => Err(IrminError::InvalidArgument(format!(
                "key must be a string or a list of strings, got {}",
                other
            ))),
        }
    }
}

impl Serialize for PathKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.render())
    }
}

impl<'de> Deserialize<'de> for PathKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PathKeyVisitor;

        impl<'de> Visitor<'de> for PathKeyVisitor {
            type Value = PathKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a key string or a list of key segments")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<PathKey, E> {
                Ok(PathKey::parse(v))
            }

            fn visit_unit<E: de::Error>(self) -> Result<PathKey, E> {
                Ok(PathKey::root())
            }

            fn visit_none<E: de::Error>(self) -> Result<PathKey, E> {
                Ok(PathKey::root())
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<PathKey, A::Error> {
                let mut segments: Vec<String> = Vec::new();
                while let Some(segment) = seq.next_element::<String>()? {
                    segments.push(segment);
                }
                Ok(PathKey::from_segments(segments))
            }
        }

        deserializer.deserialize_any(PathKeyVisitor)
    }
}
