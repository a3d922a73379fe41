//! core::tree
//!
//! Conversion between nested trees and flat leaf lists.
//!
//! # Forms
//!
//! Callers work with a nested [`TreeNode`]: a directory maps names to
//! children, a leaf holds [`Contents`]. The wire form used by bulk tree
//! reads and writes is a flat list of [`FlatEntry`] records, each tagged
//! with the canonical rendering of its full path.
//!
//! In JSON a leaf is a mapping with a string `value` and an optional
//! `metadata`, and nothing else. A mapping that mixes `value` with child
//! names is rejected rather than read as either form.
//!
//! # Invariants
//!
//! - [`flatten`] emits exactly one entry per reachable leaf, in map order,
//!   and fails rather than emit a path twice or under another leaf
//! - [`unflatten`] never silently drops data: a path that is both a leaf
//!   and a directory is a [`IrminError::StructuralConflict`]
//! - `unflatten(flatten(t)) == t` for any tree without empty directories
//!   whose map keys are single segments
//!
//! # Example
//!
//! ```
//! use irmin_client::core::tree::{flatten, unflatten, TreeNode};
//!
//! let tree: TreeNode = serde_json::from_str(
//!     r#"{"aaa": {"value": "bbb"}, "a": {"b": {"c": {"value": "123"}}}}"#,
//! ).unwrap();
//!
//! let entries = flatten(&tree).unwrap();
//! let keys: Vec<_> = entries.iter().map(|e| e.key.as_str()).collect();
//! assert_eq!(keys, ["a/b/c", "aaa"]);
//!
//! assert_eq!(unflatten(entries).unwrap(), tree);
//! ```

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::key::PathKey;
use crate::client::errors::IrminError;

/// Value stored at a leaf.
///
/// Unknown fields are rejected, so a mapping carrying both a `value` and
/// children is not mistaken for a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Contents {
    /// Stored value
    pub value: String,
    /// Optional metadata attached to the value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

impl Contents {
    /// Contents without metadata.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            metadata: None,
        }
    }

    /// Attach metadata.
    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }
}

/// A subtree of the store.
///
/// Serializes to and from the nested JSON form, with leaves recognized
/// by their `value` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// A stored value
    Leaf(Contents),
    /// Named children
    Directory(BTreeMap<String, TreeNode>),
}

impl Default for TreeNode {
    fn default() -> Self {
        TreeNode::Directory(BTreeMap::new())
    }
}

impl TreeNode {
    /// An empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// A leaf holding `value`.
    pub fn leaf(value: impl Into<String>) -> Self {
        TreeNode::Leaf(Contents::new(value))
    }

    /// Check if this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf(_))
    }

    /// Check if this node is a directory with no children.
    pub fn is_empty(&self) -> bool {
        matches!(self, TreeNode::Directory(children) if children.is_empty())
    }

    /// Contents of a leaf.
    pub fn contents(&self) -> Option<&Contents> {
        match self {
            TreeNode::Leaf(contents) => Some(contents),
            TreeNode::Directory(_) => None,
        }
    }

    /// Children of a directory.
    pub fn children(&self) -> Option<&BTreeMap<String, TreeNode>> {
        match self {
            TreeNode::Leaf(_) => None,
            TreeNode::Directory(children) => Some(children),
        }
    }

    /// Look up the node at `key` relative to this node.
    pub fn get(&self, key: impl Into<PathKey>) -> Option<&TreeNode> {
        let key = key.into();
        let mut node = self;
        for segment in key.segments() {
            node = node.children()?.get(segment)?;
        }
        Some(node)
    }

    /// Insert a leaf at `key`, creating directories along the way.
    ///
    /// # Errors
    ///
    /// `StructuralConflict` if `key` is the root, if a prefix of `key` is
    /// already a leaf, or if `key` itself is already a directory.
    pub fn insert(
        &mut self,
        key: impl Into<PathKey>,
        contents: Contents,
    ) -> Result<(), IrminError> {
        let key = key.into();
        let conflict = |upto: usize| IrminError::StructuralConflict {
            path: PathKey::from_segments(&key.segments()[..upto]).render(),
        };

        let Some((last, parents)) = key.segments().split_last() else {
            return Err(conflict(0));
        };

        let mut node = self;
        for (depth, segment) in parents.iter().enumerate() {
            let TreeNode::Directory(children) = node else {
                return Err(conflict(depth));
            };
            node = children
                .entry(segment.clone())
                .or_insert_with(TreeNode::new);
        }

        let TreeNode::Directory(children) = node else {
            return Err(conflict(parents.len()));
        };
        match children.entry(last.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(TreeNode::Leaf(contents));
            }
            Entry::Occupied(mut slot) => {
                if !slot.get().is_leaf() {
                    return Err(conflict(key.len()));
                }
                slot.insert(TreeNode::Leaf(contents));
            }
        }
        Ok(())
    }
}

/// Wire form of a single leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatEntry {
    /// Canonical full path of the leaf
    #[serde(alias = "path")]
    pub key: String,
    /// Stored value
    pub value: String,
    /// Metadata, sent as `null` when absent
    #[serde(default)]
    pub metadata: Option<String>,
}

impl FlatEntry {
    /// Build an entry, rendering `key` canonically.
    pub fn new(key: impl Into<PathKey>, contents: Contents) -> Self {
        Self {
            key: key.into().render(),
            value: contents.value,
            metadata: contents.metadata,
        }
    }

    /// The entry's key as a [`PathKey`].
    pub fn path(&self) -> PathKey {
        PathKey::parse(&self.key)
    }
}

/// Flatten a tree into one entry per leaf.
///
/// Map keys containing `/` contribute several segments, so
/// `{"a/b": {"value": "x"}}` produces the key `a/b`.
///
/// # Errors
///
/// - `InvalidArgument` if a leaf sits at the root path, which has no key
///   to write it under
/// - `StructuralConflict` if split map keys make two leaves share a path,
///   or put one leaf underneath another (`{"a": .., "a/b": ..}`)
pub fn flatten(tree: &TreeNode) -> Result<Vec<FlatEntry>, IrminError> {
    let mut entries = Vec::new();
    let mut emitted = TreeNode::new();
    flatten_into(tree, &PathKey::root(), &mut entries, &mut emitted)?;
    Ok(entries)
}

fn flatten_into(
    node: &TreeNode,
    prefix: &PathKey,
    entries: &mut Vec<FlatEntry>,
    emitted: &mut TreeNode,
) -> Result<(), IrminError> {
    match node {
        TreeNode::Leaf(contents) => {
            if prefix.is_root() {
                return Err(IrminError::InvalidArgument(
                    "tree leaf has an empty key".into(),
                ));
            }
            if emitted.get(prefix).is_some() {
                return Err(IrminError::StructuralConflict {
                    path: prefix.render(),
                });
            }
            emitted.insert(prefix, Contents::new(""))?;
            entries.push(FlatEntry::new(prefix, contents.clone()));
        }
        TreeNode::Directory(children) => {
            for (name, child) in children {
                flatten_into(child, &prefix.append(name), entries, emitted)?;
            }
        }
    }
    Ok(())
}

/// Rebuild a nested tree from flat entries.
///
/// A later entry for the same leaf path replaces an earlier one.
///
/// # Errors
///
/// `StructuralConflict` if a path is used both as a leaf and as a
/// directory, or if an entry's key is the root.
pub fn unflatten<I>(entries: I) -> Result<TreeNode, IrminError>
where
    I: IntoIterator<Item = FlatEntry>,
{
    let mut tree = TreeNode::new();
    for entry in entries {
        let key = entry.path();
        tree.insert(
            key,
            Contents {
                value: entry.value,
                metadata: entry.metadata,
            },
        )?;
    }
    Ok(tree)
}
