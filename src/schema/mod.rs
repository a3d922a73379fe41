//! schema
//!
//! GraphQL dialects spoken by Irmin endpoints.
//!
//! # Architecture
//!
//! Field names and nesting changed across irmin-graphql revisions (for
//! example `get_tree` returning a flat list on the branch versus a nested
//! `tree.get_tree(..).list_contents_recursively`). Everything that varies
//! lives in a [`Schema`]: per operation, the query text, the path of the
//! result inside `data`, and how the root key is sent. The client and
//! branch handles only ever ask the schema, so supporting a new revision
//! means adding one dialect module.
//!
//! A `Schema` is built once, shared through the client, and never
//! mutated. Clients with different dialects can coexist.
//!
//! # Dialects
//!
//! - [`SchemaVersion::Flat`]: flat tree listing on the branch (default)
//! - [`SchemaVersion::Recursive`]: tree reads through `branch.tree`
//!
//! # Example
//!
//! ```
//! use irmin_client::schema::{OperationKind, RootKey, Schema, SchemaVersion};
//! use irmin_client::PathKey;
//!
//! let schema = Schema::for_version(SchemaVersion::Recursive);
//! let op = schema.operation(OperationKind::GetTree);
//! assert_eq!(op.root_key, RootKey::Null);
//! assert!(op.key_variable(&PathKey::root()).is_null());
//! ```

mod flat;
mod recursive;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::errors::IrminError;
use crate::core::key::PathKey;

/// Supported schema dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// Flat `get_tree` list on the branch; `list` through `head.node`
    #[default]
    Flat,
    /// Tree reads through `branch.tree`, recursive listing for `get_tree`
    Recursive,
}

impl SchemaVersion {
    /// Get all supported versions.
    pub fn all() -> &'static [SchemaVersion] {
        &[SchemaVersion::Flat, SchemaVersion::Recursive]
    }

    /// Get the version name as used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            SchemaVersion::Flat => "flat",
            SchemaVersion::Recursive => "recursive",
        }
    }

    /// Parse a version name.
    ///
    /// # Example
    ///
    /// ```
    /// use irmin_client::schema::SchemaVersion;
    ///
    /// assert_eq!(SchemaVersion::parse("Recursive"), Some(SchemaVersion::Recursive));
    /// assert_eq!(SchemaVersion::parse("v3"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "flat" => Some(SchemaVersion::Flat),
            "recursive" => Some(SchemaVersion::Recursive),
            _ => None,
        }
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Operations a schema must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Get,
    GetContents,
    GetTree,
    Set,
    SetContents,
    SetTree,
    UpdateTree,
    Remove,
    Merge,
    Push,
    Pull,
    Revert,
    Clone,
    BranchInfo,
    List,
    Branches,
}

impl OperationKind {
    /// Every operation, in declaration order.
    pub const ALL: [OperationKind; 16] = [
        OperationKind::Get,
        OperationKind::GetContents,
        OperationKind::GetTree,
        OperationKind::Set,
        OperationKind::SetContents,
        OperationKind::SetTree,
        OperationKind::UpdateTree,
        OperationKind::Remove,
        OperationKind::Merge,
        OperationKind::Push,
        OperationKind::Pull,
        OperationKind::Revert,
        OperationKind::Clone,
        OperationKind::BranchInfo,
        OperationKind::List,
        OperationKind::Branches,
    ];
}

/// How an operation expects the root key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootKey {
    /// Send the root token `"/"`
    #[default]
    Token,
    /// Send `null`; the query declares the key nullable
    Null,
}

/// One query or mutation of a dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// GraphQL operation name, sent as `operationName`
    pub name: &'static str,
    /// Query text
    pub text: &'static str,
    /// Field path from `data` to the operation's result
    pub result_path: &'static [&'static str],
    /// Root key sentinel expected by `text`
    pub root_key: RootKey,
}

impl Operation {
    /// Encode `key` as a request variable for this operation.
    pub fn key_variable(&self, key: &PathKey) -> Value {
        if key.is_root() && self.root_key == RootKey::Null {
            Value::Null
        } else {
            Value::String(key.render())
        }
    }
}

/// Query table and response adapter for one dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    version: SchemaVersion,
    operations: Vec<Operation>,
}

impl Schema {
    /// Build the schema for `version`.
    pub fn for_version(version: SchemaVersion) -> Self {
        let operation = match version {
            SchemaVersion::Flat => flat::operation,
            SchemaVersion::Recursive => recursive::operation,
        };
        Self {
            version,
            operations: OperationKind::ALL.iter().map(|&k| operation(k)).collect(),
        }
    }

    /// The dialect this schema implements.
    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// Look up an operation.
    pub fn operation(&self, kind: OperationKind) -> &Operation {
        &self.operations[kind as usize]
    }

    /// Replace one operation, e.g. to target a server that renamed a field.
    pub fn with_operation(mut self, kind: OperationKind, operation: Operation) -> Self {
        self.operations[kind as usize] = operation;
        self
    }

    /// Walk `data` down the operation's result path.
    ///
    /// A `null` anywhere along the path yields `null`: the endpoint has
    /// explicitly reported that nothing is there.
    ///
    /// # Errors
    ///
    /// `Protocol` if a field on the path is missing or is not an object.
    pub fn extract<'a>(&self, kind: OperationKind, data: &'a Value) -> Result<&'a Value, IrminError> {
        let op = self.operation(kind);
        let mut current = data;
        for (depth, field) in op.result_path.iter().enumerate() {
            current = match current {
                Value::Null => return Ok(current),
                Value::Object(map) => map.get(*field).ok_or_else(|| IrminError::Protocol {
                    message: format!(
                        "{} response is missing field '{}'",
                        op.name,
                        op.result_path[..=depth].join(".")
                    ),
                    body: data.to_string(),
                })?,
                _ => {
                    return Err(IrminError::Protocol {
                        message: format!(
                            "{} response has a non-object at '{}'",
                            op.name,
                            op.result_path[..depth].join(".")
                        ),
                        body: data.to_string(),
                    })
                }
            };
        }
        Ok(current)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::for_version(SchemaVersion::default())
    }
}
