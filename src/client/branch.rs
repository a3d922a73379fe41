//! client::branch
//!
//! Operations scoped to one named branch.
//!
//! # Design
//!
//! A [`Branch`] is a client plus a branch name. Every operation sends the
//! name as the `branch` variable, asks the client's schema for the query
//! text and result path, and decodes the extracted result into a typed
//! value. The handle holds no other state, so clones are independent and
//! operations may run concurrently.
//!
//! Absence is not an error: reading a missing key yields `None`, a missing
//! subtree yields an empty [`TreeNode`], and a mutation whose result field
//! is `null` yields `None`. Remote and protocol errors always propagate.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::errors::IrminError;
use super::{decode, Client};
use crate::core::key::PathKey;
use crate::core::tree::{self, Contents, FlatEntry, TreeNode};
use crate::core::types::{BranchInfo, BranchName, CommitRef, Info};
use crate::schema::OperationKind;

/// Handle for one branch of the store.
#[derive(Debug, Clone)]
pub struct Branch {
    client: Client,
    name: BranchName,
}

/// One child as returned by a listing query.
#[derive(Deserialize)]
struct ListEntry {
    #[serde(alias = "path")]
    key: String,
    #[serde(default)]
    value: Option<String>,
}

impl Branch {
    /// Handle for `name` on `client`.
    pub fn new(client: Client, name: BranchName) -> Self {
        Self { client, name }
    }

    /// The branch name.
    pub fn name(&self) -> &BranchName {
        &self.name
    }

    /// The client this handle sends through.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Value stored at `key`, `None` if absent.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn run(client: irmin_client::Client) -> Result<(), irmin_client::IrminError> {
    /// let value = client.main().get("config/name").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get(&self, key: impl Into<PathKey>) -> Result<Option<String>, IrminError> {
        let key = key.into();
        let vars = self.key_vars(OperationKind::Get, &key);
        let result = self.run(OperationKind::Get, vars).await?;
        contents_value(result)
    }

    /// Value and metadata stored at `key`, `None` if absent.
    pub async fn get_contents(
        &self,
        key: impl Into<PathKey>,
    ) -> Result<Option<Contents>, IrminError> {
        let key = key.into();
        let vars = self.key_vars(OperationKind::GetContents, &key);
        let result = self.run(OperationKind::GetContents, vars).await?;
        if is_absent(&result) {
            return Ok(None);
        }
        decode("get_contents", result).map(Some)
    }

    /// Every leaf under `key` as a nested tree; empty if nothing is there.
    pub async fn get_tree(&self, key: impl Into<PathKey>) -> Result<TreeNode, IrminError> {
        let key = key.into();
        let vars = self.key_vars(OperationKind::GetTree, &key);
        let result = self.run(OperationKind::GetTree, vars).await?;
        if result.is_null() {
            return Ok(TreeNode::new());
        }
        let entries: Vec<FlatEntry> = decode("get_tree", result)?;
        tree::unflatten(entries)
    }

    /// Store `value` at `key`.
    ///
    /// Returns the new head, or `None` if the endpoint reported no commit.
    pub async fn set(
        &self,
        key: impl Into<PathKey>,
        value: impl Into<String>,
        info: Option<Info>,
    ) -> Result<Option<CommitRef>, IrminError> {
        let key = key.into();
        let mut vars = self.key_vars(OperationKind::Set, &key);
        vars.insert("value".into(), Value::String(value.into()));
        vars.insert("info".into(), info_variable(info)?);
        self.commit(OperationKind::Set, vars).await
    }

    /// Store `contents` (value and metadata) at `key`.
    pub async fn set_contents(
        &self,
        key: impl Into<PathKey>,
        contents: Contents,
        info: Option<Info>,
    ) -> Result<Option<CommitRef>, IrminError> {
        let key = key.into();
        let mut vars = self.key_vars(OperationKind::SetContents, &key);
        vars.insert("value".into(), Value::String(contents.value));
        vars.insert(
            "metadata".into(),
            contents.metadata.map_or(Value::Null, Value::String),
        );
        vars.insert("info".into(), info_variable(info)?);
        self.commit(OperationKind::SetContents, vars).await
    }

    /// Replace the subtree at `key` with `tree`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `tree` is a bare leaf, `StructuralConflict` if
    /// its keys collide once split on `/`. Both are raised before any
    /// request is sent.
    pub async fn set_tree(
        &self,
        key: impl Into<PathKey>,
        tree: &TreeNode,
        info: Option<Info>,
    ) -> Result<Option<CommitRef>, IrminError> {
        self.write_tree(OperationKind::SetTree, key.into(), tree, info)
            .await
    }

    /// Merge `tree` into the subtree at `key`, keeping leaves it does not
    /// mention.
    pub async fn update_tree(
        &self,
        key: impl Into<PathKey>,
        tree: &TreeNode,
        info: Option<Info>,
    ) -> Result<Option<CommitRef>, IrminError> {
        self.write_tree(OperationKind::UpdateTree, key.into(), tree, info)
            .await
    }

    /// Delete `key`.
    pub async fn remove(
        &self,
        key: impl Into<PathKey>,
        info: Option<Info>,
    ) -> Result<Option<CommitRef>, IrminError> {
        let key = key.into();
        let mut vars = self.key_vars(OperationKind::Remove, &key);
        vars.insert("info".into(), info_variable(info)?);
        self.commit(OperationKind::Remove, vars).await
    }

    /// Merge branch `from` into this branch.
    pub async fn merge_from(
        &self,
        from: impl AsRef<str>,
        info: Option<Info>,
    ) -> Result<Option<CommitRef>, IrminError> {
        let from = BranchName::new(from)?;
        let mut vars = Map::new();
        vars.insert("from".into(), Value::String(from.into()));
        vars.insert("info".into(), info_variable(info)?);
        self.commit(OperationKind::Merge, vars).await
    }

    /// Push this branch to `remote`.
    ///
    /// The result shape differs between Irmin versions, so it is returned
    /// as-is.
    pub async fn push(&self, remote: &str) -> Result<Value, IrminError> {
        let mut vars = Map::new();
        vars.insert("remote".into(), Value::String(remote.to_string()));
        self.run(OperationKind::Push, vars).await
    }

    /// Pull `remote` into this branch.
    pub async fn pull(
        &self,
        remote: &str,
        info: Option<Info>,
    ) -> Result<Option<CommitRef>, IrminError> {
        let mut vars = Map::new();
        vars.insert("remote".into(), Value::String(remote.to_string()));
        vars.insert("info".into(), info_variable(info)?);
        self.commit(OperationKind::Pull, vars).await
    }

    /// Reset the head to `commit`.
    ///
    /// Returns `true` only if the resulting head is exactly `commit`.
    pub async fn revert(&self, commit: &str) -> Result<bool, IrminError> {
        let mut vars = Map::new();
        vars.insert("commit".into(), Value::String(commit.to_string()));
        match self.commit(OperationKind::Revert, vars).await? {
            Some(head) if head.hash == commit => Ok(true),
            Some(head) => {
                debug!(branch = %self.name, requested = commit, head = %head.hash, "revert landed elsewhere");
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Clone `remote` into branch `target`.
    ///
    /// The mutation runs against `target`, not this handle's branch.
    pub async fn clone_remote(
        &self,
        remote: &str,
        target: impl AsRef<str>,
    ) -> Result<Option<CommitRef>, IrminError> {
        let target = BranchName::new(target)?;
        let mut vars = Map::new();
        vars.insert("remote".into(), Value::String(remote.to_string()));
        vars.insert("branch".into(), Value::String(target.into()));
        self.commit(OperationKind::Clone, vars).await
    }

    /// Name and head commit of this branch, `None` if it does not exist.
    pub async fn info(&self) -> Result<Option<BranchInfo>, IrminError> {
        let result = self.run(OperationKind::BranchInfo, Map::new()).await?;
        decode("branch info", result)
    }

    /// Direct children of `key` that hold values, keyed by full path.
    ///
    /// Subdirectories are left out.
    pub async fn list(
        &self,
        key: impl Into<PathKey>,
    ) -> Result<BTreeMap<String, String>, IrminError> {
        let key = key.into();
        let vars = self.key_vars(OperationKind::List, &key);
        let result = self.run(OperationKind::List, vars).await?;
        if result.is_null() {
            return Ok(BTreeMap::new());
        }
        let entries: Vec<ListEntry> = decode("list", result)?;
        Ok(entries
            .into_iter()
            .filter_map(|entry| {
                let value = entry.value?;
                Some((PathKey::parse(&entry.key).render(), value))
            })
            .collect())
    }

    async fn write_tree(
        &self,
        kind: OperationKind,
        key: PathKey,
        tree: &TreeNode,
        info: Option<Info>,
    ) -> Result<Option<CommitRef>, IrminError> {
        let entries = tree::flatten(tree)?;
        let mut vars = self.key_vars(kind, &key);
        vars.insert("tree".into(), to_variable(&entries)?);
        vars.insert("info".into(), info_variable(info)?);
        self.commit(kind, vars).await
    }

    fn key_vars(&self, kind: OperationKind, key: &PathKey) -> Map<String, Value> {
        let mut vars = Map::new();
        vars.insert(
            "key".into(),
            self.client.schema().operation(kind).key_variable(key),
        );
        vars
    }

    /// Run `kind` on this branch. A `branch` variable already present is
    /// kept.
    async fn run(
        &self,
        kind: OperationKind,
        mut vars: Map<String, Value>,
    ) -> Result<Value, IrminError> {
        vars.entry("branch")
            .or_insert_with(|| Value::String(self.name.to_string()));
        self.client.run(kind, vars).await
    }

    async fn commit(
        &self,
        kind: OperationKind,
        vars: Map<String, Value>,
    ) -> Result<Option<CommitRef>, IrminError> {
        let result = self.run(kind, vars).await?;
        decode(self.client.schema().operation(kind).name, result)
    }
}

/// `null`, or contents whose `value` is an explicit `null`.
fn is_absent(result: &Value) -> bool {
    match result {
        Value::Null => true,
        Value::Object(fields) => matches!(fields.get("value"), Some(Value::Null)),
        _ => false,
    }
}

/// Leaf value from either `{value}` or a bare scalar.
fn contents_value(result: Value) -> Result<Option<String>, IrminError> {
    if is_absent(&result) {
        return Ok(None);
    }
    match result {
        Value::String(value) => Ok(Some(value)),
        Value::Object(mut fields) => match fields.remove("value") {
            Some(Value::String(value)) => Ok(Some(value)),
            Some(other) => Err(IrminError::Protocol {
                message: format!("contents value is not a string: {}", other),
                body: other.to_string(),
            }),
            None => Err(IrminError::Protocol {
                message: "contents has no value field".to_string(),
                body: Value::Object(fields).to_string(),
            }),
        },
        other => Err(IrminError::Protocol {
            message: "contents is neither an object nor a string".to_string(),
            body: other.to_string(),
        }),
    }
}

fn info_variable(info: Option<Info>) -> Result<Value, IrminError> {
    to_variable(&info)
}

fn to_variable<T: serde::Serialize>(value: &T) -> Result<Value, IrminError> {
    serde_json::to_value(value)
        .map_err(|e| IrminError::InvalidArgument(format!("cannot encode variable: {}", e)))
}
