//! irmin-client - An async client for the Irmin GraphQL API
//!
//! Irmin is a content-addressed, branchable key/value store. This crate
//! talks to an Irmin server over GraphQL: reading and writing values,
//! whole subtrees, and branch-level operations such as merge, revert,
//! push and pull.
//!
//! # Architecture
//!
//! - [`client`] - [`Client`] connection object and [`Branch`] handles
//! - [`schema`] - Query tables for the supported irmin-graphql dialects
//! - [`transport`] - How a request envelope reaches the endpoint
//! - [`core`] - Path keys, trees, commit types and configuration
//!
//! # Invariants
//!
//! 1. Every key is normalized before it is sent; the root renders as `/`
//! 2. A response carrying GraphQL errors never yields data
//! 3. Absent values read as `None`, never as an error
//! 4. Handles hold no mutable state and may be used concurrently
//!
//! # Example
//!
//! ```no_run
//! use irmin_client::{Client, TreeNode};
//!
//! # async fn run() -> Result<(), irmin_client::IrminError> {
//! let client = Client::new("http://localhost:8080/graphql")?;
//! let main = client.main();
//!
//! let tree: TreeNode = serde_json::from_str(r#"{"a": {"b": {"value": "1"}}}"#)
//!     .map_err(|e| irmin_client::IrminError::InvalidArgument(e.to_string()))?;
//! main.set_tree("/", &tree, None).await?;
//! assert_eq!(main.get("a/b").await?.as_deref(), Some("1"));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod core;
pub mod schema;
pub mod transport;

pub use client::errors::{GraphQlError, IrminError};
pub use client::{Branch, Client};
pub use core::config::ClientConfig;
pub use core::key::PathKey;
pub use core::tree::{flatten, unflatten, Contents, FlatEntry, TreeNode};
pub use core::types::{BranchInfo, BranchName, Commit, CommitInfo, CommitRef, Info};
pub use schema::SchemaVersion;
