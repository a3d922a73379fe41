//! core
//!
//! Domain types shared by the client, transport and schema layers.
//!
//! # Modules
//!
//! - [`key`] - Path keys and their canonical rendering
//! - [`tree`] - Nested trees and the flat wire form
//! - [`types`] - Strong types: BranchName, Info, CommitRef, BranchInfo
//! - [`config`] - Client configuration schema and loading
//!
//! # Design Principles
//!
//! - Keys are normalized on construction, so equal paths compare equal
//! - Trees are plain values with no connection to a store
//! - Configuration is strict: unknown fields are rejected

pub mod config;
pub mod key;
pub mod tree;
pub mod types;
