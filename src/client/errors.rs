//! client::errors
//!
//! Error types shared by every layer of the client.
//!
//! # Design
//!
//! Failures carry enough structure to diagnose without re-issuing the
//! request: protocol failures keep the raw response body, remote failures
//! keep the full GraphQL error list. No layer downgrades an error into a
//! default value.
//!
//! # Example
//!
//! ```
//! use irmin_client::IrminError;
//!
//! let err = IrminError::Protocol {
//!     message: "expected a JSON object".to_string(),
//!     body: "<html>502 Bad Gateway</html>".to_string(),
//! };
//! assert!(err.to_string().contains("expected a JSON object"));
//! assert_eq!(err.raw_body(), Some("<html>502 Bad Gateway</html>"));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from client operations.
#[derive(Debug, Clone, Error)]
pub enum IrminError {
    /// Caller input could not be turned into a valid request.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The transport collaborator failed to deliver the request.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not the expected `{data, errors}` envelope.
    #[error("protocol error: {message}")]
    Protocol {
        /// What was wrong with the body
        message: String,
        /// The body exactly as received
        body: String,
    },

    /// The endpoint answered with a non-empty `errors` list.
    #[error("remote error: {}", summarize(.errors))]
    Remote {
        /// Structured errors reported by the endpoint
        errors: Vec<GraphQlError>,
    },

    /// A path is used both as a leaf and as a directory.
    #[error("structural conflict at '{path}': path is both a leaf and a directory")]
    StructuralConflict {
        /// Canonical rendering of the offending path
        path: String,
    },
}

impl IrminError {
    /// Check if the endpoint itself rejected the request.
    pub fn is_remote(&self) -> bool {
        matches!(self, IrminError::Remote { .. })
    }

    /// Check if this error indicates a transient failure that might succeed on retry.
    ///
    /// Only transport failures qualify. Retrying is left to the caller.
    pub fn is_transient(&self) -> bool {
        matches!(self, IrminError::Transport(_))
    }

    /// The structured error list of a [`IrminError::Remote`].
    pub fn remote_errors(&self) -> Option<&[GraphQlError]> {
        match self {
            IrminError::Remote { errors } => Some(errors),
            _ => None,
        }
    }

    /// The unparsed response body of a [`IrminError::Protocol`].
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            IrminError::Protocol { body, .. } => Some(body),
            _ => None,
        }
    }
}

fn summarize(errors: &[GraphQlError]) -> String {
    match errors {
        [] => "no error details".to_string(),
        [only] => only.message.clone(),
        [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
    }
}

/// A single entry of a GraphQL `errors` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    /// Human-readable description
    pub message: String,
    /// Source locations in the query text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<ErrorLocation>>,
    /// Response path of the failing field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<serde_json::Value>>,
    /// Server-specific extra data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

impl GraphQlError {
    /// Build an error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: None,
            path: None,
            extensions: None,
        }
    }
}

/// Position in the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLocation {
    /// 1-based line
    pub line: u32,
    /// 1-based column
    pub column: u32,
}
