//! transport::traits
//!
//! Transport trait and request envelope.
//!
//! # Design
//!
//! The transport is the only component that touches the network. It is
//! handed a URL and a serializable envelope and returns the response body
//! as text. It does not interpret the body or HTTP status codes; that is
//! the client's job, so an error payload served with any status still
//! reaches the caller.
//!
//! Retries, timeouts and cancellation belong to implementations of this
//! trait, not to the client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::errors::IrminError;

/// Body of a GraphQL request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Query or mutation text
    pub query: String,
    /// Operation to run when `query` defines several
    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,
    /// Variable bindings
    pub variables: Map<String, Value>,
}

impl RequestEnvelope {
    /// Build an envelope.
    pub fn new(
        query: impl Into<String>,
        variables: Map<String, Value>,
        operation_name: Option<&str>,
    ) -> Self {
        Self {
            query: query.into(),
            operation_name: operation_name.map(str::to_string),
            variables,
        }
    }

    /// Look up a variable.
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }
}

/// Sends request envelopes to an endpoint.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` and must support concurrent
/// independent requests; the client shares one transport across every
/// branch handle.
///
/// # Errors
///
/// Delivery failures return `IrminError::Transport`. A response that was
/// received, whatever its content, is returned as `Ok(body)`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Get the transport name (e.g., "http", "mock").
    fn name(&self) -> &'static str;

    /// POST `body` as JSON to `url` and return the response body text.
    async fn send(&self, url: &str, body: &RequestEnvelope) -> Result<String, IrminError>;
}
