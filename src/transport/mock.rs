//! transport::mock
//!
//! Mock transport for deterministic testing.
//!
//! # Design
//!
//! The mock records every request it receives and answers with canned
//! bodies. Bodies can be routed by operation name (reused for every
//! matching request) or queued (consumed in order by requests without a
//! route). A queued entry may also be a failure.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use irmin_client::transport::mock::MockTransport;
//! use irmin_client::Client;
//!
//! # tokio_test::block_on(async {
//! let transport = MockTransport::new()
//!     .with_response(r#"{"data": {"branch": {"get": {"value": "1234"}}}}"#);
//! let client = Client::with_transport("http://irmin/graphql", Arc::new(transport.clone()));
//!
//! let value = client.main().get("abc").await.unwrap();
//! assert_eq!(value.as_deref(), Some("1234"));
//!
//! let request = transport.last_request().unwrap();
//! assert_eq!(request.envelope.variables["key"], "abc");
//! assert_eq!(request.envelope.variables["branch"], "main");
//! # });
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::traits::{RequestEnvelope, Transport};
use crate::client::errors::IrminError;

/// Mock transport for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share
/// responses and recorded requests.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    /// Responses consumed in order.
    queued: VecDeque<Result<String, IrminError>>,
    /// Responses keyed by operation name.
    routes: HashMap<String, String>,
    /// Recorded requests for verification.
    requests: Vec<RecordedRequest>,
}

/// A request seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub url: String,
    pub envelope: RequestEnvelope,
}

impl MockTransport {
    /// Create a mock with no responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response body.
    pub fn with_response(self, body: impl Into<String>) -> Self {
        self.push_response(body);
        self
    }

    /// Queue a JSON response body.
    pub fn with_json(self, body: serde_json::Value) -> Self {
        self.push_response(body.to_string());
        self
    }

    /// Queue a transport failure.
    pub fn with_failure(self, error: IrminError) -> Self {
        self.lock().queued.push_back(Err(error));
        self
    }

    /// Answer every request for `operation` with `body`.
    pub fn with_route(self, operation: impl Into<String>, body: serde_json::Value) -> Self {
        self.lock().routes.insert(operation.into(), body.to_string());
        self
    }

    /// Queue a raw response body on a shared mock.
    pub fn push_response(&self, body: impl Into<String>) {
        self.lock().queued.push_back(Ok(body.into()));
    }

    /// Get all recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Get the most recent request.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.lock().requests.last().cloned()
    }

    /// Number of requests received.
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Clear recorded requests.
    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockTransportInner> {
        // A poisoned lock only means another test thread panicked.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn send(&self, url: &str, body: &RequestEnvelope) -> Result<String, IrminError> {
        let mut inner = self.lock();
        inner.requests.push(RecordedRequest {
            url: url.to_string(),
            envelope: body.clone(),
        });

        if let Some(routed) = body
            .operation_name
            .as_ref()
            .and_then(|op| inner.routes.get(op))
        {
            return Ok(routed.clone());
        }

        inner.queued.pop_front().unwrap_or_else(|| {
            Err(IrminError::Transport(format!(
                "mock transport has no response for operation {:?}",
                body.operation_name
            )))
        })
    }
}
