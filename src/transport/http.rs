//! transport::http
//!
//! HTTP transport using reqwest.
//!
//! # Design
//!
//! Each envelope is POSTed as JSON (`Content-Type: application/json`) and
//! the whole response body is returned as text. Status codes are not
//! interpreted: a GraphQL server may report errors with a 200 or a 4xx,
//! and either way the body is what the client needs to see.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use irmin_client::transport::HttpTransport;
//!
//! let transport = HttpTransport::builder()
//!     .timeout(Duration::from_secs(10))
//!     .user_agent("my-app")
//!     .build()
//!     .unwrap();
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use tracing::debug;

use super::traits::{RequestEnvelope, Transport};
use crate::client::errors::IrminError;
use crate::core::config::ClientConfig;

/// User-Agent header value when none is configured.
const USER_AGENT_VALUE: &str = concat!("irmin-client/", env!("CARGO_PKG_VERSION"));

/// Transport that speaks HTTP through a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Transport with default settings.
    ///
    /// # Errors
    ///
    /// `Transport` if the underlying HTTP client cannot be built.
    pub fn new() -> Result<Self, IrminError> {
        Self::builder().build()
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Start building a transport.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Transport configured from `config`'s timeout and user agent.
    ///
    /// # Errors
    ///
    /// As [`HttpTransportBuilder::build`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, IrminError> {
        let mut builder = Self::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        builder.build()
    }
}

/// Builder for [`HttpTransport`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransportBuilder {
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl HttpTransportBuilder {
    /// Abort requests that take longer than `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the User-Agent header.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the transport.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a user agent that is not a valid header value,
    /// `Transport` if reqwest cannot initialize (e.g. TLS backend failure).
    pub fn build(self) -> Result<HttpTransport, IrminError> {
        let agent = match &self.user_agent {
            Some(agent) => HeaderValue::from_str(agent).map_err(|e| {
                IrminError::InvalidArgument(format!("invalid user agent: {}", e))
            })?,
            None => HeaderValue::from_static(USER_AGENT_VALUE),
        };

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, agent);

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| IrminError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(HttpTransport { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn send(&self, url: &str, body: &RequestEnvelope) -> Result<String, IrminError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| IrminError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| IrminError::Transport(format!("failed to read response body: {}", e)))?;

        debug!(status = status.as_u16(), bytes = text.len(), "received response");
        Ok(text)
    }
}
