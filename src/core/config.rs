//! core::config
//!
//! Client configuration schema and loading.
//!
//! # Overview
//!
//! The endpoint URL is the only required setting. Everything else has a
//! default. Configuration is a value the caller supplies: it is parsed
//! from TOML text or from a file the caller names. Nothing is read from
//! the environment and nothing is written back.
//!
//! # Format
//!
//! ```toml
//! endpoint = "http://localhost:8080/graphql"
//! schema = "flat"            # or "recursive"
//! default_branch = "main"
//! timeout_secs = 30          # optional
//! user_agent = "irmin-client" # optional
//! ```
//!
//! # Example
//!
//! ```
//! use irmin_client::core::config::ClientConfig;
//! use irmin_client::schema::SchemaVersion;
//!
//! let config = ClientConfig::from_toml_str(r#"
//!     endpoint = "http://irmin.local:8080/graphql"
//!     schema = "recursive"
//! "#).unwrap();
//!
//! assert_eq!(config.schema, SchemaVersion::Recursive);
//! assert_eq!(config.default_branch, "main");
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::BranchName;
use crate::client::errors::IrminError;
use crate::schema::SchemaVersion;

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/graphql";

/// Branch used by [`crate::Client::default_branch`] when none is configured.
pub const DEFAULT_BRANCH: &str = "main";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config from {origin}: {message}")]
    ParseError { origin: String, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

impl From<ConfigError> for IrminError {
    fn from(err: ConfigError) -> Self {
        IrminError::InvalidArgument(err.to_string())
    }
}

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// GraphQL endpoint URL
    pub endpoint: String,

    /// Schema dialect spoken by the endpoint
    pub schema: SchemaVersion,

    /// Branch returned by `Client::default_branch`
    pub default_branch: String,

    /// Per-request timeout for the HTTP transport
    pub timeout_secs: Option<u64>,

    /// User-Agent header for the HTTP transport
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            schema: SchemaVersion::default(),
            default_branch: DEFAULT_BRANCH.to_string(),
            timeout_secs: None,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Default configuration pointing at `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Set the schema dialect.
    pub fn with_schema(mut self, schema: SchemaVersion) -> Self {
        self.schema = schema;
        self
    }

    /// Parse and validate configuration from TOML text.
    ///
    /// # Errors
    ///
    /// `ParseError` for malformed TOML or unknown fields, `InvalidValue`
    /// if validation fails.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Self::parse(contents, "<string>")
    }

    /// Read, parse and validate a configuration file.
    ///
    /// # Errors
    ///
    /// `ReadError` if the file cannot be read, otherwise as
    /// [`ClientConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&contents, &format!("'{}'", path.display()))
    }

    fn parse(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig =
            toml::from_str(contents).map_err(|e| ConfigError::ParseError {
                origin: origin.to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML text.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.endpoint).map_err(|e| {
            ConfigError::InvalidValue(format!("invalid endpoint '{}': {}", self.endpoint, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue(format!(
                "endpoint must use http or https, got '{}'",
                url.scheme()
            )));
        }

        BranchName::new(&self.default_branch).map_err(|e| {
            ConfigError::InvalidValue(format!("invalid default branch: {}", e))
        })?;

        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        if let Some(agent) = &self.user_agent {
            if agent.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "user_agent cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Request timeout, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
