//! client
//!
//! Connection object and request execution.
//!
//! # Design
//!
//! A [`Client`] holds the endpoint URL, the transport and the schema
//! dialect, all fixed at construction. It keeps no other state: every
//! call builds its own request envelope, so one client (and any number of
//! [`Branch`] handles cloned from it) can be used from concurrent tasks
//! without coordination.
//!
//! # Response handling
//!
//! [`Client::execute`] parses the raw response body as a GraphQL
//! `{data, errors}` envelope:
//! - unparseable body: [`IrminError::Protocol`] carrying the raw text
//! - non-empty `errors`: [`IrminError::Remote`] carrying the full list,
//!   never alongside partial data
//! - otherwise the `data` field
//!
//! # Example
//!
//! ```no_run
//! use irmin_client::{Client, Info};
//!
//! # async fn run() -> Result<(), irmin_client::IrminError> {
//! let client = Client::new("http://localhost:8080/graphql")?;
//! let main = client.main();
//!
//! let commit = main.set("abc", "1234", Some(Info::new("set abc"))).await?;
//! println!("head: {:?}", commit.map(|c| c.hash));
//!
//! let value = main.get("abc").await?;
//! assert_eq!(value.as_deref(), Some("1234"));
//!
//! println!("branches: {:?}", client.branches().await?);
//! # Ok(())
//! # }
//! ```

mod branch;
pub mod errors;

pub use branch::Branch;

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use self::errors::{GraphQlError, IrminError};
use crate::core::config::ClientConfig;
use crate::core::types::BranchName;
use crate::schema::{OperationKind, Schema};
use crate::transport::{HttpTransport, RequestEnvelope, Transport};

/// Connection to an Irmin GraphQL endpoint.
///
/// Cheap to clone; clones share the transport and schema.
#[derive(Clone)]
pub struct Client {
    endpoint: Arc<str>,
    transport: Arc<dyn Transport>,
    schema: Arc<Schema>,
    default_branch: BranchName,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.endpoint)
            .field("transport", &self.transport.name())
            .field("schema", &self.schema.version())
            .field("default_branch", &self.default_branch)
            .finish()
    }
}

impl Client {
    /// Client for `endpoint` over HTTP with the default schema.
    ///
    /// # Errors
    ///
    /// `Transport` if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, IrminError> {
        let transport = HttpTransport::new()?;
        Ok(Self::with_transport(endpoint, Arc::new(transport)))
    }

    /// Client for `endpoint` over a caller-supplied transport.
    pub fn with_transport(endpoint: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint: Arc::from(endpoint.into()),
            transport,
            schema: Arc::new(Schema::default()),
            default_branch: BranchName::main(),
        }
    }

    /// Client built from a validated configuration over HTTP.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the configuration does not validate,
    /// `Transport` if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, IrminError> {
        let transport = HttpTransport::from_config(config)?;
        Self::from_config_with_transport(config, Arc::new(transport))
    }

    /// Client built from a validated configuration over a caller-supplied
    /// transport. Timeout and user agent settings are ignored.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the configuration does not validate.
    pub fn from_config_with_transport(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, IrminError> {
        config.validate()?;
        Ok(Self {
            endpoint: Arc::from(config.endpoint.as_str()),
            transport,
            schema: Arc::new(Schema::for_version(config.schema)),
            default_branch: BranchName::new(&config.default_branch)?,
        })
    }

    /// Replace the schema dialect.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Arc::new(schema);
        self
    }

    /// The endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The schema dialect in use.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Handle for branch `name`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `name` is not a valid branch name.
    pub fn branch(&self, name: impl AsRef<str>) -> Result<Branch, IrminError> {
        Ok(Branch::new(self.clone(), BranchName::new(name)?))
    }

    /// Handle for the `main` branch.
    pub fn main(&self) -> Branch {
        Branch::new(self.clone(), BranchName::main())
    }

    /// Handle for the `master` branch.
    pub fn master(&self) -> Branch {
        Branch::new(self.clone(), BranchName::master())
    }

    /// Handle for the configured default branch (`main` unless configured).
    pub fn default_branch(&self) -> Branch {
        Branch::new(self.clone(), self.default_branch.clone())
    }

    /// Names of all branches in the store.
    ///
    /// # Errors
    ///
    /// Propagates `execute` failures; `Protocol` if the result is not a
    /// list of names.
    pub async fn branches(&self) -> Result<Vec<String>, IrminError> {
        let value = self.run(OperationKind::Branches, Map::new()).await?;
        if value.is_null() {
            return Ok(Vec::new());
        }
        decode("Branches", value)
    }

    /// Execute a query and return its `data`.
    ///
    /// # Errors
    ///
    /// - `Transport` if the request could not be delivered
    /// - `Protocol` if the body is not a `{data, errors}` envelope, or has
    ///   neither data nor errors
    /// - `Remote` if the envelope carries a non-empty `errors` list
    pub async fn execute(
        &self,
        query: &str,
        variables: Map<String, Value>,
        operation_name: Option<&str>,
    ) -> Result<Value, IrminError> {
        let operation = operation_name.unwrap_or("<anonymous>");
        debug!(operation, endpoint = %self.endpoint, "executing request");

        let envelope = RequestEnvelope::new(query, variables, operation_name);
        let body = self.transport.send(&self.endpoint, &envelope).await?;

        parse_response(&body).inspect_err(|e| match e {
            IrminError::Remote { errors } => {
                warn!(operation, errors = errors.len(), "endpoint returned errors")
            }
            other => warn!(operation, error = %other, "unusable response body"),
        })
    }

    /// Run a schema operation and extract its result field.
    pub(crate) async fn run(
        &self,
        kind: OperationKind,
        variables: Map<String, Value>,
    ) -> Result<Value, IrminError> {
        let op = self.schema.operation(kind);
        let data = self.execute(op.text, variables, Some(op.name)).await?;
        self.schema.extract(kind, &data).cloned()
    }
}

#[derive(Deserialize)]
struct ResponseEnvelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<Value>>,
}

fn parse_response(body: &str) -> Result<Value, IrminError> {
    let envelope: ResponseEnvelope =
        serde_json::from_str(body).map_err(|e| IrminError::Protocol {
            message: format!("response is not a GraphQL envelope: {}", e),
            body: body.to_string(),
        })?;

    if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
        return Err(IrminError::Remote {
            errors: errors.into_iter().map(graphql_error).collect(),
        });
    }

    match envelope.data {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(IrminError::Protocol {
            message: "response carries neither data nor errors".to_string(),
            body: body.to_string(),
        }),
    }
}

/// Entries that do not follow the GraphQL error format are kept verbatim
/// as the message.
fn graphql_error(value: Value) -> GraphQlError {
    match value {
        Value::String(message) => GraphQlError::new(message),
        other => serde_json::from_value(other.clone())
            .unwrap_or_else(|_| GraphQlError::new(other.to_string())),
    }
}

/// Deserialize an operation result, keeping the data on failure.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    operation: &str,
    value: Value,
) -> Result<T, IrminError> {
    let body = value.to_string();
    serde_json::from_value(value).map_err(|e| IrminError::Protocol {
        message: format!("unexpected {} result: {}", operation, e),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaVersion;
    use crate::transport::mock::MockTransport;
    use serde_json::json;

    fn client(mock: &MockTransport) -> Client {
        Client::with_transport("http://irmin.test/graphql", Arc::new(mock.clone()))
    }

    mod parse_response {
        use super::*;

        #[test]
        fn returns_data() {
            let data = parse_response(r#"{"data": {"branches": ["main"]}}"#).unwrap();
            assert_eq!(data, json!({"branches": ["main"]}));
        }

        #[test]
        fn empty_errors_is_success() {
            let data = parse_response(r#"{"data": {"x": 1}, "errors": []}"#).unwrap();
            assert_eq!(data, json!({"x": 1}));
        }

        #[test]
        fn errors_win_over_data() {
            let err =
                parse_response(r#"{"data": {"x": 1}, "errors": [{"message": "partial"}]}"#)
                    .unwrap_err();
            let errors = err.remote_errors().unwrap();
            assert_eq!(errors, [GraphQlError::new("partial")]);
        }

        #[test]
        fn non_json_keeps_raw_body() {
            let raw = "<html>Bad Gateway</html>";
            let err = parse_response(raw).unwrap_err();
            assert_eq!(err.raw_body(), Some(raw));
        }

        #[test]
        fn non_object_json_is_protocol_error() {
            let err = parse_response("[1, 2, 3]").unwrap_err();
            assert_eq!(err.raw_body(), Some("[1, 2, 3]"));
        }

        #[test]
        fn missing_data_is_protocol_error() {
            for body in ["{}", r#"{"data": null}"#, r#"{"data": null, "errors": []}"#] {
                let err = parse_response(body).unwrap_err();
                assert!(matches!(err, IrminError::Protocol { .. }), "{body}");
            }
        }

        #[test]
        fn irregular_error_entries_are_kept() {
            let err = parse_response(r#"{"errors": ["plain", {"code": 7}]}"#).unwrap_err();
            let errors = err.remote_errors().unwrap();
            assert_eq!(errors[0].message, "plain");
            assert_eq!(errors[1].message, r#"{"code":7}"#);
        }
    }

    #[tokio::test]
    async fn execute_sends_envelope() {
        let mock = MockTransport::new().with_json(json!({"data": {"ok": true}}));
        let mut vars = Map::new();
        vars.insert("x".into(), json!(1));

        let data = client(&mock)
            .execute("query Q { ok }", vars, Some("Q"))
            .await
            .unwrap();
        assert_eq!(data, json!({"ok": true}));

        let req = mock.last_request().unwrap();
        assert_eq!(req.url, "http://irmin.test/graphql");
        assert_eq!(req.envelope.query, "query Q { ok }");
        assert_eq!(req.envelope.operation_name.as_deref(), Some("Q"));
        assert_eq!(req.envelope.variables["x"], json!(1));
    }

    #[tokio::test]
    async fn execute_propagates_transport_error() {
        let mock = MockTransport::new().with_failure(IrminError::Transport("refused".into()));
        let err = client(&mock)
            .execute("query { x }", Map::new(), None)
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn branches_lists_names() {
        let mock = MockTransport::new().with_json(json!({"data": {"branches": ["main", "dev"]}}));
        let names = client(&mock).branches().await.unwrap();
        assert_eq!(names, ["main", "dev"]);

        let req = mock.last_request().unwrap();
        assert_eq!(req.envelope.operation_name.as_deref(), Some("Branches"));
        assert!(req.envelope.variables.is_empty());
    }

    #[test]
    fn branch_handles() {
        let mock = MockTransport::new();
        let c = client(&mock);
        assert_eq!(c.main().name().as_str(), "main");
        assert_eq!(c.master().name().as_str(), "master");
        assert_eq!(c.default_branch().name().as_str(), "main");
        assert_eq!(c.branch(" testing ").unwrap().name().as_str(), "testing");
        assert!(matches!(
            c.branch("no spaces"),
            Err(IrminError::InvalidArgument(_))
        ));
    }

    #[test]
    fn from_config_selects_schema_and_branch() {
        let config = ClientConfig {
            schema: SchemaVersion::Recursive,
            default_branch: "master".into(),
            ..ClientConfig::new("http://irmin.test/graphql")
        };
        let c = Client::from_config_with_transport(&config, Arc::new(MockTransport::new()))
            .unwrap();
        assert_eq!(c.schema().version(), SchemaVersion::Recursive);
        assert_eq!(c.default_branch().name().as_str(), "master");
        assert_eq!(c.endpoint(), "http://irmin.test/graphql");
    }

    #[test]
    fn from_config_rejects_invalid() {
        let config = ClientConfig::new("nope");
        let err =
            Client::from_config_with_transport(&config, Arc::new(MockTransport::new()))
                .unwrap_err();
        assert!(matches!(err, IrminError::InvalidArgument(_)));
    }

    #[test]
    fn debug_shows_transport_name() {
        let c = client(&MockTransport::new());
        let debug = format!("{:?}", c);
        assert!(debug.contains("mock"));
        assert!(debug.contains("irmin.test"));
    }
}
