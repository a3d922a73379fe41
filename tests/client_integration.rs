//! Integration tests for the client and branch handles.
//!
//! These tests drive the public API against MockTransport and check both
//! the requests sent and how responses are surfaced.

use std::sync::Arc;

use serde_json::{json, Value};

use irmin_client::schema::{OperationKind, Schema};
use irmin_client::transport::mock::MockTransport;
use irmin_client::{
    Client, ClientConfig, Contents, Info, IrminError, PathKey, SchemaVersion, TreeNode,
};

const ENDPOINT: &str = "http://irmin.test/graphql";

fn client(mock: &MockTransport) -> Client {
    Client::with_transport(ENDPOINT, Arc::new(mock.clone()))
}

fn remote_error() -> Value {
    json!({
        "data": null,
        "errors": [
            {"message": "Branch not found", "locations": [{"line": 2, "column": 5}], "path": ["branch"]},
            {"message": "second failure"}
        ]
    })
}

// =============================================================================
// Error Surfacing
// =============================================================================

mod error_surfacing {
    use super::*;

    /// Run every branch operation once against a transport that answers
    /// each request with `body`, returning the error of each.
    async fn every_operation(body: &str) -> Vec<(&'static str, IrminError)> {
        let mock = MockTransport::new();
        for _ in 0..16 {
            mock.push_response(body);
        }
        let c = client(&mock);
        let b = c.main();
        let tree = TreeNode::new();

        vec![
            ("get", b.get("k").await.unwrap_err()),
            ("get_contents", b.get_contents("k").await.unwrap_err()),
            ("get_tree", b.get_tree("k").await.unwrap_err()),
            ("set", b.set("k", "v", None).await.unwrap_err()),
            (
                "set_contents",
                b.set_contents("k", Contents::new("v"), None).await.unwrap_err(),
            ),
            ("set_tree", b.set_tree("k", &tree, None).await.unwrap_err()),
            ("update_tree", b.update_tree("k", &tree, None).await.unwrap_err()),
            ("remove", b.remove("k", None).await.unwrap_err()),
            ("merge_from", b.merge_from("dev", None).await.unwrap_err()),
            ("push", b.push("r").await.unwrap_err()),
            ("pull", b.pull("r", None).await.unwrap_err()),
            ("revert", b.revert("abc").await.unwrap_err()),
            ("clone_remote", b.clone_remote("r", "copy").await.unwrap_err()),
            ("info", b.info().await.unwrap_err()),
            ("list", b.list("k").await.unwrap_err()),
            ("branches", c.branches().await.unwrap_err()),
        ]
    }

    #[tokio::test]
    async fn remote_errors_reach_every_caller() {
        let body = remote_error().to_string();
        for (op, err) in every_operation(&body).await {
            let errors = err
                .remote_errors()
                .unwrap_or_else(|| panic!("{op}: expected remote error, got {err:?}"));
            assert_eq!(errors.len(), 2, "{op}");
            assert_eq!(errors[0].message, "Branch not found", "{op}");
            assert_eq!(errors[0].locations.as_ref().unwrap()[0].line, 2, "{op}");
        }
    }

    #[tokio::test]
    async fn protocol_errors_keep_raw_body() {
        let body = "502 Bad Gateway";
        for (op, err) in every_operation(body).await {
            assert_eq!(err.raw_body(), Some(body), "{op}");
        }
    }

    #[tokio::test]
    async fn remote_error_message_summarizes() {
        let mock = MockTransport::new().with_json(remote_error());
        let err = client(&mock).main().get("k").await.unwrap_err();
        assert!(err.is_remote());
        assert!(err.to_string().contains("Branch not found"));
        assert!(err.to_string().contains("1 more"));
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let mock =
            MockTransport::new().with_failure(IrminError::Transport("connection refused".into()));
        let err = client(&mock).main().get("k").await.unwrap_err();
        assert!(err.is_transient());
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn unexpected_shape_is_protocol_error() {
        let mock = MockTransport::new().with_json(json!({"data": {"set": {"no_hash": 1}}}));
        let err = client(&mock).main().set("k", "v", None).await.unwrap_err();
        assert!(matches!(err, IrminError::Protocol { .. }));
    }
}

// =============================================================================
// Request Construction
// =============================================================================

mod requests {
    use super::*;

    #[tokio::test]
    async fn keys_are_normalized() {
        let mock = MockTransport::new();
        for _ in 0..5 {
            mock.push_response(json!({"data": {"branch": {"get": null}}}).to_string());
        }
        let b = client(&mock).main();

        b.get("/a/b/").await.unwrap();
        b.get("a//b").await.unwrap();
        b.get(["a", "b"]).await.unwrap();
        b.get("").await.unwrap();
        b.get(PathKey::root()).await.unwrap();

        let keys: Vec<Value> = mock
            .requests()
            .into_iter()
            .map(|r| r.envelope.variables["key"].clone())
            .collect();
        assert_eq!(keys, [json!("a/b"), json!("a/b"), json!("a/b"), json!("/"), json!("/")]);
    }

    #[tokio::test]
    async fn every_branch_operation_names_its_branch() {
        let mock = MockTransport::new().with_json(json!({"data": {"remove": {"hash": "h"}}}));
        let b = client(&mock).branch("feature/x").unwrap();
        b.remove("k", Some(Info::new("drop k"))).await.unwrap();

        let req = mock.last_request().unwrap();
        assert_eq!(req.url, ENDPOINT);
        assert_eq!(req.envelope.variable("branch"), Some(&json!("feature/x")));
        assert_eq!(req.envelope.operation_name.as_deref(), Some("Remove"));
        assert!(req.envelope.query.contains("remove("));
    }

    #[tokio::test]
    async fn set_tree_then_get_tree() {
        let tree: TreeNode = serde_json::from_value(json!({
            "a": {"b": {"c": {"value": "123"}}},
            "aaa": {"value": "456"}
        }))
        .unwrap();

        let mock = MockTransport::new()
            .with_route("SetTree", json!({"data": {"set_tree": {"hash": "t"}}}))
            .with_route(
                "GetTree",
                json!({"data": {"branch": {"get_tree": [
                    {"key": "a/b/c", "value": "123", "metadata": null},
                    {"key": "aaa", "value": "456", "metadata": null}
                ]}}}),
            );
        let b = client(&mock).main();

        b.set_tree("/", &tree, Some(Info::new("import"))).await.unwrap();
        let sent = mock.last_request().unwrap().envelope.variables;
        assert_eq!(sent["key"], json!("/"));
        assert_eq!(
            sent["tree"],
            json!([
                {"key": "a/b/c", "value": "123", "metadata": null},
                {"key": "aaa", "value": "456", "metadata": null}
            ])
        );

        let fetched = b.get_tree("/").await.unwrap();
        assert_eq!(fetched, tree);
    }

    #[tokio::test]
    async fn revert_reports_whether_head_moved() {
        let mock = MockTransport::new()
            .with_json(json!({"data": {"revert": {"hash": "c0ffee"}}}))
            .with_json(json!({"data": {"revert": {"hash": "beef"}}}));
        let b = client(&mock).main();
        assert!(b.revert("c0ffee").await.unwrap());
        assert!(!b.revert("c0ffee").await.unwrap());
    }

    #[tokio::test]
    async fn list_excludes_directories() {
        let mock = MockTransport::new().with_json(json!({"data": {"branch": {"head": {"node": {"get": {"tree": [
            {"key": "/cfg/name", "value": "irmin"},
            {"key": "/cfg/nested", "value": null},
            {"key": "/cfg/port", "value": "8080"}
        ]}}}}}}));
        let listing = client(&mock).main().list("cfg").await.unwrap();
        assert_eq!(listing.keys().collect::<Vec<_>>(), ["cfg/name", "cfg/port"]);
    }
}

// =============================================================================
// Schema Dialects
// =============================================================================

mod dialects {
    use super::*;

    fn recursive(mock: &MockTransport) -> Client {
        let config = ClientConfig::new(ENDPOINT).with_schema(SchemaVersion::Recursive);
        Client::from_config_with_transport(&config, Arc::new(mock.clone())).unwrap()
    }

    #[tokio::test]
    async fn same_calls_against_both_dialects() {
        let flat = MockTransport::new()
            .with_json(json!({"data": {"branch": {"get": {"value": "v"}}}}))
            .with_json(json!({"data": {"branch": {"get_tree": [{"key": "x/y", "value": "1"}]}}}));
        let rec = MockTransport::new()
            .with_json(json!({"data": {"branch": {"tree": {"get": "v"}}}}))
            .with_json(json!({"data": {"branch": {"tree": {"get_tree": {
                "list_contents_recursively": [{"path": "/x/y", "value": "1", "metadata": null}]
            }}}}}));

        for c in [client(&flat), recursive(&rec)] {
            let b = c.main();
            assert_eq!(b.get("k").await.unwrap().as_deref(), Some("v"));
            let tree = b.get_tree("/").await.unwrap();
            assert_eq!(
                tree.get("x/y").and_then(TreeNode::contents).map(|c| c.value.as_str()),
                Some("1")
            );
        }

        let flat_ops: Vec<_> = flat
            .requests()
            .into_iter()
            .map(|r| r.envelope.query)
            .collect();
        let rec_ops: Vec<_> = rec.requests().into_iter().map(|r| r.envelope.query).collect();
        assert_ne!(flat_ops, rec_ops);
        assert!(rec.last_request().unwrap().envelope.variables["key"].is_null());
    }

    #[tokio::test]
    async fn overridden_operation_is_used() {
        let mock = MockTransport::new()
            .with_json(json!({"data": {"branch": {"lookup": {"value": "v"}}}}));
        let base = Schema::default();
        let mut get = base.operation(OperationKind::Get).clone();
        get.text = "query Get($branch: String!, $key: String!) { branch(name: $branch) { lookup(key: $key) { value } } }";
        get.result_path = &["branch", "lookup"];

        let c = client(&mock).with_schema(base.with_operation(OperationKind::Get, get));
        assert_eq!(c.main().get("k").await.unwrap().as_deref(), Some("v"));
        assert!(mock.last_request().unwrap().envelope.query.contains("lookup"));
    }
}

// =============================================================================
// Concurrency
// =============================================================================

mod concurrency {
    use super::*;

    #[tokio::test]
    async fn concurrent_calls_do_not_interfere() {
        let mock = MockTransport::new()
            .with_route("Get", json!({"data": {"branch": {"get": {"value": "v"}}}}))
            .with_route("Set", json!({"data": {"set": {"hash": "h"}}}))
            .with_route("Branches", json!({"data": {"branches": ["main", "dev"]}}));
        let c = client(&mock);
        let main = c.main();
        let dev = c.branch("dev").unwrap();

        let (a, b, d, names) = tokio::join!(
            main.get("a"),
            dev.set("b", "2", None),
            dev.get("d"),
            c.branches()
        );
        assert_eq!(a.unwrap().as_deref(), Some("v"));
        assert_eq!(b.unwrap().unwrap().hash, "h");
        assert_eq!(d.unwrap().as_deref(), Some("v"));
        assert_eq!(names.unwrap(), ["main", "dev"]);

        let requests = mock.requests();
        assert_eq!(requests.len(), 4);
        for req in requests.iter().filter(|r| r.envelope.variables.contains_key("key")) {
            let key = req.envelope.variables["key"].as_str().unwrap();
            let branch = req.envelope.variables["branch"].as_str().unwrap();
            let expected = if key == "a" { "main" } else { "dev" };
            assert_eq!(branch, expected, "request for {key}");
        }
    }

    #[tokio::test]
    async fn handles_move_across_tasks() {
        let mock = MockTransport::new()
            .with_route("Get", json!({"data": {"branch": {"get": {"value": "v"}}}}));
        let c = client(&mock);

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let b = c.main();
                tokio::spawn(async move { b.get(format!("k{i}")).await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap().as_deref(), Some("v"));
        }
        assert_eq!(mock.request_count(), 8);
    }
}
