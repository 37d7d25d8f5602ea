use super::*;
use crate::networking::{NetworkingConfig, RetryPolicy};
use mockito::Server;
use std::time::Duration;

fn test_networking() -> NetworkingManager {
    NetworkingManager::new(NetworkingConfig {
        max_jobs: 2,
        timeout_seconds: 5,
        retry: RetryPolicy {
            initial: Duration::from_millis(5),
            max: Duration::from_millis(20),
            ..RetryPolicy::default()
        },
    })
    .unwrap()
}

fn source_for(server: &Server) -> RegistrySource {
    RegistrySource::new(test_networking(), format!("{}/api/v1/crates/", server.url()))
}

#[test]
fn test_dependencies_url_escapes_segments() {
    let source = RegistrySource::new(test_networking(), "https://example.test/crates/");
    assert_eq!(source.base_url(), "https://example.test/crates");
    assert_eq!(
        source.dependencies_url("serde", "1.0.210"),
        "https://example.test/crates/serde/1.0.210/dependencies"
    );
    assert_eq!(
        source.dependencies_url("serde", "^1.0"),
        "https://example.test/crates/serde/%5E1.0/dependencies"
    );
}

#[tokio::test]
async fn test_fetch_decodes_in_order_with_default_kind() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/crates/app/1.2.0/dependencies")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"dependencies": [
                {"crate_id": "serde", "req": "^1.0", "kind": "normal", "optional": false},
                {"crate_id": "tempfile", "req": "^3", "kind": "dev"},
                {"crate_id": "cc", "req": "^1.1"}
            ]}"#,
        )
        .create_async()
        .await;

    let deps = source_for(&server)
        .fetch_dependencies("app", "1.2.0")
        .await
        .unwrap();

    assert_eq!(
        deps,
        vec![
            DependencyDescriptor::new("serde", "^1.0"),
            DependencyDescriptor::new("tempfile", "^3").with_kind("dev"),
            DependencyDescriptor::new("cc", "^1.1"),
        ]
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_dependency_list_is_not_an_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v1/crates/leaf/0.1.0/dependencies")
        .with_status(200)
        .with_body(r#"{"dependencies": []}"#)
        .create_async()
        .await;

    let deps = source_for(&server)
        .fetch_dependencies("leaf", "0.1.0")
        .await
        .unwrap();
    assert!(deps.is_empty());
}

#[tokio::test]
async fn test_non_success_status_is_source_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v1/crates/ghost/1.0.0/dependencies")
        .with_status(404)
        .create_async()
        .await;

    let err = source_for(&server)
        .fetch_dependencies("ghost", "1.0.0")
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Status { status: 404, .. }));
    assert!(err.reason().contains("404"));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v1/crates/broken/1.0.0/dependencies")
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let err = source_for(&server)
        .fetch_dependencies("broken", "1.0.0")
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Decode { .. }));
}

#[tokio::test]
async fn test_body_without_dependency_list_is_a_leaf() {
    let mut server = Server::new_async().await;
    let _no_list = server
        .mock("GET", "/api/v1/crates/a/1.0.0/dependencies")
        .with_status(200)
        .with_body(r#"{"meta": {}}"#)
        .create_async()
        .await;

    let source = source_for(&server);
    assert!(source.fetch_dependencies("a", "1.0.0").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_fields_are_reported() {
    let mut server = Server::new_async().await;
    let _no_crate_id = server
        .mock("GET", "/api/v1/crates/a/1.0.0/dependencies")
        .with_status(200)
        .with_body(r#"{"dependencies": [{"req": "^1"}]}"#)
        .create_async()
        .await;
    let _no_req = server
        .mock("GET", "/api/v1/crates/b/1.0.0/dependencies")
        .with_status(200)
        .with_body(r#"{"dependencies": [{"crate_id": "x"}]}"#)
        .create_async()
        .await;

    let source = source_for(&server);

    let err = source.fetch_dependencies("a", "1.0.0").await.unwrap_err();
    assert!(matches!(err, SourceError::MissingField { ref field, .. } if field == "crate_id"));

    let err = source.fetch_dependencies("b", "1.0.0").await.unwrap_err();
    assert!(matches!(err, SourceError::MissingField { ref field, .. } if field == "req"));
}

#[tokio::test]
async fn test_unreachable_registry_is_transport_error() {
    // Nothing listens on port 9 (discard) on loopback in test environments
    let source = RegistrySource::new(test_networking(), "http://127.0.0.1:9/crates");
    let err = source.fetch_dependencies("serde", "1.0.0").await.unwrap_err();
    assert!(matches!(err, SourceError::Transport { .. }));
}

#[tokio::test]
async fn test_requirement_resolves_to_newest_matching_version() {
    let mut server = Server::new_async().await;
    let versions = server
        .mock("GET", "/api/v1/crates/serde/versions")
        .with_status(200)
        .with_body(
            r#"{"versions": [
                {"num": "2.0.0", "yanked": false},
                {"num": "1.0.9", "yanked": true},
                {"num": "1.0.8", "yanked": false},
                {"num": "1.0.2", "yanked": false}
            ]}"#,
        )
        .expect(1)
        .create_async()
        .await;
    let deps = server
        .mock("GET", "/api/v1/crates/serde/1.0.8/dependencies")
        .with_status(200)
        .with_body(r#"{"dependencies": [{"crate_id": "serde_derive", "req": "=1.0.8"}]}"#)
        .expect(2)
        .create_async()
        .await;

    let source = source_for(&server);
    let first = source.fetch_dependencies("serde", "^1.0").await.unwrap();
    // Same name, different requirement: versions list comes from the cache
    let second = source.fetch_dependencies("serde", "~1.0.3").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first[0].version_req, "=1.0.8");
    versions.assert_async().await;
    deps.assert_async().await;
}

#[tokio::test]
async fn test_requirement_without_match_fails() {
    let mut server = Server::new_async().await;
    let _versions = server
        .mock("GET", "/api/v1/crates/old/versions")
        .with_status(200)
        .with_body(r#"{"versions": [{"num": "0.1.0"}]}"#)
        .create_async()
        .await;

    let err = source_for(&server)
        .fetch_dependencies("old", "^2")
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::NoMatchingVersion { .. }));
}

#[tokio::test]
async fn test_resolution_disabled_requests_verbatim() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/crates/serde/%5E1.0/dependencies")
        .with_status(404)
        .create_async()
        .await;

    let source = source_for(&server).with_requirement_resolution(false);
    let err = source.fetch_dependencies("serde", "^1.0").await.unwrap_err();
    assert!(matches!(err, SourceError::Status { status: 404, .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_throttled_request_is_retried() {
    let mut server = Server::new_async().await;
    let throttled = server
        .mock("GET", "/api/v1/crates/hot/1.0.0/dependencies")
        .with_status(429)
        .expect(1)
        .create_async()
        .await;
    let ok = server
        .mock("GET", "/api/v1/crates/hot/1.0.0/dependencies")
        .with_status(200)
        .with_body(r#"{"dependencies": []}"#)
        .expect(1)
        .create_async()
        .await;

    let deps = source_for(&server)
        .fetch_dependencies("hot", "1.0.0")
        .await
        .unwrap();
    assert!(deps.is_empty());
    throttled.assert_async().await;
    ok.assert_async().await;
}
