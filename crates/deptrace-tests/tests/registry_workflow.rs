//! E2E tests for registry-backed analysis against a mock registry

use anyhow::Result;
use deptrace_lib::application::{AnalysisConfig, AppConfig, render_flat, run_analysis};
use deptrace_lib::graph::{Completion, PackageKey};
use deptrace_tests::{AnalysisFixture, TestEnvironment, dependencies_body, versions_body};
use mockito::Server;

#[tokio::test]
async fn e2e_registry_graph_with_requirement_resolution() -> Result<()> {
    let mut server = Server::new_async().await;
    let _root = server
        .mock("GET", "/crates/web/2.1.0/dependencies")
        .with_status(200)
        .with_body(dependencies_body(&[
            ("http", "^1.0", "normal"),
            ("log", "^0.4", "normal"),
        ]))
        .create_async()
        .await;
    let _http_versions = server
        .mock("GET", "/crates/http/versions")
        .with_status(200)
        .with_body(versions_body(&[("1.2.0", false), ("1.1.0", false), ("0.2.9", false)]))
        .create_async()
        .await;
    let _http = server
        .mock("GET", "/crates/http/1.2.0/dependencies")
        .with_status(200)
        .with_body(dependencies_body(&[("log", "^0.4", "normal")]))
        .create_async()
        .await;
    let _log_versions = server
        .mock("GET", "/crates/log/versions")
        .with_status(200)
        .with_body(versions_body(&[("0.4.22", false), ("0.4.23", true)]))
        .expect(1)
        .create_async()
        .await;
    let log = server
        .mock("GET", "/crates/log/0.4.22/dependencies")
        .with_status(200)
        .with_body(dependencies_body(&[]))
        .expect(1)
        .create_async()
        .await;

    let env = TestEnvironment::new()?;
    let url = format!("{}/crates", server.url());
    let config = env.write_config(&AnalysisFixture::registry(&url, "web", "2.1.0"))?;

    let analysis = AnalysisConfig::load(&config)?;
    let traversal = run_analysis(&AppConfig::default(), &analysis, None).await?;

    assert_eq!(traversal.completion, Completion::Complete);
    assert!(traversal.cycles.is_empty());
    assert!(traversal.warnings.is_empty());
    assert_eq!(traversal.graph.node_count(), 3);
    assert!(render_flat(&traversal).contains("web@2.1.0: http@^1.0, log@^0.4\n"));
    // log@^0.4 is shared by web and http but fetched once
    log.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn e2e_registry_cycle_and_failed_node() -> Result<()> {
    let mut server = Server::new_async().await;
    let _a = server
        .mock("GET", "/crates/a/1.0.0/dependencies")
        .with_status(200)
        .with_body(dependencies_body(&[
            ("b", "1.0.0", "normal"),
            ("gone", "1.0.0", "build"),
        ]))
        .create_async()
        .await;
    let _b = server
        .mock("GET", "/crates/b/1.0.0/dependencies")
        .with_status(200)
        .with_body(dependencies_body(&[("a", "1.0.0", "dev")]))
        .create_async()
        .await;
    let _gone = server
        .mock("GET", "/crates/gone/1.0.0/dependencies")
        .with_status(404)
        .create_async()
        .await;

    let env = TestEnvironment::new()?;
    let url = format!("{}/crates", server.url());
    let config = env.write_config(&AnalysisFixture::registry(&url, "a", "1.0.0"))?;

    let analysis = AnalysisConfig::load(&config)?;
    let traversal = run_analysis(&AppConfig::default(), &analysis, None).await?;

    let cycles: Vec<String> = traversal.cycles.iter().map(|c| c.to_string()).collect();
    assert_eq!(cycles, vec!["a@1.0.0 → b@1.0.0 → a@1.0.0"]);
    assert_eq!(traversal.warnings.len(), 1);
    assert_eq!(traversal.warnings[0].package, PackageKey::new("gone", "1.0.0"));
    assert!(traversal.graph.contains(&PackageKey::new("gone", "1.0.0")));
    Ok(())
}
