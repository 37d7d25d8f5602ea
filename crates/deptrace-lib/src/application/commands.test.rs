use super::*;
use crate::graph::{Completion, MaxDepth, PackageKey};
use crate::primitives::ConfigError;
use mockito::Server;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_config(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, body).unwrap();
    path
}

fn test_repository_config(dir: &Path, table: Option<&str>) -> PathBuf {
    let table_line = match table {
        Some(text) => {
            let table_path = dir.join("deps.txt");
            fs::write(&table_path, text).unwrap();
            format!("test_repository_path = {:?}\n", table_path.display().to_string())
        }
        None => String::new(),
    };
    let output = dir.join("graph.txt").display().to_string();
    write_config(
        dir,
        &format!(
            "[package]\nname = \"A\"\nversion = \"1.0\"\n\n\
             [repository]\nurl = \"https://crates.io/api/v1/crates\"\nuse_test_repository = true\n{}\n\
             [analysis]\nmax_depth = \"unbounded\"\noutput = {:?}\n",
            table_line, output
        ),
    )
}

#[tokio::test]
async fn test_version_and_no_command_succeed() {
    let config = CliConfig {
        app_config: AppConfig::default(),
        command: Some(Commands::Version),
    };
    assert!(execute_command(config).await.is_ok());

    let config = CliConfig {
        app_config: AppConfig::default(),
        command: None,
    };
    assert!(execute_command(config).await.is_ok());
}

#[tokio::test]
async fn test_analyze_demo_table_writes_output() {
    let dir = TempDir::new().unwrap();
    let config_path = test_repository_config(dir.path(), None);

    let args = AnalyzeArgs {
        config: config_path,
        ..AnalyzeArgs::default()
    };
    execute_command(CliConfig {
        app_config: AppConfig::default(),
        command: Some(Commands::Analyze(args)),
    })
    .await
    .unwrap();

    let written = fs::read_to_string(dir.path().join("graph.txt")).unwrap();
    assert!(written.starts_with("# Dependency graph for A@1.0\n"));
    assert!(written.contains("# A@1.0 → C@1.0 → E@1.0 → A@1.0"));
}

#[tokio::test]
async fn test_analyze_with_table_file_and_depth_override() {
    let dir = TempDir::new().unwrap();
    let config_path = test_repository_config(dir.path(), Some("A: B\nB: C\nC: A\n"));
    let args = AnalyzeArgs {
        config: config_path.clone(),
        max_depth: Some(MaxDepth::Bounded(1)),
        ..AnalyzeArgs::default()
    };

    let analysis = AnalysisConfig::load(&config_path)
        .unwrap()
        .with_overrides(&args);
    let traversal = run_analysis(&AppConfig::default(), &analysis, None)
        .await
        .unwrap();

    assert_eq!(traversal.max_depth, MaxDepth::Bounded(1));
    assert_eq!(traversal.graph.node_count(), 2);
    assert!(traversal.cycles.is_empty());
    assert_eq!(traversal.completion, Completion::Complete);
}

#[tokio::test]
async fn test_missing_config_file_fails_with_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");
    let args = AnalyzeArgs {
        config: missing,
        ..AnalyzeArgs::default()
    };

    let err = execute_command(CliConfig {
        app_config: AppConfig::default(),
        command: Some(Commands::Analyze(args)),
    })
    .await
    .unwrap_err();

    assert!(format!("{:#}", err).contains("nope.toml"));
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_registry_analysis_isolates_failures() {
    let mut server = Server::new_async().await;
    let _root = server
        .mock("GET", "/api/v1/crates/app/1.0.0/dependencies")
        .with_status(200)
        .with_body(
            r#"{"dependencies": [
                {"crate_id": "good", "req": "1.0.0", "kind": "normal"},
                {"crate_id": "bad", "req": "2.0.0", "kind": "dev"}
            ]}"#,
        )
        .create_async()
        .await;
    let _good = server
        .mock("GET", "/api/v1/crates/good/1.0.0/dependencies")
        .with_status(200)
        .with_body(r#"{"dependencies": []}"#)
        .create_async()
        .await;
    let _bad = server
        .mock("GET", "/api/v1/crates/bad/2.0.0/dependencies")
        .with_status(500)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = write_config(
        dir.path(),
        &format!(
            "[package]\nname = \"app\"\nversion = \"1.0.0\"\n\n\
             [repository]\nurl = \"{}/api/v1/crates\"\nuse_test_repository = false\n\n\
             [analysis]\nmax_depth = 2\n",
            server.url()
        ),
    );

    let analysis = AnalysisConfig::load(&config_path).unwrap();
    let traversal = run_analysis(&AppConfig::default(), &analysis, None)
        .await
        .unwrap();

    assert_eq!(traversal.root, PackageKey::new("app", "1.0.0"));
    assert_eq!(traversal.graph.node_count(), 3);
    assert_eq!(traversal.warnings.len(), 1);
    assert_eq!(traversal.warnings[0].package.name(), "bad");
    let kinds: Vec<&str> = traversal
        .graph
        .dependencies(&traversal.root)
        .unwrap()
        .iter()
        .map(|edge| edge.kind.as_str())
        .collect();
    assert_eq!(kinds, vec!["normal", "dev"]);

    emit_report(&AppConfig::default(), &analysis, &traversal, true).unwrap();
}
