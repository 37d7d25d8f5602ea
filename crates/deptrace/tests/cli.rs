//! Binary-level tests: exit codes, stdout/stderr, and written files

use assert_cmd::Command;
use deptrace_tests::{AnalysisFixture, TestEnvironment, dependencies_body};
use mockito::Server;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;

fn deptrace(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("deptrace"));
    cmd.current_dir(dir);
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn version_prints_crate_version() {
    let env = TestEnvironment::new().unwrap();
    deptrace(env.root())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "deptrace {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn no_subcommand_prints_usage_hint() {
    let env = TestEnvironment::new().unwrap();
    deptrace(env.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("deptrace --help"));
}

#[test]
fn analyze_demo_table_reports_cycle() {
    let env = TestEnvironment::new().unwrap();
    let fixture = AnalysisFixture::test_repository().output(&env.path("graph.txt"));
    env.write_config(&fixture).unwrap();

    deptrace(env.root())
        .arg("analyze")
        .assert()
        .success()
        .stdout(predicate::str::contains("Level 0"))
        .stdout(predicate::str::contains("A → C → E → A"));

    let written = env.read("graph.txt").unwrap();
    assert!(written.starts_with("# Dependency graph for A@1.0\n# Max depth: unbounded\n"));
    assert!(written.contains("# Cycles:\n# A@1.0 → C@1.0 → E@1.0 → A@1.0\n"));
}

#[test]
fn analyze_flags_override_config() {
    let env = TestEnvironment::new().unwrap();
    env.write_raw_config("custom.toml", &AnalysisFixture::test_repository().to_toml())
        .unwrap();

    deptrace(env.root())
        .args([
            "analyze",
            "--config",
            "custom.toml",
            "--max-depth",
            "0",
            "--output",
            "out/flat.txt",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cycles detected"));

    let written = env.read("out/flat.txt").unwrap();
    assert_eq!(
        written,
        "# Dependency graph for A@1.0\n# Max depth: 0\n# Nodes: 1\nA@1.0: B@1.0, C@1.0\n"
    );
}

#[test]
fn analyze_json_output() {
    let env = TestEnvironment::new().unwrap();
    env.write_config(&AnalysisFixture::test_repository()).unwrap();

    let output = deptrace(env.root())
        .args(["analyze", "--json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "analyze failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["completion"], "complete");
    assert_eq!(result["max_depth"], "unbounded");
    assert_eq!(result["graph"]["nodes"].as_array().map(Vec::len), Some(6));
    assert_eq!(result["cycles"][0]["closing"]["name"], "A");
}

#[test]
fn missing_config_exits_with_code_one() {
    let env = TestEnvironment::new().unwrap();
    deptrace(env.root())
        .arg("analyze")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn invalid_config_exits_with_code_one() {
    let env = TestEnvironment::new().unwrap();
    env.write_raw_config(
        "config.toml",
        "[package]\nname = \"A\"\nversion = \"1.0\"\n\n[analysis]\nmax_depth = 2\n",
    )
    .unwrap();

    deptrace(env.root())
        .arg("analyze")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[repository]"));
}

#[test]
fn negative_depth_flag_is_rejected() {
    let env = TestEnvironment::new().unwrap();
    env.write_config(&AnalysisFixture::test_repository()).unwrap();

    deptrace(env.root())
        .args(["analyze", "--max-depth=-1"])
        .assert()
        .failure();
}

#[test]
fn registry_failure_is_a_warning_not_an_error() {
    let mut server = Server::new();
    let _root = server
        .mock("GET", "/crates/app/1.0.0/dependencies")
        .with_status(200)
        .with_body(dependencies_body(&[("flaky", "1.0.0", "normal")]))
        .create();
    let _flaky = server
        .mock("GET", "/crates/flaky/1.0.0/dependencies")
        .with_status(503)
        .create();

    let env = TestEnvironment::new().unwrap();
    let url = format!("{}/crates", server.url());
    env.write_config(&AnalysisFixture::registry(&url, "app", "1.0.0"))
        .unwrap();

    deptrace(env.root())
        .arg("analyze")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dependencies unavailable for 1 package(s)"))
        .stdout(predicate::str::contains("flaky@1.0.0"));
}
