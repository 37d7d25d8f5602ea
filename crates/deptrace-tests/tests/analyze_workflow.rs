//! E2E tests for the analyze pipeline against offline dependency tables

use anyhow::Result;
use deptrace_lib::application::{
    AnalysisConfig, AnalyzeArgs, AppConfig, CliConfig, Commands, execute_command, render_flat,
    run_analysis,
};
use deptrace_lib::graph::{Completion, MaxDepth, PackageKey};
use deptrace_tests::{AnalysisFixture, TestEnvironment};

async fn analyze(env: &TestEnvironment, fixture: &AnalysisFixture) -> Result<()> {
    let config = env.write_config(fixture)?;
    execute_command(CliConfig {
        app_config: AppConfig::default(),
        command: Some(Commands::Analyze(AnalyzeArgs {
            config,
            ..AnalyzeArgs::default()
        })),
    })
    .await
}

#[tokio::test]
async fn e2e_demo_table_reports_cycle_in_output_file() -> Result<()> {
    let env = TestEnvironment::new()?;
    let fixture = AnalysisFixture::test_repository().output(&env.path("graph.txt"));

    analyze(&env, &fixture).await?;

    let written = env.read("graph.txt")?;
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[0], "# Dependency graph for A@1.0");
    assert_eq!(lines[1], "# Max depth: unbounded");
    assert_eq!(lines[2], "# Nodes: 6");
    assert!(lines.contains(&"C@1.0: D@1.0, E@1.0"));
    assert!(lines.contains(&"D@1.0: F@1.0"));
    assert!(!written.contains("F@1.0:"));
    assert!(lines.ends_with(&["# Cycles:", "# A@1.0 → C@1.0 → E@1.0 → A@1.0"]));
    Ok(())
}

#[tokio::test]
async fn e2e_table_file_with_two_cycles() -> Result<()> {
    let env = TestEnvironment::new()?;
    let table = env.write_table(
        "deps.txt",
        "# two independent cycles\nA: B, C\nB: D\nC: A, E\nD: F\nE: G\nF: B\nG:\n",
    )?;
    let config = env.write_config(&AnalysisFixture::test_repository().table(&table))?;

    let analysis = AnalysisConfig::load(&config)?;
    let traversal = run_analysis(&AppConfig::default(), &analysis, None).await?;

    let cycles: Vec<String> = traversal.cycles.iter().map(|c| c.names()).collect();
    assert_eq!(cycles, vec!["B → D → F → B", "A → C → A"]);
    assert_eq!(traversal.graph.node_count(), 7);
    assert_eq!(traversal.completion, Completion::Complete);
    Ok(())
}

#[tokio::test]
async fn e2e_depth_bound_limits_expansion() -> Result<()> {
    let env = TestEnvironment::new()?;
    let config = env.write_config(&AnalysisFixture::test_repository().max_depth("1"))?;

    let analysis = AnalysisConfig::load(&config)?;
    assert_eq!(analysis.max_depth, MaxDepth::Bounded(1));
    let traversal = run_analysis(&AppConfig::default(), &analysis, None).await?;

    let flat = render_flat(&traversal);
    assert!(flat.contains("# Max depth: 1\n# Nodes: 3\n"));
    assert!(traversal.cycles.is_empty());
    Ok(())
}

#[tokio::test]
async fn e2e_unreadable_table_falls_back_to_demo() -> Result<()> {
    let env = TestEnvironment::new()?;
    let fixture = AnalysisFixture::test_repository().table(&env.path("missing.txt"));
    let config = env.write_config(&fixture)?;

    let analysis = AnalysisConfig::load(&config)?;
    let traversal = run_analysis(&AppConfig::default(), &analysis, None).await?;

    assert_eq!(traversal.cycles.len(), 1);
    assert!(traversal.graph.contains(&PackageKey::new("F", "1.0")));
    Ok(())
}

#[tokio::test]
async fn e2e_malformed_table_is_rejected() -> Result<()> {
    let env = TestEnvironment::new()?;
    let table = env.write_table("deps.txt", "A: B\nA: C\n")?;
    let config = env.write_config(&AnalysisFixture::test_repository().table(&table))?;

    let analysis = AnalysisConfig::load(&config)?;
    let result = run_analysis(&AppConfig::default(), &analysis, None).await;

    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn e2e_invalid_depth_in_config_fails() -> Result<()> {
    let env = TestEnvironment::new()?;
    let fixture = AnalysisFixture::test_repository().max_depth("0");

    let err = analyze(&env, &fixture).await.unwrap_err();
    assert!(format!("{:#}", err).contains("analysis.max_depth"));
    Ok(())
}

#[tokio::test]
async fn e2e_runs_are_reproducible() -> Result<()> {
    let env = TestEnvironment::new()?;
    let config = env.write_config(&AnalysisFixture::test_repository())?;
    let analysis = AnalysisConfig::load(&config)?;

    let first = run_analysis(&AppConfig::default(), &analysis, None).await?;
    let second = run_analysis(&AppConfig::default(), &analysis, None).await?;

    assert_eq!(render_flat(&first), render_flat(&second));
    assert_eq!(serde_json::to_string(&first)?, serde_json::to_string(&second)?);
    Ok(())
}
