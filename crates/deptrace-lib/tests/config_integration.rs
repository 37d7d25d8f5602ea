use deptrace_lib::application::{AnalysisConfig, AppConfig, Cli, CliConfig, Commands};
use deptrace_lib::graph::MaxDepth;
use deptrace_lib::primitives::{ColorIntent, ConfigError};
use clap::Parser;
use std::path::Path;

#[test]
fn test_config_default_creation() {
    let config = AppConfig::default();

    assert!(config.log_level <= 4);
    assert!(config.net_timeout > 0);
    assert!(config.jobs > 0);
    assert_eq!(config.color, ColorIntent::Auto);
}

#[test]
fn test_config_merging_integration() {
    let base_config = AppConfig::default();
    let override_config = AppConfig {
        log_level: 3,
        jobs: 8,
        color: ColorIntent::Never,
        ..AppConfig::default()
    };

    let merged = base_config.merge_with(override_config);

    assert_eq!(merged.log_level, 3);
    assert_eq!(merged.jobs, 8);
    assert_eq!(merged.color, ColorIntent::Never);
    assert_eq!(merged.net_timeout, 30);
}

#[test]
fn test_cli_to_analysis_overrides() {
    let cli = Cli::try_parse_from([
        "deptrace",
        "--color",
        "never",
        "analyze",
        "--max-depth",
        "unbounded",
    ])
    .unwrap();
    let config = CliConfig::from(cli);
    assert_eq!(config.app_config.color, ColorIntent::Never);

    let Some(Commands::Analyze(args)) = config.command else {
        panic!("expected analyze");
    };
    let analysis = AnalysisConfig::from_toml_str(
        "[package]\nname = \"A\"\nversion = \"1.0\"\n\
         [repository]\nurl = \"x\"\nuse_test_repository = true\n\
         [analysis]\nmax_depth = 2\n",
        Path::new("inline.toml"),
    )
    .unwrap()
    .with_overrides(&args);
    assert_eq!(analysis.max_depth, MaxDepth::Unbounded);
}

#[test]
fn test_missing_section_names_section() {
    let err = AnalysisConfig::from_toml_str("[package]\nname = \"A\"\n", Path::new("c.toml"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::MissingSection { .. }));
    assert!(err.to_string().contains("[repository]"));
}
