use super::*;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("deptrace").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_no_subcommand_is_accepted() {
    let cli = parse(&[]);
    assert!(cli.command.is_none());
}

#[test]
fn test_analyze_defaults() {
    let cli = parse(&["analyze"]);
    let Some(Commands::Analyze(args)) = cli.command else {
        panic!("expected analyze");
    };
    assert_eq!(args.mode, InputMode::Config);
    assert_eq!(args.config, PathBuf::from("config.toml"));
    assert!(args.output.is_none());
    assert!(args.max_depth.is_none());
    assert!(!args.json);
}

#[test]
fn test_analyze_overrides() {
    let cli = parse(&[
        "--jobs",
        "2",
        "analyze",
        "--mode",
        "interactive",
        "--config",
        "other.toml",
        "--output",
        "graph.txt",
        "--max-depth",
        "unbounded",
        "--json",
    ]);
    assert_eq!(cli.config.jobs, 2);
    let Some(Commands::Analyze(args)) = cli.command else {
        panic!("expected analyze");
    };
    assert_eq!(args.mode, InputMode::Interactive);
    assert_eq!(args.config, PathBuf::from("other.toml"));
    assert_eq!(args.output, Some(PathBuf::from("graph.txt")));
    assert_eq!(args.max_depth, Some(MaxDepth::Unbounded));
    assert!(args.json);
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = parse(&["analyze", "--max-depth", "3", "--log-level", "2"]);
    assert_eq!(cli.config.log_level, 2);
    let Some(Commands::Analyze(args)) = cli.command else {
        panic!("expected analyze");
    };
    assert_eq!(args.max_depth, Some(MaxDepth::Bounded(3)));
}

#[test]
fn test_negative_depth_flag_rejected() {
    let result = Cli::try_parse_from(["deptrace", "analyze", "--max-depth", "-2"]);
    assert!(result.is_err());
}

#[test]
fn test_version_subcommand() {
    assert!(matches!(parse(&["version"]).command, Some(Commands::Version)));
}
