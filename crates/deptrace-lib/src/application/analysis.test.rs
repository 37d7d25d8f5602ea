use super::*;
use std::fs;
use tempfile::TempDir;

const VALID: &str = r#"
[package]
name = "A"
version = "1.0"

[repository]
url = "https://crates.io/api/v1/crates"
use_test_repository = true

[analysis]
max_depth = 3
"#;

fn parse(text: &str) -> Result<AnalysisConfig, ConfigError> {
    AnalysisConfig::from_toml_str(text, Path::new("config.toml"))
}

#[test]
fn test_valid_config() {
    let config = parse(VALID).unwrap();
    assert_eq!(config.package_name, "A");
    assert_eq!(config.package_version, "1.0");
    assert!(config.use_test_repository);
    assert_eq!(config.test_repository_path, None);
    assert_eq!(config.max_depth, MaxDepth::Bounded(3));
    assert!(config.memoize);
    assert_eq!(config.output, None);
    assert_eq!(config.timeout, None);
    assert_eq!(config.root_key(), PackageKey::new("A", "1.0"));
}

#[test]
fn test_optional_fields() {
    let text = r#"
[package]
name = "serde"
version = "^1.0"

[repository]
url = "http://localhost/api"
use_test_repository = false
test_repository_path = "  "

[analysis]
max_depth = "Unbounded"
memoize = false
output = "out/graph.txt"
timeout_secs = 90
"#;
    let config = parse(text).unwrap();
    assert_eq!(config.max_depth, MaxDepth::Unbounded);
    assert!(!config.memoize);
    assert_eq!(config.output, Some(PathBuf::from("out/graph.txt")));
    assert_eq!(config.timeout, Some(Duration::from_secs(90)));
    assert_eq!(config.test_repository_path, None);
}

#[test]
fn test_missing_sections() {
    for section in ["package", "repository", "analysis"] {
        let text: String = VALID
            .split("\n[")
            .filter(|block| !block.starts_with(&format!("{}]", section)))
            .collect::<Vec<_>>()
            .join("\n[");
        let err = parse(&text).unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingSection { section: ref s } if s == section),
            "{}: {}",
            section,
            err
        );
    }
}

#[test]
fn test_missing_and_empty_fields() {
    let cases = [
        ("name = \"A\"", "name = \"\"", "package.name"),
        ("version = \"1.0\"", "", "package.version"),
        ("url = \"https://crates.io/api/v1/crates\"", "", "repository.url"),
        ("use_test_repository = true", "", "repository.use_test_repository"),
        ("max_depth = 3", "", "analysis.max_depth"),
    ];
    for (from, to, field) in cases {
        let err = parse(&VALID.replace(from, to)).unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingField { field: ref f } if f == field),
            "{}: {}",
            field,
            err
        );
    }
}

#[test]
fn test_depth_must_be_positive() {
    for bad in ["max_depth = 0", "max_depth = -3", "max_depth = \"deep\"", "max_depth = 2.5"] {
        let err = parse(&VALID.replace("max_depth = 3", bad)).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidField { ref field, .. } if field == "analysis.max_depth"),
            "{}: {}",
            bad,
            err
        );
    }
}

#[test]
fn test_numeric_depth_string_accepted() {
    let config = parse(&VALID.replace("max_depth = 3", "max_depth = \"7\"")).unwrap();
    assert_eq!(config.max_depth, MaxDepth::Bounded(7));
}

#[test]
fn test_syntax_error_is_toml_parse() {
    let err = parse("[package\nname = ").unwrap_err();
    assert!(matches!(err, ConfigError::TomlParse { .. }));
}

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, VALID).unwrap();

    let config = AnalysisConfig::load(&path).unwrap();
    assert_eq!(config.package_name, "A");
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = AnalysisConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn test_overrides() {
    let args = AnalyzeArgs {
        max_depth: Some(MaxDepth::Unbounded),
        output: Some(PathBuf::from("graph.txt")),
        ..AnalyzeArgs::default()
    };
    let config = parse(VALID).unwrap().with_overrides(&args);
    assert_eq!(config.max_depth, MaxDepth::Unbounded);
    assert_eq!(config.output, Some(PathBuf::from("graph.txt")));
}

#[test]
fn test_validate_assembled_config() {
    let mut config = parse(VALID).unwrap();
    assert!(config.validate().is_ok());

    config.max_depth = MaxDepth::Bounded(0);
    assert!(config.validate().is_err());

    config.max_depth = MaxDepth::Bounded(1);
    config.package_version = " ".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingField { ref field }) if field == "package.version"
    ));
}

#[test]
fn test_test_repository_builds_static_source() {
    let config = parse(VALID).unwrap();
    let source = config.build_source(&AppConfig::default()).unwrap();
    assert!(matches!(source, ConfiguredSource::Static(_)));
}

#[test]
fn test_registry_source_selected() {
    let config = parse(&VALID.replace("use_test_repository = true", "use_test_repository = false"))
        .unwrap();
    let source = config.build_source(&AppConfig::default()).unwrap();
    assert!(matches!(source, ConfiguredSource::Registry(_)));

    let options = config.traversal_options(&AppConfig::default(), None);
    assert_eq!(options.prefetch_jobs, 4);
    assert!(options.memoize);
    assert!(options.deadline.is_none());
}
