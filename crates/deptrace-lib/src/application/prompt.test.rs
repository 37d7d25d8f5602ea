use super::*;
use crate::graph::MaxDepth;
use crate::testing::ScriptedPrompter;

#[test]
fn test_registry_answers() {
    let prompter = ScriptedPrompter::new(&["serde", "1.0.210", "n", "", "unbounded"]);
    let config = AnalysisConfig::from_prompts(&prompter).unwrap();

    assert_eq!(config.package_name, "serde");
    assert_eq!(config.package_version, "1.0.210");
    assert!(!config.use_test_repository);
    assert_eq!(config.repository_url, DEFAULT_REGISTRY_URL);
    assert_eq!(config.max_depth, MaxDepth::Unbounded);
    assert!(config.memoize);
}

#[test]
fn test_test_repository_answers() {
    let prompter = ScriptedPrompter::new(&["A", "1.0", "yes", "deps.txt", "2"]);
    let config = AnalysisConfig::from_prompts(&prompter).unwrap();

    assert!(config.use_test_repository);
    assert_eq!(config.test_repository_path, Some(PathBuf::from("deps.txt")));
    assert_eq!(config.max_depth, MaxDepth::Bounded(2));
}

#[test]
fn test_blank_table_path_means_demo() {
    let prompter = ScriptedPrompter::new(&["A", "1.0", "y", "", ""]);
    let config = AnalysisConfig::from_prompts(&prompter).unwrap();

    assert_eq!(config.test_repository_path, None);
    assert_eq!(config.max_depth, MaxDepth::Bounded(3));
}

#[test]
fn test_invalid_answers_are_asked_again() {
    let prompter = ScriptedPrompter::new(&["", "A", "1.0", "y", "", "0", "lots", "4"]);
    let config = AnalysisConfig::from_prompts(&prompter).unwrap();

    assert_eq!(config.package_name, "A");
    assert_eq!(config.max_depth, MaxDepth::Bounded(4));
    let asked = prompter.asked();
    assert_eq!(asked.iter().filter(|p| *p == "Package name").count(), 2);
    assert_eq!(asked.iter().filter(|p| p.starts_with("Maximum depth")).count(), 3);
}

#[test]
fn test_running_out_of_answers_fails() {
    let prompter = ScriptedPrompter::new(&["A"]);
    let err = AnalysisConfig::from_prompts(&prompter).unwrap_err();
    assert!(matches!(err, ConfigError::PromptFailed { .. }));
}
