use super::*;
use crate::primitives::ColorIntent;

#[test]
fn test_resolve_applies_environment_colour() {
    let env = EnvironmentConfig {
        no_color: Some("1".to_string()),
        ..EnvironmentConfig::default()
    };
    let config = AppConfig::resolve(AppConfig::default(), &env).unwrap();
    assert_eq!(config.color, ColorIntent::Never);
}

#[test]
fn test_explicit_flag_beats_environment() {
    let env = EnvironmentConfig {
        ci: Some("true".to_string()),
        ..EnvironmentConfig::default()
    };
    let cli = AppConfig {
        color: ColorIntent::Always,
        log_level: 2,
        ..AppConfig::default()
    };
    let config = AppConfig::resolve(cli, &env).unwrap();
    assert_eq!(config.color, ColorIntent::Always);
    assert_eq!(config.log_level, 2);
}

#[test]
fn test_resolve_validates() {
    let cli = AppConfig {
        jobs: 0,
        ..AppConfig::default()
    };
    assert!(AppConfig::resolve(cli, &EnvironmentConfig::default()).is_err());
}

#[test]
fn test_missing_env_files_are_ignored() {
    // Test working directory is the crate root, which has no .env files
    assert!(load_env_files().is_ok());
}
