use super::*;

#[test]
fn test_config_loading_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.log_level, 0);
    assert_eq!(config.net_timeout, 30);
    assert_eq!(config.jobs, 4);
    assert_eq!(config.color, ColorIntent::Auto);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_merging() {
    let base = AppConfig::default();
    let override_config = AppConfig {
        log_level: 4,
        color: ColorIntent::Always,
        jobs: 16,
        ..AppConfig::default()
    };

    let merged = base.merge_with(override_config);
    assert_eq!(merged.log_level, 4);
    assert_eq!(merged.color, ColorIntent::Always);
    assert_eq!(merged.jobs, 16);
    assert_eq!(merged.net_timeout, 30);
}

#[test]
fn test_merge_keeps_base_when_other_is_default() {
    let base = AppConfig {
        color: ColorIntent::Never,
        net_timeout: 5,
        ..AppConfig::default()
    };
    let merged = base.merge_with(AppConfig::default());
    assert_eq!(merged.color, ColorIntent::Never);
    assert_eq!(merged.net_timeout, 5);
}

#[test]
fn test_zero_jobs_rejected() {
    let config = AppConfig {
        jobs: 0,
        ..AppConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidField { ref field, .. }) if field == "jobs"
    ));
}

#[test]
fn test_logger_and_networking_configs() {
    let config = AppConfig {
        log_level: 3,
        log_format: LogFormat::Json,
        color: ColorIntent::Never,
        jobs: 8,
        net_timeout: 12,
        ..AppConfig::default()
    };

    let logger = config.to_logger_config();
    assert_eq!(logger.level, LogLevel::Debug);
    assert_eq!(logger.format, LogFormat::Json);
    assert!(!logger.ansi);

    let networking = config.to_networking_config();
    assert_eq!(networking.max_jobs, 8);
    assert_eq!(networking.timeout_seconds, 12);
}
