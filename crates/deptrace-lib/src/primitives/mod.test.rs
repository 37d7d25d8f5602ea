use super::*;

#[test]
fn test_log_level_from_verbosity() {
    assert_eq!(LogLevel::from_verbosity(0), LogLevel::Error);
    assert_eq!(LogLevel::from_verbosity(2), LogLevel::Info);
    assert_eq!(LogLevel::from_verbosity(4), LogLevel::Trace);
    assert_eq!(LogLevel::from_verbosity(200), LogLevel::Trace);
}

#[test]
fn test_log_level_directive() {
    assert_eq!(LogLevel::Warning.as_directive(), "warn");
    assert_eq!(LogLevel::Debug.as_directive(), "debug");
}

#[test]
fn test_value_enum_fromstr_aliases() {
    assert_eq!("yml".parse::<LogFormat>().unwrap(), LogFormat::Yaml);
    assert_eq!("plain".parse::<LogFormat>().unwrap(), LogFormat::Text);
    assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warning);
    assert_eq!("stdout".parse::<LogOutput>().unwrap(), LogOutput::Stdout);
    assert_eq!("never".parse::<ColorIntent>().unwrap(), ColorIntent::Never);
}

#[test]
fn test_value_enum_fromstr_rejects_unknown() {
    let err = "loud".parse::<LogLevel>().unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { ref value, .. } if value == "loud"));
}

#[test]
fn test_color_intent_explicit_modes() {
    assert!(ColorIntent::Always.resolve(LogOutput::Stderr));
    assert!(!ColorIntent::Never.resolve(LogOutput::Stdout));
}
