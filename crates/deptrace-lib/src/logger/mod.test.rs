use super::*;

#[test]
fn test_default_directives_pin_http_stack() {
    let directives = Logger::default_directives(LogLevel::Debug);
    assert!(directives.starts_with("deptrace=debug"));
    assert!(directives.contains("deptrace_lib=debug"));
    assert!(directives.contains("reqwest=warn"));
    assert!(directives.contains("hyper_util=warn"));
}

#[test]
fn test_default_directives_parse() {
    for level in [LogLevel::Error, LogLevel::Info, LogLevel::Trace] {
        let filter = EnvFilter::try_new(Logger::default_directives(level));
        assert!(filter.is_ok(), "directives for {:?} should parse", level);
    }
}

#[test]
fn test_spinner_template_is_valid() {
    assert!(ProgressStyle::with_template(FETCH_SPINNER_TEMPLATE).is_ok());
}

#[test]
fn test_logger_global_consistent() {
    // Other tests may have initialized the logger; both states must agree
    assert_eq!(Logger::is_initialized(), Logger::global().is_some());
}
