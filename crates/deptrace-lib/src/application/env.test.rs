use super::*;

fn env(pairs: &[(&str, &str)]) -> EnvironmentConfig {
    let mut config = EnvironmentConfig::default();
    for (name, value) in pairs {
        let value = Some(value.to_string());
        match *name {
            "NO_COLOR" => config.no_color = value,
            "FORCE_COLOR" => config.force_color = value,
            "CLICOLOR" => config.clicolor = value,
            "CI" => config.ci = value,
            other => panic!("unexpected variable {}", other),
        }
    }
    config
}

#[test]
fn test_no_environment_keeps_intent() {
    let color = env(&[]).apply_color_config(ColorIntent::Auto);
    assert_eq!(color, ColorIntent::Auto);
}

#[test]
fn test_no_color_environment_variable() {
    let color = env(&[("NO_COLOR", "1")]).apply_color_config(ColorIntent::Auto);
    assert_eq!(color, ColorIntent::Never);
}

#[test]
fn test_force_color_environment_variable() {
    let color = env(&[("FORCE_COLOR", "1")]).apply_color_config(ColorIntent::Auto);
    assert_eq!(color, ColorIntent::Always);
}

#[test]
fn test_environment_variable_precedence() {
    let color = env(&[("CLICOLOR", "0"), ("NO_COLOR", "1"), ("FORCE_COLOR", "1")])
        .apply_color_config(ColorIntent::Auto);

    // FORCE_COLOR=1 wins over NO_COLOR and CLICOLOR
    assert_eq!(color, ColorIntent::Always);
}

#[test]
fn test_ci_environment_variable() {
    let color = env(&[("CI", "true"), ("FORCE_COLOR", "1")]).apply_color_config(ColorIntent::Auto);
    assert_eq!(color, ColorIntent::Never);
}

#[test]
fn test_empty_no_color_is_ignored() {
    let color = env(&[("NO_COLOR", "")]).apply_color_config(ColorIntent::Auto);
    assert_eq!(color, ColorIntent::Auto);
}

#[test]
fn test_invalid_force_color_values_ignored() {
    let color = env(&[("FORCE_COLOR", "invalid")]).apply_color_config(ColorIntent::Never);
    assert_eq!(color, ColorIntent::Never);
}
