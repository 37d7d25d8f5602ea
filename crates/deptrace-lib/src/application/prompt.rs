//! Interactive collection of analysis parameters

use dialoguer::theme::{ColorfulTheme, SimpleTheme, Theme};
use dialoguer::{Confirm, Input};
use std::path::PathBuf;
use tracing::warn;

use super::analysis::{AnalysisConfig, parse_max_depth};
use crate::graph::source::DEFAULT_REGISTRY_URL;
use crate::primitives::ConfigError;

/// Question/answer channel used to build an [`AnalysisConfig`]
pub trait Prompter {
    /// Free-text answer; `default` is returned for an empty reply
    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String, ConfigError>;

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool, ConfigError>;
}

/// Prompts on the controlling terminal
pub struct TerminalPrompter {
    theme: Box<dyn Theme>,
}

impl TerminalPrompter {
    pub fn new(color: bool) -> Self {
        let theme: Box<dyn Theme> = if color {
            Box::new(ColorfulTheme::default())
        } else {
            Box::new(SimpleTheme)
        };
        Self { theme }
    }
}

fn prompt_failed(e: dialoguer::Error) -> ConfigError {
    ConfigError::PromptFailed {
        reason: e.to_string(),
    }
}

impl Prompter for TerminalPrompter {
    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String, ConfigError> {
        let mut input = Input::<String>::with_theme(self.theme.as_ref())
            .with_prompt(prompt)
            .allow_empty(default.is_some());
        if let Some(default) = default {
            input = input.default(default.to_string()).show_default(!default.is_empty());
        }
        input.interact_text().map_err(prompt_failed)
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool, ConfigError> {
        Confirm::with_theme(self.theme.as_ref())
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(prompt_failed)
    }
}

/// Ask until `parse` accepts the answer
fn ask_until<T>(
    prompter: &dyn Prompter,
    prompt: &str,
    default: Option<&str>,
    parse: impl Fn(&str) -> Result<T, ConfigError>,
) -> Result<T, ConfigError> {
    loop {
        let answer = prompter.input(prompt, default)?;
        match parse(answer.trim()) {
            Ok(value) => return Ok(value),
            Err(e) => warn!("{}", e),
        }
    }
}

fn non_empty(field: &'static str) -> impl Fn(&str) -> Result<String, ConfigError> {
    move |answer| {
        if answer.is_empty() {
            Err(ConfigError::MissingField {
                field: field.to_string(),
            })
        } else {
            Ok(answer.to_string())
        }
    }
}

impl AnalysisConfig {
    /// Collect every parameter through `prompter`
    pub fn from_prompts(prompter: &dyn Prompter) -> Result<Self, ConfigError> {
        let package_name = ask_until(prompter, "Package name", None, non_empty("package.name"))?;
        let package_version =
            ask_until(prompter, "Package version", None, non_empty("package.version"))?;

        let use_test_repository = prompter.confirm("Use the offline test repository?", false)?;
        let (repository_url, test_repository_path) = if use_test_repository {
            let path = prompter.input("Dependency table file (empty for the built-in demo)", Some(""))?;
            let path = path.trim();
            let path = (!path.is_empty()).then(|| PathBuf::from(path));
            (DEFAULT_REGISTRY_URL.to_string(), path)
        } else {
            let url = ask_until(
                prompter,
                "Registry URL",
                Some(DEFAULT_REGISTRY_URL),
                non_empty("repository.url"),
            )?;
            (url, None)
        };

        let max_depth = ask_until(
            prompter,
            "Maximum depth (number or \"unbounded\")",
            Some("3"),
            |answer| parse_max_depth(&toml::Value::String(answer.to_string())),
        )?;

        let config = Self {
            package_name,
            package_version,
            repository_url,
            use_test_repository,
            test_repository_path,
            max_depth,
            memoize: true,
            output: None,
            timeout: None,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    include!("prompt.test.rs");
}
