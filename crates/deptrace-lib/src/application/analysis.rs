//! Analysis configuration
//!
//! What to analyse and where dependency data comes from, read from a TOML
//! file:
//!
//! ```toml
//! [package]
//! name = "serde"
//! version = "1.0.210"
//!
//! [repository]
//! url = "https://crates.io/api/v1/crates"
//! use_test_repository = false
//! test_repository_path = "deps.txt"   # optional
//!
//! [analysis]
//! max_depth = 3            # or "unbounded"
//! memoize = true           # optional
//! output = "graph.txt"     # optional
//! timeout_secs = 120       # optional
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

use super::cli::AnalyzeArgs;
use super::config::AppConfig;
use crate::graph::{ConfiguredSource, MaxDepth, PackageKey, RegistrySource, StaticSource, TraversalOptions};
use crate::networking::NetworkingManager;
use crate::primitives::ConfigError;

#[derive(Debug, Deserialize)]
struct RawConfig {
    package: Option<RawPackage>,
    repository: Option<RawRepository>,
    analysis: Option<RawAnalysis>,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    name: Option<String>,
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    url: Option<String>,
    use_test_repository: Option<bool>,
    test_repository_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    max_depth: Option<toml::Value>,
    memoize: Option<bool>,
    output: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

/// Validated analysis parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisConfig {
    pub package_name: String,
    pub package_version: String,
    pub repository_url: String,
    pub use_test_repository: bool,
    pub test_repository_path: Option<PathBuf>,
    pub max_depth: MaxDepth,
    pub memoize: bool,
    pub output: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

fn missing(field: &str) -> ConfigError {
    ConfigError::MissingField {
        field: field.to_string(),
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(missing(field)),
    }
}

/// `max_depth` must be a positive integer or "unbounded"
pub fn parse_max_depth(value: &toml::Value) -> Result<MaxDepth, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidField {
        field: "analysis.max_depth".to_string(),
        reason: reason.to_string(),
    };

    let depth = match value {
        toml::Value::Integer(n) => *n,
        toml::Value::String(s) if s.trim().eq_ignore_ascii_case("unbounded") => {
            return Ok(MaxDepth::Unbounded);
        }
        toml::Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid("must be a positive integer or \"unbounded\""))?,
        _ => return Err(invalid("must be a positive integer or \"unbounded\"")),
    };

    if depth <= 0 {
        return Err(invalid("must be a positive integer"));
    }
    MaxDepth::try_from(depth).map_err(|e| invalid(&e.to_string()))
}

impl AnalysisConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded analysis configuration from {}", path.display());
        Self::from_toml_str(&text, path)
    }

    /// Parse and validate TOML text; `path` is used for error messages
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text).map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        })?;

        let section = |name: &str| ConfigError::MissingSection {
            section: name.to_string(),
        };
        let package = raw.package.ok_or_else(|| section("package"))?;
        let repository = raw.repository.ok_or_else(|| section("repository"))?;
        let analysis = raw.analysis.ok_or_else(|| section("analysis"))?;

        let package_name = required(package.name, "package.name")?;
        let package_version = required(package.version, "package.version")?;
        let repository_url = required(repository.url, "repository.url")?;
        let use_test_repository = repository
            .use_test_repository
            .ok_or_else(|| missing("repository.use_test_repository"))?;
        let test_repository_path = repository
            .test_repository_path
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        let max_depth = analysis
            .max_depth
            .as_ref()
            .ok_or_else(|| missing("analysis.max_depth"))
            .and_then(parse_max_depth)?;

        let timeout = match analysis.timeout_secs {
            Some(0) => {
                return Err(ConfigError::InvalidField {
                    field: "analysis.timeout_secs".to_string(),
                    reason: "must be at least 1 second".to_string(),
                });
            }
            other => other.map(Duration::from_secs),
        };

        Ok(Self {
            package_name,
            package_version,
            repository_url,
            use_test_repository,
            test_repository_path,
            max_depth,
            memoize: analysis.memoize.unwrap_or(true),
            output: analysis.output,
            timeout,
        })
    }

    /// Check a config assembled outside the file loader (prompts, overrides)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.package_name.trim().is_empty() {
            return Err(missing("package.name"));
        }
        if self.package_version.trim().is_empty() {
            return Err(missing("package.version"));
        }
        if !self.use_test_repository && self.repository_url.trim().is_empty() {
            return Err(missing("repository.url"));
        }
        if self.max_depth == MaxDepth::Bounded(0) {
            return Err(ConfigError::InvalidField {
                field: "analysis.max_depth".to_string(),
                reason: "must be a positive integer".to_string(),
            });
        }
        Ok(())
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, args: &AnalyzeArgs) -> Self {
        if let Some(max_depth) = args.max_depth {
            self.max_depth = max_depth;
        }
        if let Some(output) = &args.output {
            self.output = Some(output.clone());
        }
        self
    }

    pub fn root_key(&self) -> PackageKey {
        PackageKey::new(&self.package_name, &self.package_version)
    }

    /// Build the dependency source this configuration selects
    pub fn build_source(&self, app: &AppConfig) -> Result<ConfiguredSource> {
        if self.use_test_repository {
            let table = StaticSource::load(self.test_repository_path.as_deref())
                .context("Failed to load test dependency table")?;
            return Ok(ConfiguredSource::Static(table));
        }

        let networking = NetworkingManager::new(app.to_networking_config())
            .context("Failed to initialise HTTP client")?;
        Ok(ConfiguredSource::Registry(RegistrySource::new(
            networking,
            &self.repository_url,
        )))
    }

    /// Engine options for this run
    pub fn traversal_options(
        &self,
        app: &AppConfig,
        cancel: Option<watch::Receiver<bool>>,
    ) -> TraversalOptions {
        TraversalOptions {
            memoize: self.memoize,
            prefetch_jobs: if self.use_test_repository { 1 } else { app.jobs },
            deadline: self
                .timeout
                .map(|timeout| tokio::time::Instant::now() + timeout),
            cancel,
        }
    }
}

#[cfg(test)]
mod tests {
    include!("analysis.test.rs");
}
