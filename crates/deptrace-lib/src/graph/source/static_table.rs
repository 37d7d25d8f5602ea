//! Offline dependency table
//!
//! Text form, one package per line:
//!
//! ```text
//! # comment
//! A: B, C
//! B: D
//! F:
//! ```
//!
//! Lines without a `:` are ignored. Every dependency carries requirement
//! [`DEFAULT_TABLE_REQUIREMENT`] and kind `normal`. Lookups use the package
//! name only.

use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

use super::{DependencySource, SourceError};
use crate::graph::key::DependencyDescriptor;

/// Requirement string attached to every table dependency
pub const DEFAULT_TABLE_REQUIREMENT: &str = "1.0";

/// Built-in table used when no readable table is configured
const DEMO_TABLE: &[(&str, &[&str])] = &[
    ("A", &["B", "C"]),
    ("B", &["D"]),
    ("C", &["D", "E"]),
    ("D", &["F"]),
    ("E", &["A"]),
    ("F", &[]),
];

#[derive(Debug, Clone)]
pub struct StaticSource {
    table: HashMap<String, Vec<String>>,
    origin: String,
}

impl StaticSource {
    /// The demonstration table (contains the cycle A → C → E → A)
    pub fn demo() -> Self {
        Self::from_table(
            DEMO_TABLE
                .iter()
                .map(|(name, deps)| (*name, deps.iter().copied())),
        )
        .with_origin("built-in demo table")
    }

    /// Build from `(name, dependencies)` pairs; later pairs for the same
    /// name replace earlier ones.
    pub fn from_table<N, I, D>(entries: impl IntoIterator<Item = (N, I)>) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        let table = entries
            .into_iter()
            .map(|(name, deps)| (name.into(), deps.into_iter().map(Into::into).collect()))
            .collect();
        Self {
            table,
            origin: "in-memory table".to_string(),
        }
    }

    /// Parse the line-oriented text form
    pub fn parse(text: &str) -> Result<Self, SourceError> {
        let mut table: HashMap<String, Vec<String>> = HashMap::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((name, deps)) = line.split_once(':') else {
                debug!("Ignoring table line {} without separator", index + 1);
                continue;
            };

            let name = name.trim();
            if name.is_empty() {
                return Err(SourceError::MalformedTable {
                    line: index + 1,
                    reason: "package name before ':' is empty".to_string(),
                });
            }
            if table.contains_key(name) {
                return Err(SourceError::MalformedTable {
                    line: index + 1,
                    reason: format!("package {} is defined more than once", name),
                });
            }

            let deps = deps
                .split(',')
                .map(str::trim)
                .filter(|dep| !dep.is_empty())
                .map(str::to_string)
                .collect();
            table.insert(name.to_string(), deps);
        }

        Ok(Self {
            table,
            origin: "text table".to_string(),
        })
    }

    /// Load a table file; a missing or unreadable file falls back to the
    /// demo table. Malformed content is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, SourceError> {
        let Some(path) = path else {
            debug!("No test repository path configured, using demo table");
            return Ok(Self::demo());
        };

        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)?.with_origin(path.display().to_string())),
            Err(e) => {
                warn!(
                    "Could not read dependency table {}: {}; using demo table",
                    path.display(),
                    e
                );
                Ok(Self::demo())
            }
        }
    }

    fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Number of packages defined in the table
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Dependencies of `name`; absent packages have none
    pub fn dependencies_of(&self, name: &str) -> Vec<DependencyDescriptor> {
        self.table
            .get(name)
            .map(|deps| {
                deps.iter()
                    .map(|dep| DependencyDescriptor::new(dep, DEFAULT_TABLE_REQUIREMENT))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl DependencySource for StaticSource {
    async fn fetch_dependencies(
        &self,
        name: &str,
        _version: &str,
    ) -> Result<Vec<DependencyDescriptor>, SourceError> {
        Ok(self.dependencies_of(name))
    }

    fn describe(&self) -> String {
        format!("static table ({}, {} packages)", self.origin, self.table.len())
    }
}

#[cfg(test)]
mod tests {
    include!("static_table.test.rs");
}
