//! Dependency sources
//!
//! A source answers one question: what are the direct dependencies of
//! `name` at `version`? The engine only sees the [`DependencySource`]
//! capability; [`RegistrySource`] asks a remote registry over HTTP and
//! [`StaticSource`] reads an in-memory or text table.

use std::future::Future;
use thiserror::Error;

use super::key::DependencyDescriptor;
use crate::networking::NetworkingError;

pub mod registry;
pub mod static_table;

pub use registry::{DEFAULT_REGISTRY_URL, RegistrySource};
pub use static_table::{DEFAULT_TABLE_REQUIREMENT, StaticSource};

/// A single dependency fetch failed. Never fatal to a traversal.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        source: NetworkingError,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("missing field `{field}` in {context}")]
    MissingField { field: String, context: String },

    #[error("no published version of {name} matches {requirement}")]
    NoMatchingVersion { name: String, requirement: String },

    #[error("malformed dependency table at line {line}: {reason}")]
    MalformedTable { line: usize, reason: String },

    #[error("fetch task for {package} did not finish: {reason}")]
    TaskFailed { package: String, reason: String },
}

impl SourceError {
    /// Cause text attached to traversal warnings
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

/// Provider of a package's direct dependency list.
///
/// "No dependencies" is an empty list, never an error. The returned order
/// is the order edges are recorded and children are visited.
pub trait DependencySource: Send + Sync {
    fn fetch_dependencies(
        &self,
        name: &str,
        version: &str,
    ) -> impl Future<Output = Result<Vec<DependencyDescriptor>, SourceError>> + Send;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Source selected from configuration at runtime
pub enum ConfiguredSource {
    Registry(RegistrySource),
    Static(StaticSource),
}

impl DependencySource for ConfiguredSource {
    async fn fetch_dependencies(
        &self,
        name: &str,
        version: &str,
    ) -> Result<Vec<DependencyDescriptor>, SourceError> {
        match self {
            ConfiguredSource::Registry(source) => source.fetch_dependencies(name, version).await,
            ConfiguredSource::Static(source) => source.fetch_dependencies(name, version).await,
        }
    }

    fn describe(&self) -> String {
        match self {
            ConfiguredSource::Registry(source) => source.describe(),
            ConfiguredSource::Static(source) => source.describe(),
        }
    }
}
