//! Remote registry client
//!
//! `GET {base}/{name}/{version}/dependencies` returns
//! `{"dependencies": [{"crate_id": .., "req": .., "kind": ..}]}`. A body
//! without a `dependencies` list is a package with no dependencies; an
//! entry without `crate_id` or `req` is an error.
//! Registries answer per published version, while descriptors carry
//! requirement strings such as `^1.0`; when resolution is enabled a
//! requirement is mapped to the newest matching, non-yanked version from
//! `GET {base}/{name}/versions` before the dependency request is made.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use semver::{Version, VersionReq};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use super::{DependencySource, SourceError};
use crate::graph::key::{DEFAULT_KIND, DependencyDescriptor};
use crate::networking::NetworkingManager;

/// crates.io API root for crate metadata
pub const DEFAULT_REGISTRY_URL: &str = "https://crates.io/api/v1/crates";

/// Characters escaped inside a single URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

#[derive(Debug, Deserialize)]
struct DependenciesResponse {
    #[serde(default)]
    dependencies: Vec<RawDependency>,
}

#[derive(Debug, Deserialize)]
struct RawDependency {
    crate_id: Option<String>,
    req: Option<String>,
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VersionsResponse {
    versions: Option<Vec<PublishedVersion>>,
}

#[derive(Debug, Deserialize)]
struct PublishedVersion {
    num: String,
    #[serde(default)]
    yanked: bool,
}

/// Registry-backed dependency source
pub struct RegistrySource {
    networking: NetworkingManager,
    base_url: String,
    resolve_requirements: bool,
    /// Published versions per package name, fetched at most once
    versions: Arc<Mutex<HashMap<String, Arc<Vec<Version>>>>>,
}

impl RegistrySource {
    /// Create a registry source for `base_url` (trailing `/` ignored)
    pub fn new(networking: NetworkingManager, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            networking,
            base_url,
            resolve_requirements: true,
            versions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Toggle requirement-to-version resolution (on by default)
    pub fn with_requirement_resolution(mut self, enabled: bool) -> Self {
        self.resolve_requirements = enabled;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the dependency listing for a concrete version
    pub fn dependencies_url(&self, name: &str, version: &str) -> String {
        format!(
            "{}/{}/{}/dependencies",
            self.base_url,
            utf8_percent_encode(name, PATH_SEGMENT),
            utf8_percent_encode(version, PATH_SEGMENT)
        )
    }

    fn versions_url(&self, name: &str) -> String {
        format!(
            "{}/{}/versions",
            self.base_url,
            utf8_percent_encode(name, PATH_SEGMENT)
        )
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        trace!("GET {}", url);
        let transport = |source| SourceError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.networking.client().get(url).await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport(e.into()))?;
        Ok(body.to_vec())
    }

    /// Version string to request for `spec`
    async fn resolve_version(&self, name: &str, spec: &str) -> Result<String, SourceError> {
        if !self.resolve_requirements || Version::parse(spec).is_ok() {
            return Ok(spec.to_string());
        }
        let Ok(requirement) = VersionReq::parse(spec) else {
            return Ok(spec.to_string());
        };

        let published = self.published_versions(name).await?;
        let resolved = published
            .iter()
            .filter(|version| requirement.matches(version))
            .max()
            .ok_or_else(|| SourceError::NoMatchingVersion {
                name: name.to_string(),
                requirement: spec.to_string(),
            })?;

        debug!("Resolved {} {} to {}", name, spec, resolved);
        Ok(resolved.to_string())
    }

    async fn published_versions(&self, name: &str) -> Result<Arc<Vec<Version>>, SourceError> {
        if let Some(cached) = self.versions.lock().await.get(name) {
            return Ok(cached.clone());
        }

        let url = self.versions_url(name);
        let body = self.get_bytes(&url).await?;
        let response: VersionsResponse =
            serde_json::from_slice(&body).map_err(|source| SourceError::Decode {
                url: url.clone(),
                source,
            })?;
        let entries = response.versions.ok_or_else(|| SourceError::MissingField {
            field: "versions".to_string(),
            context: url.clone(),
        })?;

        // Unparseable version numbers are skipped rather than failing the lookup
        let versions: Vec<Version> = entries
            .into_iter()
            .filter(|entry| !entry.yanked)
            .filter_map(|entry| Version::parse(&entry.num).ok())
            .collect();
        let versions = Arc::new(versions);

        self.versions
            .lock()
            .await
            .insert(name.to_string(), versions.clone());
        Ok(versions)
    }

    fn decode_dependencies(
        url: &str,
        body: &[u8],
    ) -> Result<Vec<DependencyDescriptor>, SourceError> {
        let response: DependenciesResponse =
            serde_json::from_slice(body).map_err(|source| SourceError::Decode {
                url: url.to_string(),
                source,
            })?;
        response
            .dependencies
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let missing = |field: &str| SourceError::MissingField {
                    field: field.to_string(),
                    context: format!("dependency #{} of {}", index, url),
                };
                let name = entry.crate_id.ok_or_else(|| missing("crate_id"))?;
                let req = entry.req.ok_or_else(|| missing("req"))?;
                let kind = entry.kind.unwrap_or_else(|| DEFAULT_KIND.to_string());
                Ok(DependencyDescriptor::new(name, req).with_kind(kind))
            })
            .collect()
    }
}

impl DependencySource for RegistrySource {
    async fn fetch_dependencies(
        &self,
        name: &str,
        version: &str,
    ) -> Result<Vec<DependencyDescriptor>, SourceError> {
        // One slot covers both the version lookup and the dependency request
        let _permit = self
            .networking
            .acquire()
            .await
            .map_err(|source| SourceError::Transport {
                url: self.base_url.clone(),
                source,
            })?;

        let resolved = self.resolve_version(name, version).await?;
        let url = self.dependencies_url(name, &resolved);
        let body = self.get_bytes(&url).await?;
        let dependencies = Self::decode_dependencies(&url, &body)?;

        trace!("{}@{} has {} dependencies", name, resolved, dependencies.len());
        Ok(dependencies)
    }

    fn describe(&self) -> String {
        format!("registry {}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    include!("registry.test.rs");
}
