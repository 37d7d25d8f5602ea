//! Identity and edge types shared by sources, the engine, and reports

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::engine::TraversalError;

/// Kind recorded when a source does not distinguish dependency kinds
pub const DEFAULT_KIND: &str = "normal";

/// A package identity: name plus the version or requirement string it was
/// reached with. Two keys with the same name but different version strings
/// are distinct nodes; the string is never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageKey {
    name: String,
    version: String,
}

impl PackageKey {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Reject keys that cannot address anything in a source
    pub fn validate(&self) -> Result<(), TraversalError> {
        if self.name.trim().is_empty() {
            return Err(TraversalError::InvalidRoot {
                reason: "package name is empty".to_string(),
            });
        }
        if self.version.trim().is_empty() {
            return Err(TraversalError::InvalidRoot {
                reason: format!("version of {} is empty", self.name),
            });
        }
        Ok(())
    }
}

impl fmt::Display for PackageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// One entry of a package's direct dependency list, as a source returns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDescriptor {
    pub name: String,
    pub version_req: String,
    pub kind: String,
}

impl DependencyDescriptor {
    /// Descriptor with the default `normal` kind
    pub fn new(name: impl Into<String>, version_req: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version_req: version_req.into(),
            kind: DEFAULT_KIND.to_string(),
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Node this descriptor points at
    pub fn key(&self) -> PackageKey {
        PackageKey::new(&self.name, &self.version_req)
    }
}

/// A recorded `from → to` dependency relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyEdge {
    pub from: PackageKey,
    pub to: PackageKey,
    pub kind: String,
}

impl DependencyEdge {
    pub fn from_descriptor(from: &PackageKey, descriptor: &DependencyDescriptor) -> Self {
        Self {
            from: from.clone(),
            to: descriptor.key(),
            kind: descriptor.kind.clone(),
        }
    }
}

/// Depth bound for a traversal: the longest root-to-node path (in edges)
/// that is still expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxDepth {
    Bounded(u32),
    Unbounded,
}

impl MaxDepth {
    /// Whether a node at `depth` is expanded
    pub fn allows(&self, depth: u32) -> bool {
        match self {
            MaxDepth::Bounded(max) => depth <= *max,
            MaxDepth::Unbounded => true,
        }
    }
}

impl TryFrom<i64> for MaxDepth {
    type Error = TraversalError;

    fn try_from(depth: i64) -> Result<Self, Self::Error> {
        u32::try_from(depth)
            .map(MaxDepth::Bounded)
            .map_err(|_| TraversalError::InvalidDepth { depth })
    }
}

impl FromStr for MaxDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unbounded") {
            return Ok(MaxDepth::Unbounded);
        }
        let depth: i64 = s
            .parse()
            .map_err(|_| format!("expected a depth or \"unbounded\", got '{}'", s))?;
        MaxDepth::try_from(depth).map_err(|e| e.to_string())
    }
}

impl fmt::Display for MaxDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxDepth::Bounded(depth) => write!(f, "{}", depth),
            MaxDepth::Unbounded => f.write_str("unbounded"),
        }
    }
}

impl Serialize for MaxDepth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MaxDepth::Bounded(depth) => serializer.serialize_u32(*depth),
            MaxDepth::Unbounded => serializer.serialize_str("unbounded"),
        }
    }
}

#[cfg(test)]
mod tests {
    include!("key.test.rs");
}
