//! Configuration files and registry response bodies for E2E tests

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Builder for an analysis configuration file
#[derive(Debug, Clone)]
pub struct AnalysisFixture {
    pub name: String,
    pub version: String,
    pub url: String,
    pub use_test_repository: bool,
    pub test_repository_path: Option<PathBuf>,
    /// Raw TOML value, e.g. `3` or `"unbounded"`
    pub max_depth: String,
    pub output: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl AnalysisFixture {
    /// Offline analysis of `A@1.0`, unbounded
    pub fn test_repository() -> Self {
        Self {
            name: "A".to_string(),
            version: "1.0".to_string(),
            url: "https://crates.io/api/v1/crates".to_string(),
            use_test_repository: true,
            test_repository_path: None,
            max_depth: "\"unbounded\"".to_string(),
            output: None,
            timeout_secs: None,
        }
    }

    /// Registry analysis of `name@version` against `url`
    pub fn registry(url: &str, name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            url: url.to_string(),
            use_test_repository: false,
            ..Self::test_repository()
        }
    }

    pub fn table(mut self, path: &Path) -> Self {
        self.test_repository_path = Some(path.to_path_buf());
        self
    }

    pub fn max_depth(mut self, raw: &str) -> Self {
        self.max_depth = raw.to_string();
        self
    }

    pub fn output(mut self, path: &Path) -> Self {
        self.output = Some(path.to_path_buf());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn to_toml(&self) -> String {
        let quote = |s: &str| format!("{:?}", s);
        let mut text = format!(
            "[package]\nname = {}\nversion = {}\n\n[repository]\nurl = {}\nuse_test_repository = {}\n",
            quote(&self.name),
            quote(&self.version),
            quote(&self.url),
            self.use_test_repository
        );
        if let Some(path) = &self.test_repository_path {
            text.push_str(&format!(
                "test_repository_path = {}\n",
                quote(&path.display().to_string())
            ));
        }
        text.push_str(&format!("\n[analysis]\nmax_depth = {}\n", self.max_depth));
        if let Some(path) = &self.output {
            text.push_str(&format!("output = {}\n", quote(&path.display().to_string())));
        }
        if let Some(secs) = self.timeout_secs {
            text.push_str(&format!("timeout_secs = {}\n", secs));
        }
        text
    }
}

#[derive(Serialize)]
struct Dependency<'a> {
    crate_id: &'a str,
    req: &'a str,
    kind: &'a str,
}

#[derive(Serialize)]
struct Version<'a> {
    num: &'a str,
    yanked: bool,
}

/// `{"dependencies": [...]}` body from `(crate_id, req, kind)` triples
pub fn dependencies_body(deps: &[(&str, &str, &str)]) -> String {
    let dependencies: Vec<Dependency> = deps
        .iter()
        .map(|&(crate_id, req, kind)| Dependency { crate_id, req, kind })
        .collect();
    serde_json::json!({ "dependencies": dependencies }).to_string()
}

/// `{"versions": [...]}` body from `(num, yanked)` pairs
pub fn versions_body(versions: &[(&str, bool)]) -> String {
    let versions: Vec<Version> = versions
        .iter()
        .map(|&(num, yanked)| Version { num, yanked })
        .collect();
    serde_json::json!({ "versions": versions }).to_string()
}
