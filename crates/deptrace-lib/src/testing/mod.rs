//! Test doubles
//!
//! [`RecordingSource`] serves a fixed name-keyed table, can be told to fail
//! for chosen packages, and records every fetch it receives so tests can
//! assert on call counts and order. [`ScriptedPrompter`] answers prompts
//! from a list.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::application::prompt::Prompter;
use crate::graph::key::{DependencyDescriptor, PackageKey};
use crate::graph::source::{DEFAULT_TABLE_REQUIREMENT, DependencySource, SourceError};
use crate::primitives::ConfigError;

/// Table-backed source that records its calls
#[derive(Debug, Default)]
pub struct RecordingSource {
    table: HashMap<String, Vec<DependencyDescriptor>>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<PackageKey>>,
}

impl RecordingSource {
    /// Build from `(name, [dependency names])` pairs; every dependency gets
    /// the default table requirement
    pub fn from_table(entries: &[(&str, &[&str])]) -> Self {
        let table = entries
            .iter()
            .map(|(name, deps)| {
                let deps = deps
                    .iter()
                    .map(|dep| DependencyDescriptor::new(*dep, DEFAULT_TABLE_REQUIREMENT))
                    .collect();
                (name.to_string(), deps)
            })
            .collect();
        Self {
            table,
            ..Self::default()
        }
    }

    /// Fail every fetch for `name`
    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Sleep before answering each fetch
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every fetch received, in arrival order
    pub fn calls(&self) -> Vec<PackageKey> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Number of fetches received for `name`
    pub fn calls_for(&self, name: &str) -> usize {
        self.calls().iter().filter(|key| key.name() == name).count()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

impl DependencySource for RecordingSource {
    async fn fetch_dependencies(
        &self,
        name: &str,
        version: &str,
    ) -> Result<Vec<DependencyDescriptor>, SourceError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(PackageKey::new(name, version));
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(name) {
            return Err(SourceError::Status {
                url: format!("test://{}/{}", name, version),
                status: 503,
            });
        }
        Ok(self.table.get(name).cloned().unwrap_or_default())
    }

    fn describe(&self) -> String {
        format!("recording table ({} packages)", self.table.len())
    }
}

/// The demonstration table: `A→[B,C], B→[D], C→[D,E], D→[F], E→[A], F→[]`
pub const DEMO_TABLE: &[(&str, &[&str])] = &[
    ("A", &["B", "C"]),
    ("B", &["D"]),
    ("C", &["D", "E"]),
    ("D", &["F"]),
    ("E", &["A"]),
    ("F", &[]),
];

/// Two independent cycles: `A → C → A` and `B → D → F → B`
pub const TWO_CYCLE_TABLE: &[(&str, &[&str])] = &[
    ("A", &["B", "C"]),
    ("B", &["D"]),
    ("C", &["A", "E"]),
    ("D", &["F"]),
    ("E", &["G"]),
    ("F", &["B"]),
    ("G", &[]),
];

/// Acyclic diamond with a tail: `A→[B,C], B→[D], C→[D], D→[E], E→[]`
pub const DAG_TABLE: &[(&str, &[&str])] = &[
    ("A", &["B", "C"]),
    ("B", &["D"]),
    ("C", &["D"]),
    ("D", &["E"]),
    ("E", &[]),
];

/// Prompter that replays canned answers; an empty answer takes the default
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Prompts shown so far
    pub fn asked(&self) -> Vec<String> {
        self.asked
            .lock()
            .map(|asked| asked.clone())
            .unwrap_or_default()
    }

    fn next(&self, prompt: &str) -> Result<String, ConfigError> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(prompt.to_string());
        }
        self.answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front())
            .ok_or_else(|| ConfigError::PromptFailed {
                reason: format!("no scripted answer for '{}'", prompt),
            })
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String, ConfigError> {
        let answer = self.next(prompt)?;
        match default {
            Some(default) if answer.is_empty() => Ok(default.to_string()),
            _ => Ok(answer),
        }
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool, ConfigError> {
        let answer = self.next(prompt)?;
        Ok(match answer.to_lowercase().as_str() {
            "y" | "yes" | "true" => true,
            "n" | "no" | "false" => false,
            _ => default,
        })
    }
}
