//! Traversal output: the dependency graph, the cycle report, and
//! per-node source warnings.
//!
//! Only the engine writes here. Everything is kept in discovery order so
//! two runs against the same deterministic source produce identical output.

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::key::{DependencyDescriptor, DependencyEdge, PackageKey};

/// An expanded node: its first-discovery depth and its outgoing edges
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub key: PackageKey,
    pub depth: u32,
    pub edges: Vec<DependencyEdge>,
}

/// Adjacency mapping from expanded packages to their recorded edges.
///
/// A key is present only once its dependency list has been attempted;
/// packages that were only reached as pruned edge targets are not entries.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DependencyGraph {
    nodes: Vec<GraphNode>,
    #[serde(skip)]
    index: HashMap<PackageKey, usize>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key`'s expansion. Returns false (and records nothing) when
    /// the key was already expanded on another branch.
    pub(crate) fn insert_node(
        &mut self,
        key: &PackageKey,
        depth: u32,
        dependencies: &[DependencyDescriptor],
    ) -> bool {
        if self.index.contains_key(key) {
            return false;
        }
        let edges = dependencies
            .iter()
            .map(|descriptor| DependencyEdge::from_descriptor(key, descriptor))
            .collect();
        self.index.insert(key.clone(), self.nodes.len());
        self.nodes.push(GraphNode {
            key: key.clone(),
            depth,
            edges,
        });
        true
    }

    pub fn contains(&self, key: &PackageKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn node(&self, key: &PackageKey) -> Option<&GraphNode> {
        self.index.get(key).map(|&i| &self.nodes[i])
    }

    /// Outgoing edges of `key` in source order
    pub fn dependencies(&self, key: &PackageKey) -> Option<&[DependencyEdge]> {
        self.node(key).map(|node| node.edges.as_slice())
    }

    /// Depth at which `key` was first expanded
    pub fn depth_of(&self, key: &PackageKey) -> Option<u32> {
        self.node(key).map(|node| node.depth)
    }

    /// Expanded nodes in first-expansion order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|node| node.edges.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes grouped by first-discovery depth
    pub fn by_depth(&self) -> BTreeMap<u32, Vec<&GraphNode>> {
        let mut levels: BTreeMap<u32, Vec<&GraphNode>> = BTreeMap::new();
        for node in &self.nodes {
            levels.entry(node.depth).or_default().push(node);
        }
        levels
    }

    /// petgraph view of every recorded edge, including edges to pruned
    /// targets. Node weights are keys, edge weights are kinds.
    pub fn to_petgraph(&self) -> DiGraph<PackageKey, String> {
        let mut graph = DiGraph::new();
        let mut indices: HashMap<&PackageKey, NodeIndex> = HashMap::new();

        for node in &self.nodes {
            indices
                .entry(&node.key)
                .or_insert_with(|| graph.add_node(node.key.clone()));
        }
        for edge in self.nodes.iter().flat_map(|node| node.edges.iter()) {
            let from = indices[&edge.from];
            let to = *indices
                .entry(&edge.to)
                .or_insert_with(|| graph.add_node(edge.to.clone()));
            graph.add_edge(from, to, edge.kind.clone());
        }
        graph
    }

    /// Whether the recorded edges contain any cycle at all, regardless of
    /// which paths the traversal took
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.to_petgraph())
    }
}

impl PartialEq for DependencyGraph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl Eq for DependencyGraph {}

/// A cycle closed on the active descent path. `path` starts and ends with
/// `closing`, e.g. `A → C → E → A`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cycle {
    pub closing: PackageKey,
    pub path: Vec<PackageKey>,
}

impl Cycle {
    /// Path rendered with package names only
    pub fn names(&self) -> String {
        self.path
            .iter()
            .map(PackageKey::name)
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.path.iter().map(ToString::to_string).collect();
        f.write_str(&rendered.join(" → "))
    }
}

/// Cycles in detection order, each closing path recorded once
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CycleReport {
    cycles: Vec<Cycle>,
}

impl CycleReport {
    /// Record a cycle; false if the same closing path was already recorded
    pub(crate) fn record(&mut self, cycle: Cycle) -> bool {
        if self.cycles.iter().any(|known| known.path == cycle.path) {
            return false;
        }
        self.cycles.push(cycle);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cycle> {
        self.cycles.iter()
    }

    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    /// Cycles closing at a package with this name
    pub fn closing_at<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Cycle> + 'a {
        self.cycles.iter().filter(move |c| c.closing.name() == name)
    }
}

/// A node whose dependency fetch failed; it stays in the graph with no edges
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceWarning {
    pub package: PackageKey,
    pub reason: String,
}

impl fmt::Display for SourceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.package, self.reason)
    }
}

/// Mutable state written during one traversal
#[derive(Debug, Default)]
pub(crate) struct GraphAccumulator {
    pub(crate) graph: DependencyGraph,
    pub(crate) cycles: CycleReport,
    pub(crate) warnings: Vec<SourceWarning>,
}

impl GraphAccumulator {
    pub(crate) fn warn(&mut self, package: &PackageKey, reason: String) {
        let warning = SourceWarning {
            package: package.clone(),
            reason,
        };
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }
}

#[cfg(test)]
mod tests {
    include!("accumulator.test.rs");
}
