//! Rendering traversal results
//!
//! Three outputs: a depth-grouped tree for the terminal, the flat text
//! listing written to the configured output file, and JSON.

use anyhow::{Context, Result};
use console::Style;
use std::fmt;
use std::path::Path;

use crate::graph::{Completion, GraphNode, Traversal};

/// Terminal renderer
pub struct Reporter {
    heading: Style,
    package: Style,
    cycle: Style,
    warning: Style,
    muted: Style,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        let style = |s: Style| s.force_styling(color);
        Self {
            heading: style(Style::new().bold()),
            package: style(Style::new().cyan()),
            cycle: style(Style::new().red()),
            warning: style(Style::new().yellow()),
            muted: style(Style::new().dim()),
        }
    }

    fn node_line(&self, node: &GraphNode) -> String {
        let name = self.package.apply_to(&node.key);
        if node.edges.is_empty() {
            return format!("  {} {}", name, self.muted.apply_to("(no dependencies)"));
        }
        let targets: Vec<String> = node.edges.iter().map(|edge| edge.to.to_string()).collect();
        format!("  {} -> {}", name, targets.join(", "))
    }

    /// Nodes grouped by first-discovery depth, then cycles and warnings
    pub fn render_tree(&self, traversal: &Traversal) -> String {
        TreeView {
            reporter: self,
            traversal,
        }
        .to_string()
    }
}

struct TreeView<'a> {
    reporter: &'a Reporter,
    traversal: &'a Traversal,
}

impl fmt::Display for TreeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { reporter: r, traversal } = self;
        writeln!(
            f,
            "{} {} (max depth: {})",
            r.heading.apply_to("Dependency graph for"),
            r.package.apply_to(&traversal.root),
            traversal.max_depth
        )?;

        for (depth, nodes) in traversal.graph.by_depth() {
            writeln!(f, "\n{}", r.heading.apply_to(format!("Level {}", depth)))?;
            for node in nodes {
                writeln!(f, "{}", r.node_line(node))?;
            }
        }

        writeln!(f)?;
        if traversal.cycles.is_empty() {
            writeln!(f, "{}", r.muted.apply_to("No cycles detected"))?;
            if traversal.graph.has_cycles() {
                writeln!(
                    f,
                    "{}",
                    r.warning
                        .apply_to("Recorded edges close a loop beyond the depth limit")
                )?;
            }
        } else {
            let heading = format!("Cycles detected ({}):", traversal.cycles.len());
            writeln!(f, "{}", r.cycle.apply_to(heading))?;
            for cycle in traversal.cycles.iter() {
                writeln!(f, "  {}", cycle.names())?;
            }
        }

        if !traversal.warnings.is_empty() {
            let heading = format!(
                "Dependencies unavailable for {} package(s):",
                traversal.warnings.len()
            );
            writeln!(f, "\n{}", r.warning.apply_to(heading))?;
            for warning in &traversal.warnings {
                writeln!(f, "  {}", warning)?;
            }
        }

        match traversal.completion {
            Completion::Complete => {}
            Completion::Cancelled => {
                writeln!(f, "\n{}", r.warning.apply_to("Cancelled: results are partial"))?;
            }
            Completion::TimedOut => {
                writeln!(f, "\n{}", r.warning.apply_to("Timed out: results are partial"))?;
            }
        }

        let summary = format!(
            "{} packages, {} edges, {} fetches",
            traversal.graph.node_count(),
            traversal.graph.edge_count(),
            traversal.fetches
        );
        writeln!(f, "\n{}", r.muted.apply_to(summary))
    }
}

struct FlatListing<'a>(&'a Traversal);

impl fmt::Display for FlatListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let traversal = self.0;
        writeln!(f, "# Dependency graph for {}", traversal.root)?;
        writeln!(f, "# Max depth: {}", traversal.max_depth)?;
        writeln!(f, "# Nodes: {}", traversal.graph.node_count())?;

        for node in traversal.graph.nodes().filter(|node| !node.edges.is_empty()) {
            let targets: Vec<String> = node.edges.iter().map(|edge| edge.to.to_string()).collect();
            writeln!(f, "{}: {}", node.key, targets.join(", "))?;
        }

        if !traversal.cycles.is_empty() {
            writeln!(f, "# Cycles:")?;
            for cycle in traversal.cycles.iter() {
                writeln!(f, "# {}", cycle)?;
            }
        }
        Ok(())
    }
}

/// Flat listing: header comments, one line per node with edges, cycles
pub fn render_flat(traversal: &Traversal) -> String {
    FlatListing(traversal).to_string()
}

/// Write the flat listing, creating parent directories as needed
pub fn write_flat(traversal: &Traversal, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, render_flat(traversal))
        .with_context(|| format!("Failed to write dependency graph to {}", path.display()))
}

pub fn render_json(traversal: &Traversal) -> Result<String> {
    serde_json::to_string_pretty(traversal).context("Failed to serialise traversal result")
}

#[cfg(test)]
mod tests {
    include!("report.test.rs");
}
