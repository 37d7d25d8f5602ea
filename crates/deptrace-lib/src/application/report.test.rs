use super::*;
use crate::graph::{MaxDepth, PackageKey, TraversalEngine};
use crate::testing::{DAG_TABLE, DEMO_TABLE, RecordingSource};
use std::sync::Arc;
use tempfile::TempDir;

async fn demo(max_depth: MaxDepth) -> Traversal {
    TraversalEngine::new(Arc::new(RecordingSource::from_table(DEMO_TABLE)))
        .build_graph(PackageKey::new("A", "1.0"), max_depth)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_flat_format_for_demo_table() {
    let flat = render_flat(&demo(MaxDepth::Unbounded).await);
    assert_eq!(
        flat,
        "# Dependency graph for A@1.0\n\
         # Max depth: unbounded\n\
         # Nodes: 6\n\
         A@1.0: B@1.0, C@1.0\n\
         B@1.0: D@1.0\n\
         D@1.0: F@1.0\n\
         C@1.0: D@1.0, E@1.0\n\
         E@1.0: A@1.0\n\
         # Cycles:\n\
         # A@1.0 → C@1.0 → E@1.0 → A@1.0\n"
    );
}

#[tokio::test]
async fn test_flat_format_without_cycles() {
    let traversal = TraversalEngine::new(Arc::new(RecordingSource::from_table(DAG_TABLE)))
        .build_graph(PackageKey::new("A", "1.0"), MaxDepth::Bounded(1))
        .await
        .unwrap();
    let flat = render_flat(&traversal);

    assert!(flat.starts_with("# Dependency graph for A@1.0\n# Max depth: 1\n# Nodes: 3\n"));
    assert!(!flat.contains("# Cycles:"));
}

#[tokio::test]
async fn test_tree_groups_by_level() {
    let tree = Reporter::new(false).render_tree(&demo(MaxDepth::Unbounded).await);

    assert!(tree.starts_with("Dependency graph for A@1.0 (max depth: unbounded)\n"));
    assert!(tree.contains("Level 0\n  A@1.0 -> B@1.0, C@1.0\n"));
    assert!(tree.contains("Level 1\n  B@1.0 -> D@1.0\n  C@1.0 -> D@1.0, E@1.0\n"));
    assert!(tree.contains("  F@1.0 (no dependencies)\n"));
    assert!(tree.contains("Cycles detected (1):\n  A → C → E → A\n"));
    assert!(tree.contains("6 packages, 7 edges, 6 fetches"));
    assert!(!tree.contains('\u{1b}'));
}

#[tokio::test]
async fn test_tree_reports_warnings_and_no_cycles() {
    let source = RecordingSource::from_table(DAG_TABLE).failing_on("D");
    let traversal = TraversalEngine::new(Arc::new(source))
        .build_graph(PackageKey::new("A", "1.0"), MaxDepth::Unbounded)
        .await
        .unwrap();
    let tree = Reporter::new(false).render_tree(&traversal);

    assert!(tree.contains("No cycles detected"));
    assert!(tree.contains("Dependencies unavailable for 1 package(s):\n  D@1.0: "));
}

#[tokio::test]
async fn test_tree_notes_loop_cut_by_depth_limit() {
    // E is expanded at depth 2, so its edge back to A is recorded but never walked
    let traversal = demo(MaxDepth::Bounded(2)).await;
    assert!(traversal.cycles.is_empty());

    let tree = Reporter::new(false).render_tree(&traversal);
    assert!(tree.contains("No cycles detected\nRecorded edges close a loop beyond the depth limit\n"));

    let unbounded = Reporter::new(false).render_tree(&demo(MaxDepth::Unbounded).await);
    assert!(!unbounded.contains("beyond the depth limit"));
}

#[tokio::test]
async fn test_colour_is_forced_when_requested() {
    let tree = Reporter::new(true).render_tree(&demo(MaxDepth::Bounded(0)).await);
    assert!(tree.contains('\u{1b}'));
}

#[tokio::test]
async fn test_json_contains_result() {
    let json = render_json(&demo(MaxDepth::Bounded(2)).await).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["root"]["name"], "A");
    assert_eq!(value["max_depth"], 2);
    assert_eq!(value["completion"], "complete");
    assert!(value["graph"]["nodes"].is_array());
}

#[tokio::test]
async fn test_write_flat_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out").join("graph.txt");
    let traversal = demo(MaxDepth::Unbounded).await;

    write_flat(&traversal, &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), render_flat(&traversal));
}
