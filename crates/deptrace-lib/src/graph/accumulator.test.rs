use super::*;

fn key(name: &str) -> PackageKey {
    PackageKey::new(name, "1.0")
}

fn deps(names: &[&str]) -> Vec<DependencyDescriptor> {
    names
        .iter()
        .map(|name| DependencyDescriptor::new(*name, "1.0"))
        .collect()
}

#[test]
fn test_new_graph_is_empty() {
    let graph = DependencyGraph::new();
    assert!(graph.is_empty());
    assert_eq!(graph.node_count(), 0);
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_insert_node_preserves_edge_order() {
    let mut graph = DependencyGraph::new();
    assert!(graph.insert_node(&key("A"), 0, &deps(&["C", "B", "D"])));

    let targets: Vec<&str> = graph
        .dependencies(&key("A"))
        .unwrap()
        .iter()
        .map(|edge| edge.to.name())
        .collect();
    assert_eq!(targets, vec!["C", "B", "D"]);
    assert_eq!(graph.edge_count(), 3);
}

#[test]
fn test_reinsert_keeps_first_depth_and_edges() {
    let mut graph = DependencyGraph::new();
    graph.insert_node(&key("D"), 2, &deps(&["F"]));
    assert!(!graph.insert_node(&key("D"), 5, &deps(&["F"])));

    assert_eq!(graph.depth_of(&key("D")), Some(2));
    assert_eq!(graph.dependencies(&key("D")).unwrap().len(), 1);
    assert_eq!(graph.node_count(), 1);
}

#[test]
fn test_failed_node_has_empty_entry() {
    let mut graph = DependencyGraph::new();
    graph.insert_node(&key("broken"), 1, &[]);
    assert!(graph.contains(&key("broken")));
    assert_eq!(graph.dependencies(&key("broken")), Some(&[][..]));
}

#[test]
fn test_by_depth_groups_in_discovery_order() {
    let mut graph = DependencyGraph::new();
    graph.insert_node(&key("A"), 0, &deps(&["B", "C"]));
    graph.insert_node(&key("B"), 1, &[]);
    graph.insert_node(&key("C"), 1, &[]);

    let levels = graph.by_depth();
    assert_eq!(levels.len(), 2);
    let level_one: Vec<&str> = levels[&1].iter().map(|node| node.key.name()).collect();
    assert_eq!(level_one, vec!["B", "C"]);
}

#[test]
fn test_petgraph_view_includes_pruned_targets() {
    let mut graph = DependencyGraph::new();
    graph.insert_node(&key("A"), 0, &deps(&["B", "C"]));

    let view = graph.to_petgraph();
    assert_eq!(view.node_count(), 3);
    assert_eq!(view.edge_count(), 2);
    assert!(!graph.has_cycles());
}

#[test]
fn test_has_cycles_on_back_edge() {
    let mut graph = DependencyGraph::new();
    graph.insert_node(&key("A"), 0, &deps(&["B"]));
    graph.insert_node(&key("B"), 1, &deps(&["A"]));
    assert!(graph.has_cycles());
}

#[test]
fn test_cycle_rendering() {
    let cycle = Cycle {
        closing: key("A"),
        path: vec![key("A"), key("C"), key("E"), key("A")],
    };
    assert_eq!(cycle.names(), "A → C → E → A");
    assert_eq!(cycle.to_string(), "A@1.0 → C@1.0 → E@1.0 → A@1.0");
}

#[test]
fn test_cycle_report_deduplicates_paths() {
    let mut report = CycleReport::default();
    let cycle = Cycle {
        closing: key("B"),
        path: vec![key("B"), key("D"), key("B")],
    };
    assert!(report.record(cycle.clone()));
    assert!(!report.record(cycle));
    assert_eq!(report.len(), 1);
    assert_eq!(report.closing_at("B").count(), 1);
    assert_eq!(report.closing_at("A").count(), 0);
}

#[test]
fn test_accumulator_deduplicates_warnings() {
    let mut acc = GraphAccumulator::default();
    acc.warn(&key("X"), "timeout".to_string());
    acc.warn(&key("X"), "timeout".to_string());
    acc.warn(&key("Y"), "timeout".to_string());
    assert_eq!(acc.warnings.len(), 2);
    assert_eq!(acc.warnings[0].to_string(), "X@1.0: timeout");
}

#[test]
fn test_graph_serializes_nodes_only() {
    let mut graph = DependencyGraph::new();
    graph.insert_node(&key("A"), 0, &deps(&["B"]));
    let json = serde_json::to_value(&graph).unwrap();
    assert_eq!(json["nodes"][0]["key"]["name"], "A");
    assert_eq!(json["nodes"][0]["edges"][0]["to"]["name"], "B");
    assert!(json.get("index").is_none());
}
