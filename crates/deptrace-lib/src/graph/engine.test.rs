use super::*;
use crate::testing::{DAG_TABLE, DEMO_TABLE, RecordingSource, TWO_CYCLE_TABLE};
use std::time::Duration;

fn key(name: &str) -> PackageKey {
    PackageKey::new(name, "1.0")
}

fn targets(traversal: &Traversal, name: &str) -> Vec<String> {
    traversal
        .graph
        .dependencies(&key(name))
        .unwrap_or_default()
        .iter()
        .map(|edge| edge.to.name().to_string())
        .collect()
}

async fn traverse(source: &Arc<RecordingSource>, max_depth: MaxDepth) -> Traversal {
    TraversalEngine::new(source.clone())
        .build_graph(key("A"), max_depth)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_depth_zero_records_root_edges_only() {
    let source = Arc::new(RecordingSource::from_table(DEMO_TABLE));
    let traversal = traverse(&source, MaxDepth::Bounded(0)).await;

    assert_eq!(traversal.graph.node_count(), 1);
    assert_eq!(targets(&traversal, "A"), vec!["B", "C"]);
    assert!(!traversal.graph.contains(&key("B")));
    assert!(traversal.cycles.is_empty());
    assert_eq!(source.calls(), vec![key("A")]);
}

#[tokio::test]
async fn test_depth_bound_prunes_silently() {
    let source = Arc::new(RecordingSource::from_table(DEMO_TABLE));
    let traversal = traverse(&source, MaxDepth::Bounded(1)).await;

    let expanded: Vec<&str> = traversal.graph.nodes().map(|n| n.key.name()).collect();
    assert_eq!(expanded, vec!["A", "B", "C"]);
    // Edges to pruned children are still recorded
    assert_eq!(targets(&traversal, "C"), vec!["D", "E"]);
    assert!(traversal.cycles.is_empty());
    assert!(traversal.warnings.is_empty());
    assert!(traversal.is_complete());
}

#[tokio::test]
async fn test_dag_has_no_cycles_at_any_depth() {
    for max_depth in [
        MaxDepth::Bounded(0),
        MaxDepth::Bounded(2),
        MaxDepth::Bounded(10),
        MaxDepth::Unbounded,
    ] {
        let source = Arc::new(RecordingSource::from_table(DAG_TABLE));
        let traversal = traverse(&source, max_depth).await;
        assert!(traversal.cycles.is_empty(), "cycle reported at depth {}", max_depth);
        assert!(!traversal.graph.has_cycles());
    }
}

#[tokio::test]
async fn test_demo_table_cycle_and_edges() {
    let source = Arc::new(RecordingSource::from_table(DEMO_TABLE));
    let traversal = traverse(&source, MaxDepth::Unbounded).await;

    assert_eq!(traversal.cycles.len(), 1);
    let cycle = traversal.cycles.iter().next().unwrap();
    assert_eq!(cycle.closing, key("A"));
    assert_eq!(cycle.names(), "A → C → E → A");

    assert_eq!(targets(&traversal, "D"), vec!["F"]);
    assert_eq!(targets(&traversal, "C"), vec!["D", "E"]);
    assert_eq!(targets(&traversal, "E"), vec!["A"]);
    assert_eq!(traversal.graph.node_count(), 6);
    assert!(traversal.graph.has_cycles());
}

#[tokio::test]
async fn test_two_independent_cycles() {
    let source = Arc::new(RecordingSource::from_table(TWO_CYCLE_TABLE));
    let traversal = traverse(&source, MaxDepth::Unbounded).await;

    let rendered: Vec<String> = traversal.cycles.iter().map(Cycle::names).collect();
    assert_eq!(rendered, vec!["B → D → F → B", "A → C → A"]);
    assert_eq!(traversal.cycles.closing_at("A").count(), 1);
    assert_eq!(traversal.cycles.closing_at("B").count(), 1);
    assert!(traversal.graph.contains(&key("G")));
}

#[tokio::test]
async fn test_shared_dependency_is_not_a_cycle() {
    // D is reached from both B and C; only a repeat on one path counts
    let source = Arc::new(RecordingSource::from_table(DAG_TABLE));
    let traversal = traverse(&source, MaxDepth::Unbounded).await;

    assert!(traversal.cycles.is_empty());
    assert_eq!(traversal.graph.depth_of(&key("D")), Some(2));
    assert_eq!(traversal.graph.depth_of(&key("E")), Some(3));
}

#[tokio::test]
async fn test_depth_is_first_discovery_not_minimum() {
    let source = Arc::new(RecordingSource::from_table(&[
        ("A", &["B", "C"]),
        ("B", &["C"]),
        ("C", &[]),
    ]));
    let traversal = traverse(&source, MaxDepth::Unbounded).await;

    assert_eq!(traversal.graph.depth_of(&key("C")), Some(2));
    let levels = traversal.graph.by_depth();
    assert_eq!(levels[&2].len(), 1);
}

#[tokio::test]
async fn test_failing_node_is_isolated() {
    let source = Arc::new(RecordingSource::from_table(DEMO_TABLE).failing_on("B"));
    let traversal = traverse(&source, MaxDepth::Unbounded).await;

    assert!(traversal.graph.contains(&key("B")));
    assert!(targets(&traversal, "B").is_empty());
    // Siblings carry on: D and F are still reached through C
    assert_eq!(targets(&traversal, "C"), vec!["D", "E"]);
    assert_eq!(targets(&traversal, "D"), vec!["F"]);
    assert_eq!(traversal.cycles.len(), 1);

    assert_eq!(traversal.warnings.len(), 1);
    assert_eq!(traversal.warnings[0].package, key("B"));
    assert!(traversal.warnings[0].reason.contains("503"));
    assert!(traversal.is_complete());
}

#[tokio::test]
async fn test_failure_warned_once_without_memoisation() {
    let source = Arc::new(RecordingSource::from_table(DEMO_TABLE).failing_on("D"));
    let traversal = TraversalEngine::new(source.clone())
        .with_options(TraversalOptions {
            memoize: false,
            ..TraversalOptions::default()
        })
        .build_graph(key("A"), MaxDepth::Unbounded)
        .await
        .unwrap();

    assert_eq!(source.calls_for("D"), 2);
    assert_eq!(traversal.warnings.len(), 1);
    assert!(!traversal.graph.contains(&key("F")));
}

#[tokio::test]
async fn test_edge_order_follows_source_order() {
    let source = Arc::new(RecordingSource::from_table(&[
        ("A", &["Z", "M", "B"]),
        ("Z", &[]),
        ("M", &[]),
        ("B", &[]),
    ]));
    let traversal = traverse(&source, MaxDepth::Unbounded).await;

    assert_eq!(targets(&traversal, "A"), vec!["Z", "M", "B"]);
    assert_eq!(source.calls(), vec![key("A"), key("Z"), key("M"), key("B")]);
}

#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let first = traverse(
        &Arc::new(RecordingSource::from_table(TWO_CYCLE_TABLE)),
        MaxDepth::Unbounded,
    )
    .await;
    let second = traverse(
        &Arc::new(RecordingSource::from_table(TWO_CYCLE_TABLE)),
        MaxDepth::Unbounded,
    )
    .await;

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn test_memoisation_fetches_each_package_once() {
    let source = Arc::new(RecordingSource::from_table(DEMO_TABLE));
    let traversal = traverse(&source, MaxDepth::Unbounded).await;

    assert_eq!(source.call_count(), 6);
    assert_eq!(traversal.fetches, 6);
    assert_eq!(source.calls_for("D"), 1);
}

#[tokio::test]
async fn test_without_memoisation_shared_nodes_are_refetched() {
    let memoised = traverse(
        &Arc::new(RecordingSource::from_table(DEMO_TABLE)),
        MaxDepth::Unbounded,
    )
    .await;

    let source = Arc::new(RecordingSource::from_table(DEMO_TABLE));
    let plain = TraversalEngine::new(source.clone())
        .with_options(TraversalOptions {
            memoize: false,
            ..TraversalOptions::default()
        })
        .build_graph(key("A"), MaxDepth::Unbounded)
        .await
        .unwrap();

    // A, B, D, F, C, D, F, E
    assert_eq!(source.call_count(), 8);
    assert_eq!(plain.graph, memoised.graph);
    assert_eq!(plain.cycles, memoised.cycles);
}

#[tokio::test]
async fn test_prefetch_matches_sequential_output() {
    let sequential = traverse(
        &Arc::new(RecordingSource::from_table(TWO_CYCLE_TABLE)),
        MaxDepth::Unbounded,
    )
    .await;

    let source = Arc::new(
        RecordingSource::from_table(TWO_CYCLE_TABLE).with_delay(Duration::from_millis(2)),
    );
    let concurrent = TraversalEngine::new(source.clone())
        .with_options(TraversalOptions {
            prefetch_jobs: 4,
            ..TraversalOptions::default()
        })
        .build_graph(key("A"), MaxDepth::Unbounded)
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_string(&concurrent.graph).unwrap(),
        serde_json::to_string(&sequential.graph).unwrap()
    );
    assert_eq!(concurrent.cycles, sequential.cycles);
    for name in ["A", "B", "C", "D", "E", "F", "G"] {
        assert_eq!(source.calls_for(name), 1, "{} fetched more than once", name);
    }
}

#[tokio::test]
async fn test_cancelled_before_start_returns_empty_partial() {
    let (_tx, rx) = watch::channel(true);
    let source = Arc::new(RecordingSource::from_table(DEMO_TABLE));
    let traversal = TraversalEngine::new(source)
        .with_options(TraversalOptions {
            cancel: Some(rx),
            ..TraversalOptions::default()
        })
        .build_graph(key("A"), MaxDepth::Unbounded)
        .await
        .unwrap();

    assert_eq!(traversal.completion, Completion::Cancelled);
    assert!(traversal.graph.is_empty());
}

#[tokio::test]
async fn test_cancel_midway_keeps_partial_graph() {
    let (tx, rx) = watch::channel(false);
    let source = Arc::new(
        RecordingSource::from_table(DEMO_TABLE).with_delay(Duration::from_millis(40)),
    );
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let _ = tx.send(true);
    });

    let traversal = TraversalEngine::new(source)
        .with_options(TraversalOptions {
            cancel: Some(rx),
            ..TraversalOptions::default()
        })
        .build_graph(key("A"), MaxDepth::Unbounded)
        .await
        .unwrap();

    assert_eq!(traversal.completion, Completion::Cancelled);
    assert!(traversal.graph.contains(&key("A")));
    assert!(traversal.graph.node_count() < 6);
}

#[tokio::test]
async fn test_deadline_returns_partial_graph() {
    let source = Arc::new(
        RecordingSource::from_table(DEMO_TABLE).with_delay(Duration::from_millis(40)),
    );
    let traversal = TraversalEngine::new(source)
        .with_options(TraversalOptions {
            deadline: Some(Instant::now() + Duration::from_millis(100)),
            prefetch_jobs: 2,
            ..TraversalOptions::default()
        })
        .build_graph(key("A"), MaxDepth::Unbounded)
        .await
        .unwrap();

    assert_eq!(traversal.completion, Completion::TimedOut);
    assert!(!traversal.is_complete());
    assert!(traversal.graph.contains(&key("A")));
    assert!(traversal.graph.node_count() < 6);
}

#[tokio::test]
async fn test_generous_deadline_completes() {
    let source = Arc::new(RecordingSource::from_table(DEMO_TABLE));
    let traversal = TraversalEngine::new(source)
        .with_options(TraversalOptions {
            deadline: Some(Instant::now() + Duration::from_secs(30)),
            ..TraversalOptions::default()
        })
        .build_graph(key("A"), MaxDepth::Unbounded)
        .await
        .unwrap();

    assert_eq!(traversal.completion, Completion::Complete);
    assert_eq!(traversal.cycles.len(), 1);
}

#[tokio::test]
async fn test_negative_depth_is_rejected() {
    let source = Arc::new(RecordingSource::from_table(DEMO_TABLE));
    let err = build_graph(key("A"), -1, source.clone()).await.unwrap_err();

    assert!(matches!(err, TraversalError::InvalidDepth { depth: -1 }));
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn test_malformed_root_is_rejected() {
    let source = Arc::new(RecordingSource::from_table(DEMO_TABLE));
    let err = build_graph(PackageKey::new("", "1.0"), 3, source.clone())
        .await
        .unwrap_err();

    assert!(matches!(err, TraversalError::InvalidRoot { .. }));
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_root_is_a_single_leaf() {
    let source = Arc::new(RecordingSource::from_table(DEMO_TABLE));
    let traversal = build_graph(key("nope"), 5, source).await.unwrap();

    assert_eq!(traversal.graph.node_count(), 1);
    assert!(targets(&traversal, "nope").is_empty());
    assert!(traversal.warnings.is_empty());
}
