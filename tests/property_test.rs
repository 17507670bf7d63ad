//! Property tests for the graph structures and the discovery pipeline.

use proptest::prelude::*;

use causalgraph::{CausalDag, DSeparationOracle, Graph, StructureLearner, Table};

/// Build a DAG from index pairs, keeping only forward edges (src < tgt) so
/// the result is acyclic by construction.
fn build_dag(n: usize, edges: &[(usize, usize)]) -> CausalDag {
    let mut dag = CausalDag::new();
    for i in 0..n {
        dag.add_node(&format!("v{i}"));
    }
    for &(src, tgt) in edges {
        if src < tgt && tgt < n {
            dag.add_edge(&format!("v{src}"), &format!("v{tgt}")).unwrap();
        }
    }
    dag
}

fn edge_strategy(n: usize) -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0..n, 0..n), 0..n * 2)
}

proptest! {
    #[test]
    fn no_node_is_its_own_descendant(edges in edge_strategy(8)) {
        let dag = build_dag(8, &edges);
        for node in dag.nodes() {
            prop_assert!(!dag.descendants(node).contains(node));
        }
    }

    #[test]
    fn orientation_reads_the_same_from_both_endpoints(edges in edge_strategy(8)) {
        let dag = build_dag(8, &edges);
        for (a, b) in dag.edges() {
            prop_assert_eq!(dag.orientation(a, b), dag.orientation(b, a));
        }
    }

    #[test]
    fn serialization_preserves_structure(edges in edge_strategy(6)) {
        let dag = build_dag(6, &edges);
        let json = serde_json::to_string(dag.as_graph()).unwrap();
        let restored: Graph = serde_json::from_str(&json).unwrap();

        prop_assert_eq!(restored.node_count(), dag.node_count());
        prop_assert_eq!(restored.edge_count(), dag.edge_count());
        for (a, b) in dag.edges() {
            prop_assert_eq!(restored.orientation(a, b), dag.orientation(a, b));
        }
    }

    /// IC* on a chain of any length recovers exactly the chain skeleton,
    /// with one recorded conditioning set per pruned pair.
    #[test]
    fn discovery_on_chains_recovers_the_skeleton(n in 2usize..6) {
        let names: Vec<String> = (0..n).map(|i| format!("v{i}")).collect();
        let mut truth = CausalDag::new();
        for w in names.windows(2) {
            truth.add_edge(&w[0], &w[1]).unwrap();
        }

        let data = Table::from_columns(
            names.iter().map(|name| (name.clone(), vec![0.0; 4])),
        ).unwrap();
        let mut learner = StructureLearner::new(DSeparationOracle::new(truth));
        let result = learner.discover(&data).unwrap();

        // Adjacent pairs survive, everything else is pruned.
        prop_assert_eq!(result.graph.edge_count(), n - 1);
        for w in names.windows(2) {
            prop_assert!(result.graph.has_edge(&w[0], &w[1]));
        }

        // Exactly one conditioning set per pruned edge, never touching the
        // pair's own endpoints.
        let total_pairs = n * (n - 1) / 2;
        prop_assert_eq!(result.conditioning_sets.len(), total_pairs - (n - 1));
        for (key, z) in &result.conditioning_sets {
            prop_assert!(!z.is_empty());
            prop_assert!(!z.contains(&key.first().to_string()));
            prop_assert!(!z.contains(&key.second().to_string()));
        }
    }
}
