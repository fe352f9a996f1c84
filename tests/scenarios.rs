//! End-to-end attack scenarios on small graphs with known outcomes.

use netdismantle::{
    centrality::Centrality,
    dismantle::{random_trials, run_attack, Dismantler, Removed, Strategy},
    AttackConfig, Edge, Graph, Weighting,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn star(leaves: usize) -> Graph {
    Graph::from_edges(leaves + 1, (1..=leaves).map(|leaf| Edge::new(0, leaf)), false).unwrap()
}

fn complete(n: usize) -> Graph {
    let edges = (0..n).flat_map(|i| (i + 1..n).map(move |j| Edge::new(i, j)));
    Graph::from_edges(n, edges, false).unwrap()
}

/// Three hubs joined in a triangle, each with its own leaves.
fn hubs(leaves_per_hub: usize) -> Graph {
    let mut edges = vec![
        ("h0".to_string(), "h1".to_string(), None),
        ("h1".to_string(), "h2".to_string(), None),
        ("h2".to_string(), "h0".to_string(), None),
    ];
    for hub in 0..3 {
        for leaf in 0..leaves_per_hub {
            edges.push((format!("h{hub}"), format!("l{hub}.{leaf}"), None));
        }
    }

    Graph::from_named_edges(edges, false).unwrap()
}

// ---------------------------------------------------------------------------
// Targeted attacks
// ---------------------------------------------------------------------------

#[test]
fn star_collapses_after_the_center() {
    let trace = run_attack(
        &star(4),
        Strategy::NodeCentrality(Centrality::Betweenness),
        1,
        Weighting::Unweighted,
        None,
    )
    .unwrap();

    assert_eq!(trace.removed, vec![Removed::Vertex("0".into())]);
    assert_eq!(trace.largest, vec![5, 1]);
    assert_eq!(trace.second_largest, vec![0, 1]);
    assert_eq!(trace.efficiency[1], 0.0);
}

#[test]
fn every_vertex_measure_takes_the_hub_first() {
    let graph = star(6);

    for measure in Centrality::ALL
        .into_iter()
        .filter(|m| *m != Centrality::EdgeBetweenness)
    {
        let trace = run_attack(
            &graph,
            Strategy::NodeCentrality(measure),
            1,
            Weighting::Unweighted,
            None,
        )
        .unwrap();

        assert_eq!(trace.removed[0], Removed::Vertex("0".into()), "{measure}");
    }
}

#[test]
fn articulation_attack_on_a_path() {
    // 0 - 1 - 2 - 3 - 4, listed so that "2" gets index 0 and the search starts there. Indices
    // follow first appearance: "2", "1", "3", "0", "4".
    let graph = Graph::from_named_edges(
        [("2", "1", None), ("2", "3", None), ("1", "0", None), ("3", "4", None)],
        false,
    )
    .unwrap();

    assert_eq!(graph.articulation_points(), vec![0, 1, 2]);

    let trace = run_attack(
        &graph,
        Strategy::ArticulationPoint,
        1,
        Weighting::Unweighted,
        None,
    )
    .unwrap();

    assert_eq!(trace.removed, vec![Removed::Vertex("2".into())]);
    assert_eq!(trace.largest, vec![5, 2]);
    assert_eq!(trace.second_largest, vec![0, 2]);
}

#[test]
fn removing_everything_empties_the_graph() {
    let graph = complete(4);

    let attack = Dismantler::new(&graph)
        .attack(Strategy::NodeCentrality(Centrality::Degree), usize::MAX)
        .unwrap();

    assert_eq!(attack.trace.len(), 4);
    assert_eq!(attack.trace.largest, vec![4, 3, 2, 1, 0]);
    assert_eq!(attack.trace.efficiency.first(), Some(&1.0));
    assert_eq!(attack.trace.efficiency.last(), Some(&0.0));
    assert_eq!(attack.residual.vertex_count(), 0);
}

#[test]
fn removing_everything_empties_the_graph_for_any_vertex_strategy() {
    let graph = hubs(2);
    let config = AttackConfig {
        seed: Some(11),
        ..Default::default()
    };

    for strategy in [
        Strategy::NodeRandom,
        Strategy::NodeCentrality(Centrality::Closeness),
        Strategy::NodeCentrality(Centrality::Betweenness),
        Strategy::NodeCentrality(Centrality::PageRank),
    ] {
        let attack = Dismantler::with_config(&graph, config)
            .attack(strategy, usize::MAX)
            .unwrap();

        assert_eq!(attack.trace.len(), 9, "{strategy}");
        assert_eq!(attack.trace.largest.first(), Some(&9), "{strategy}");
        assert_eq!(attack.trace.largest.last(), Some(&0), "{strategy}");
        assert_eq!(attack.trace.second_largest.last(), Some(&0), "{strategy}");
        assert_eq!(attack.trace.efficiency.last(), Some(&0.0), "{strategy}");
        assert!(
            attack.trace.largest.windows(2).all(|w| w[1] <= w[0]),
            "{strategy}"
        );
        assert_eq!(attack.residual.vertex_count(), 0, "{strategy}");
    }
}

#[test]
fn hypercube_betweenness_attack_starts_at_the_first_vertex() {
    // Q4 is vertex-transitive, every vertex ties on betweenness.
    let edges = (0..16usize)
        .flat_map(|i| (0..4).map(move |bit| (i, i ^ (1 << bit))))
        .filter(|(i, j)| i < j)
        .map(|(i, j)| Edge::new(i, j));
    let graph = Graph::from_edges(16, edges, false).unwrap();

    let trace = run_attack(
        &graph,
        Strategy::NodeCentrality(Centrality::Betweenness),
        1,
        Weighting::Unweighted,
        None,
    )
    .unwrap();

    assert_eq!(trace.removed, vec![Removed::Vertex("0".into())]);
    assert_eq!(trace.largest, vec![16, 15]);
}

#[test]
fn edge_attack_on_two_components() {
    // A triangle and a separate edge.
    let graph = Graph::from_edges(
        5,
        [
            Edge::new(0, 1),
            Edge::new(1, 2),
            Edge::new(2, 0),
            Edge::new(3, 4),
        ],
        false,
    )
    .unwrap();

    assert_eq!(graph.largest_component(), 3);
    assert_eq!(graph.second_largest_component(), 2);

    let trace = run_attack(
        &graph,
        Strategy::EdgeCentrality(Centrality::EdgeBetweenness),
        1,
        Weighting::Unweighted,
        None,
    )
    .unwrap();

    // Every edge carries exactly its own pair, so the tie goes to the first edge.
    let scores = trace.scores.unwrap();
    assert_eq!(trace.removed, vec![Removed::Edge("0".into(), "1".into())]);
    assert_eq!(trace.largest, vec![3, 3]);
    assert_eq!(scores, vec![0.1]);
}

#[test]
fn weighted_attack_follows_distances() {
    // A square where the heavy edge 0 - 1 pushes traffic around the long way.
    let graph = Graph::from_edges(
        4,
        [
            Edge::weighted(0, 1, 10.0),
            Edge::weighted(1, 2, 1.0),
            Edge::weighted(2, 3, 1.0),
            Edge::weighted(3, 0, 1.0),
        ],
        false,
    )
    .unwrap();

    let trace = run_attack(
        &graph,
        Strategy::EdgeCentrality(Centrality::EdgeBetweenness),
        1,
        Weighting::Weighted,
        None,
    )
    .unwrap();

    assert_ne!(trace.removed[0], Removed::Edge("0".into(), "1".into()));
    assert!(trace.efficiency[0] < 1.0);
}

// ---------------------------------------------------------------------------
// Random attacks
// ---------------------------------------------------------------------------

#[test]
fn seeded_runs_repeat() {
    let graph = hubs(5);

    for strategy in [Strategy::NodeRandom, Strategy::EdgeRandom] {
        let a = run_attack(&graph, strategy, 6, Weighting::Unweighted, Some(2024)).unwrap();
        let b = run_attack(&graph, strategy, 6, Weighting::Unweighted, Some(2024)).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
    }
}

#[test]
fn targeted_beats_random_on_hubs() {
    let graph = hubs(8);
    let config = AttackConfig {
        seed: Some(11),
        ..Default::default()
    };

    let targeted = run_attack(
        &graph,
        Strategy::NodeCentrality(Centrality::Degree),
        3,
        Weighting::Unweighted,
        None,
    )
    .unwrap();
    let random = random_trials(&graph, Strategy::NodeRandom, 3, 50, &config).unwrap();

    // Without the hubs only isolated leaves remain.
    assert_eq!(targeted.efficiency[3], 0.0);
    assert_eq!(targeted.largest[3], 1);
    assert!(random.efficiency.mean[3] > targeted.efficiency[3]);
    assert!(random.largest.mean[3] > 1.0);
}

#[test]
fn trial_summaries_are_reproducible_across_thread_counts() {
    let graph = hubs(4);
    let config = |num_threads| {
        let mut config = AttackConfig {
            seed: Some(3),
            ..Default::default()
        };
        config.centrality.num_threads = num_threads;
        config
    };

    let serial = random_trials(&graph, Strategy::EdgeRandom, 5, 20, &config(1)).unwrap();
    let parallel = random_trials(&graph, Strategy::EdgeRandom, 5, 20, &config(4)).unwrap();

    assert_eq!(serial, parallel);
}
