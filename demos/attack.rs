use netdismantle::{
    centrality::Centrality,
    dismantle::{random_trials, Dismantler, Strategy},
    AttackConfig, Graph,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// A mock peer-to-peer topology: a ring of relays, each serving a handful of light clients.
fn topology(relays: usize, clients_per_relay: usize) -> Graph {
    let mut edges = Vec::new();

    for r in 0..relays {
        edges.push((format!("relay{r}"), format!("relay{}", (r + 1) % relays), None));
        for c in 0..clients_per_relay {
            edges.push((format!("relay{r}"), format!("client{r}.{c}"), None));
        }
    }

    Graph::from_named_edges(edges, false).unwrap()
}

fn main() {
    // RUST_LOG=netdismantle=debug shows every removal.
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    const STEPS: usize = 4;
    let graph = topology(6, 4);
    let config = AttackConfig {
        seed: Some(7),
        ..Default::default()
    };

    println!(
        "\nAttacking a network with {} peers and {} connections...",
        graph.vertex_count(),
        graph.edge_count()
    );

    let dismantler = Dismantler::with_config(&graph, config);
    for strategy in [
        Strategy::NodeCentrality(Centrality::Betweenness),
        Strategy::EdgeCentrality(Centrality::EdgeBetweenness),
        Strategy::ArticulationPoint,
    ] {
        let attack = dismantler.attack(strategy, STEPS).unwrap();

        println!("\n{strategy}:");
        println!(
            "  {:<10} lcc={:>3} slcc={:>3} efficiency={:.3}",
            "baseline", attack.trace.largest[0], attack.trace.second_largest[0], attack.trace.efficiency[0]
        );
        for (step, removed) in attack.trace.removed.iter().enumerate() {
            println!(
                "  {:<10} lcc={:>3} slcc={:>3} efficiency={:.3}",
                removed.to_string(),
                attack.trace.largest[step + 1],
                attack.trace.second_largest[step + 1],
                attack.trace.efficiency[step + 1]
            );
        }
    }

    let random = random_trials(&graph, Strategy::NodeRandom, STEPS, 100, &config).unwrap();

    println!("\n{} over {} trials:", random.strategy, random.trials);
    for step in 0..random.efficiency.mean.len() {
        println!(
            "  step {step}     lcc={:>6.2} efficiency={:.3} ± {:.3}",
            random.largest.mean[step], random.efficiency.mean[step], random.efficiency.std_dev[step]
        );
    }
}
