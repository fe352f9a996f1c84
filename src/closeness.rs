//! A module for performing the multi-threaded computation of closeness

use crate::{
    compute::fold_sources,
    config::Weighting,
    graph::{Direction, Graph},
    paths::single_source,
};

/// Closeness of one vertex: the number of vertices it reaches divided by the summed distance to
/// them. Unreachable vertices are left out of both, a vertex reaching nobody scores 0.
fn closeness_for_node(graph: &Graph, index: usize, weighting: Weighting) -> f64 {
    let distances = single_source(graph, index, weighting, Direction::Both);

    let (reached, total) = distances
        .iter()
        .enumerate()
        .filter(|(j, d)| *j != index && d.is_finite())
        .fold((0usize, 0.0), |(reached, total), (_, d)| (reached + 1, total + d));

    if total > 0.0 {
        reached as f64 / total
    } else {
        0.0
    }
}

/// Computes the closeness of every vertex. Edges are walked both ways on directed graphs.
pub(crate) fn compute_closeness(graph: &Graph, weighting: Weighting, num_threads: usize) -> Vec<f64> {
    let blocks = fold_sources(graph.vertex_count(), num_threads, Vec::new, |index, scores| {
        scores.push(closeness_for_node(graph, index, weighting))
    });

    // Blocks come back in source order.
    blocks.into_iter().flatten().collect()
}
