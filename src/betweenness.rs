//! A module for performing the multi-threaded computation of betweenness

use crate::{
    compute::fold_sources,
    config::Weighting,
    graph::Graph,
    paths::PathDag,
};

/// Normalized vertex and edge betweenness.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Betweenness {
    pub(crate) vertices: Vec<f64>,
    pub(crate) edges: Vec<f64>,
}

/// Per-thread accumulator of raw dependency scores.
struct Totals {
    vertices: Vec<f64>,
    edges: Vec<f64>,
}

/// this is an implementation of Ulrik Brandes's
/// A Faster Algorithm for Betweenness Centrality
/// http://snap.stanford.edu/class/cs224w-readings/brandes01centrality.pdf
/// "Algorithm 1", extended to weighted graphs (Dijkstra instead of BFS) and to edges: the
/// dependency flowing from `w` back to a predecessor `v` is also credited to the edge `v → w`.
fn betweenness_for_node(graph: &Graph, source: usize, weighting: Weighting, totals: &mut Totals) {
    let dag = PathDag::new(graph, source, weighting, graph.path_direction());
    let mut delta = vec![0.0; graph.vertex_count()];

    for &w in dag.order.iter().rev() {
        let coefficient = (1.0 + delta[w]) / dag.sigma[w];
        for link in &dag.predecessors[w] {
            let c = dag.sigma[link.vertex] * coefficient;
            totals.edges[link.edge] += c;
            delta[link.vertex] += c;
        }
        if w != source {
            totals.vertices[w] += delta[w];
        }
    }
}

/// Computes vertex and edge betweenness from every source, spread over `num_threads` workers.
///
/// Vertex scores are normalized by `1/((n-1)(n-2))` for directed graphs and `2/((n-1)(n-2))` for
/// undirected ones, edge scores by `1/(n(n-1))` and `2/(n(n-1))`. Undirected graphs count every
/// pair from both ends, so raw scores are halved first. Graphs too small for the normalizer get
/// zeros.
pub(crate) fn compute_betweenness(
    graph: &Graph,
    weighting: Weighting,
    num_threads: usize,
) -> Betweenness {
    let n = graph.vertex_count();
    let m = graph.edge_count();

    let mut vertices = vec![0.0; n];
    let mut edges = vec![0.0; m];

    if n < 2 {
        return Betweenness { vertices, edges };
    }

    let blocks = fold_sources(
        n,
        num_threads,
        || Totals {
            vertices: vec![0.0; n],
            edges: vec![0.0; m],
        },
        |source, totals| betweenness_for_node(graph, source, weighting, totals),
    );

    for totals in blocks {
        for (b, t) in vertices.iter_mut().zip(&totals.vertices) {
            *b += t;
        }
        for (b, t) in edges.iter_mut().zip(&totals.edges) {
            *b += t;
        }
    }

    let n = n as f64;
    // Halving undirected counts and doubling for unordered pairs cancel out, both cases divide by
    // the number of ordered pairs.
    let vertex_pairs = (n - 1.0) * (n - 2.0);
    let edge_pairs = n * (n - 1.0);

    for b in &mut vertices {
        *b = if vertex_pairs > 0.0 { *b / vertex_pairs } else { 0.0 };
    }
    for b in &mut edges {
        *b /= edge_pairs;
    }

    Betweenness { vertices, edges }
}
