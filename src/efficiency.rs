//! Global efficiency.
//!
//! References:
//! - Latora, V., and Marchiori, M. (2001). Efficient behavior of small-world networks. Physical
//!   Review Letters 87.
//! - Latora, V., and Marchiori, M. (2003). Economic small-world behavior in weighted networks.
//!   Eur Phys J B 32, 249-263.

use crate::{
    compute::fold_sources,
    config::{CentralityConfig, Weighting},
    graph::{Direction, Graph},
    paths::single_source,
};

/// Sums `1 / d(i, j)` over every ordered pair of distinct vertices joined by a path and divides by
/// `n (n - 1)`. Pairs without a path are skipped. Distances ignore edge direction.
pub(crate) fn compute_efficiency(graph: &Graph, weighting: Weighting, num_threads: usize) -> f64 {
    let n = graph.vertex_count();
    if n < 2 {
        return 0.0;
    }

    let blocks = fold_sources(n, num_threads, || 0.0, |source, total| {
        *total += single_source(graph, source, weighting, Direction::Both)
            .into_iter()
            .filter(|d| *d > 0.0 && d.is_finite())
            .map(|d| 1.0 / d)
            .sum::<f64>();
    });

    let n = n as f64;
    blocks.into_iter().sum::<f64>() / (n * (n - 1.0))
}

impl Graph {
    /// Returns the global efficiency of the graph, 0 for graphs with fewer than two vertices.
    ///
    /// Unweighted efficiency lies in `[0, 1]` and equals 1 exactly for complete graphs. Weighted
    /// efficiency is unbounded since weights are arbitrary positive distances.
    ///
    /// # Examples
    ///
    /// ```
    /// use netdismantle::config::Weighting;
    /// use netdismantle::edge::Edge;
    /// use netdismantle::graph::Graph;
    ///
    /// let triangle = Graph::from_edges(3, [Edge::new(0, 1), Edge::new(1, 2), Edge::new(2, 0)], false).unwrap();
    /// assert_eq!(triangle.global_efficiency(Weighting::Unweighted), 1.0);
    /// ```
    pub fn global_efficiency(&self, weighting: Weighting) -> f64 {
        compute_efficiency(self, weighting, CentralityConfig::default().threads())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Edge;

    fn complete(n: usize) -> Graph {
        let edges = (0..n).flat_map(|i| (i + 1..n).map(move |j| Edge::new(i, j)));
        Graph::from_edges(n, edges, false).unwrap()
    }

    #[test]
    fn complete_graph_is_fully_efficient() {
        for n in 2..8 {
            assert_eq!(complete(n).global_efficiency(Weighting::Unweighted), 1.0);
        }
    }

    #[test]
    fn degenerate_graphs() {
        assert_eq!(Graph::new(false).global_efficiency(Weighting::Unweighted), 0.0);
        assert_eq!(
            Graph::from_edges(1, [], false)
                .unwrap()
                .global_efficiency(Weighting::Unweighted),
            0.0
        );
        assert_eq!(
            Graph::from_edges(4, [], false)
                .unwrap()
                .global_efficiency(Weighting::Unweighted),
            0.0
        );
    }

    #[test]
    fn disconnected_pairs_are_skipped() {
        // Two disjoint edges: 4 of the 12 ordered pairs are at distance 1.
        let graph = Graph::from_edges(4, [Edge::new(0, 1), Edge::new(2, 3)], false).unwrap();

        assert_eq!(graph.global_efficiency(Weighting::Unweighted), 4.0 / 12.0);
    }

    #[test]
    fn path_of_three() {
        // Pairs at distance 1: 4, at distance 2: 2.
        let graph = Graph::from_edges(3, [Edge::new(0, 1), Edge::new(1, 2)], false).unwrap();

        let expected = (4.0 + 2.0 * 0.5) / 6.0;
        assert!((graph.global_efficiency(Weighting::Unweighted) - expected).abs() < 1e-12);
    }

    #[test]
    fn weighted_efficiency_uses_distances() {
        let graph = Graph::from_edges(2, [Edge::weighted(0, 1, 0.25)], false).unwrap();

        assert_eq!(graph.global_efficiency(Weighting::Weighted), 4.0);
        assert_eq!(graph.global_efficiency(Weighting::Unweighted), 1.0);
    }

    #[test]
    fn direction_is_ignored() {
        let graph = Graph::from_edges(2, [Edge::new(0, 1)], true).unwrap();

        assert_eq!(graph.global_efficiency(Weighting::Unweighted), 1.0);
    }

    #[test]
    fn threads_agree() {
        let graph = complete(40);

        assert_eq!(
            compute_efficiency(&graph, Weighting::Unweighted, 1).to_bits(),
            compute_efficiency(&graph, Weighting::Unweighted, 6).to_bits()
        );
    }
}
