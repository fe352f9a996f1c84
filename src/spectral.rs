//! Eigenvector centrality and PageRank via power iteration.
//!
//! # Eigenvector centrality
//!
//! Iterates `x ← (A + I) x` and normalizes `x` to unit L2 norm after each step. The identity shift
//! leaves the eigenvectors of `A` untouched but makes the dominant one strictly dominant, so
//! bipartite graphs converge instead of oscillating. On directed graphs a vertex collects the
//! scores of the vertices pointing at it. The result is **not** rescaled to a maximum of 1.
//!
//! # PageRank
//!
//! ```text
//! PR(v) = (1 - d) / N + d * (Σ PR(u) * w(u, v) / out(u) + dangling / N)
//! ```
//!
//! where `dangling` is the total rank sitting on vertices without outgoing edges. Undirected edges
//! are walked both ways.
//!
//! Both stop when the L1 change of the iterate falls below `N * tolerance` and report
//! [`Error::NotConverged`] when `max_iter` is exhausted first.

use nalgebra::DVector;
use tracing::{trace, warn};

use crate::{
    centrality::Centrality,
    config::{PowerIteration, Weighting},
    error::{Error, Result},
    graph::{Direction, Graph},
};

/// Computes eigenvector centrality, scaled to unit L2 norm.
pub(crate) fn eigenvector(
    graph: &Graph,
    weighting: Weighting,
    power: &PowerIteration,
) -> Result<Vec<f64>> {
    let n = graph.vertex_count();
    if n == 0 {
        return Ok(Vec::new());
    }

    let edges = graph.edges();
    // A vertex collects from its in-neighbours, which for undirected graphs is every neighbour.
    let links = graph.links(Direction::Incoming);
    let threshold = n as f64 * power.tolerance;

    let mut x = DVector::from_element(n, 1.0 / (n as f64).sqrt());

    for iteration in 1..=power.max_iter {
        let mut next = x.clone();
        for (v, incoming) in links.iter().enumerate() {
            for link in incoming {
                next[v] += edges[link.edge].cost(weighting) * x[link.vertex];
            }
        }

        // The shifted operator is non-negative and x starts positive, so the norm can't vanish.
        let norm = next.norm();
        next.unscale_mut(norm);

        let change = (&next - &x).lp_norm(1);
        trace!(iteration, change, "eigenvector iteration");
        x = next;

        if change < threshold {
            return Ok(x.iter().copied().collect());
        }
    }

    warn!(
        max_iter = power.max_iter,
        "eigenvector centrality did not converge"
    );
    Err(Error::NotConverged {
        measure: Centrality::Eigenvector,
        iterations: power.max_iter,
    })
}

/// Computes PageRank with uniform teleportation, scores sum to 1.
pub(crate) fn pagerank(
    graph: &Graph,
    weighting: Weighting,
    damping: f64,
    power: &PowerIteration,
) -> Result<Vec<f64>> {
    let n = graph.vertex_count();
    if n == 0 {
        return Ok(Vec::new());
    }

    let edges = graph.edges();
    let links = graph.links(Direction::Outgoing);
    let n_f64 = n as f64;
    let threshold = n_f64 * power.tolerance;

    // Total outgoing weight per vertex, zero marks a dangling vertex.
    let strength: Vec<f64> = links
        .iter()
        .map(|out| out.iter().map(|l| edges[l.edge].cost(weighting)).sum())
        .collect();

    let mut x = DVector::from_element(n, 1.0 / n_f64);

    for iteration in 1..=power.max_iter {
        let dangling: f64 = strength
            .iter()
            .zip(x.iter())
            .filter(|(s, _)| **s == 0.0)
            .map(|(_, r)| r)
            .sum();

        let base = (1.0 - damping) / n_f64 + damping * dangling / n_f64;
        let mut next = DVector::from_element(n, base);

        for (u, out) in links.iter().enumerate() {
            if strength[u] == 0.0 {
                continue;
            }
            let share = damping * x[u] / strength[u];
            for link in out {
                next[link.vertex] += share * edges[link.edge].cost(weighting);
            }
        }

        // Guard against drift, the update preserves the total in exact arithmetic.
        let total = next.sum();
        next.unscale_mut(total);

        let change = (&next - &x).lp_norm(1);
        trace!(iteration, change, "pagerank iteration");
        x = next;

        if change < threshold {
            return Ok(x.iter().copied().collect());
        }
    }

    warn!(max_iter = power.max_iter, "pagerank did not converge");
    Err(Error::NotConverged {
        measure: Centrality::PageRank,
        iterations: power.max_iter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Edge;

    fn star(leaves: usize) -> Graph {
        Graph::from_edges(
            leaves + 1,
            (1..=leaves).map(|leaf| Edge::new(0, leaf)),
            false,
        )
        .unwrap()
    }

    fn power(tolerance: f64) -> PowerIteration {
        PowerIteration {
            max_iter: 1000,
            tolerance,
        }
    }

    #[test]
    fn eigenvector_of_star() {
        let scores = eigenvector(&star(4), Weighting::Unweighted, &power(1e-12)).unwrap();

        // Dominant eigenvector of K(1,4) is (2, 1, 1, 1, 1) / sqrt(8).
        let leaf = 1.0 / 8f64.sqrt();
        assert!((scores[0] - 2.0 * leaf).abs() < 1e-6);
        for score in &scores[1..] {
            assert!((score - leaf).abs() < 1e-6);
        }
    }

    #[test]
    fn eigenvector_is_unit_length_not_max_scaled() {
        // 0-1, 0-2, 0-3, 1-2, 1-3
        let graph = Graph::from_edges(
            4,
            [
                Edge::new(0, 1),
                Edge::new(0, 2),
                Edge::new(0, 3),
                Edge::new(1, 2),
                Edge::new(1, 3),
            ],
            false,
        )
        .unwrap();

        let scores = eigenvector(&graph, Weighting::Unweighted, &power(1e-12)).unwrap();
        let norm: f64 = scores.iter().map(|s| s * s).sum::<f64>().sqrt();

        assert!((norm - 1.0).abs() < 1e-9);
        assert!(scores[0] < 1.0);
        assert!((scores[0] - scores[1]).abs() < 1e-9);
        assert!((scores[2] - scores[3]).abs() < 1e-9);
        assert!(scores[0] > scores[2]);
    }

    #[test]
    fn eigenvector_bipartite_converges() {
        // A path is bipartite, unshifted power iteration would oscillate.
        let graph =
            Graph::from_edges(4, [Edge::new(0, 1), Edge::new(1, 2), Edge::new(2, 3)], false)
                .unwrap();

        let scores = eigenvector(&graph, Weighting::Unweighted, &power(1e-10)).unwrap();

        assert!(scores[1] > scores[0]);
        assert!((scores[1] - scores[2]).abs() < 1e-8);
    }

    #[test]
    fn eigenvector_reports_non_convergence() {
        let strict = PowerIteration {
            max_iter: 2,
            tolerance: 1e-15,
        };

        assert_eq!(
            eigenvector(&star(4), Weighting::Unweighted, &strict),
            Err(Error::NotConverged {
                measure: Centrality::Eigenvector,
                iterations: 2
            })
        );
    }

    #[test]
    fn eigenvector_weights_pull_scores() {
        let graph = Graph::from_edges(
            3,
            [Edge::weighted(0, 1, 10.0), Edge::weighted(1, 2, 1.0)],
            false,
        )
        .unwrap();

        let weighted = eigenvector(&graph, Weighting::Weighted, &power(1e-10)).unwrap();

        assert!(weighted[0] > weighted[2]);
    }

    #[test]
    fn pagerank_sums_to_one() {
        let scores = pagerank(&star(4), Weighting::Unweighted, 0.85, &power(1e-10)).unwrap();

        assert!((scores.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(scores[0] > scores[1]);
        for score in &scores[2..] {
            assert!((score - scores[1]).abs() < 1e-12);
        }
    }

    #[test]
    fn pagerank_of_star_matches_closed_form() {
        // Leaves only point at the center, the center spreads evenly:
        // c = (1-d)/5 + d * 4l, l = (1-d)/5 + d * c/4.
        let d = 0.85;
        let scores = pagerank(&star(4), Weighting::Unweighted, d, &power(1e-12)).unwrap();

        let t = (1.0 - d) / 5.0;
        let center = (t + 4.0 * d * t) / (1.0 - d * d);
        assert!((scores[0] - center).abs() < 1e-9);
    }

    #[test]
    fn pagerank_redistributes_dangling_mass() {
        // 0 → 1, 1 has nowhere to go.
        let graph = Graph::from_edges(2, [Edge::new(0, 1)], true).unwrap();

        let scores = pagerank(&graph, Weighting::Unweighted, 0.85, &power(1e-12)).unwrap();

        assert!((scores.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(scores[1] > scores[0]);
        assert!(scores[0] > 0.0);
    }

    #[test]
    fn empty_graph() {
        assert!(eigenvector(&Graph::new(false), Weighting::Unweighted, &power(1e-8))
            .unwrap()
            .is_empty());
        assert!(
            pagerank(&Graph::new(false), Weighting::Unweighted, 0.85, &power(1e-8))
                .unwrap()
                .is_empty()
        );
    }
}
