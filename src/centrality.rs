//! Centrality measures and the rankings built from them.
//!
//! Every measure produces one score per vertex (or per edge for [`Centrality::EdgeBetweenness`]).
//! A [`Ranking`] orders those scores from highest to lowest, ties keep index order. The dismantling
//! simulator always removes the first element of a ranking, so the order is part of the contract.

use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    betweenness::compute_betweenness,
    closeness::compute_closeness,
    config::{CentralityConfig, PowerIteration, Weighting},
    error::Result,
    graph::Graph,
    spectral,
};

/// The available centrality measures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Centrality {
    /// Number of incident edge endpoints divided by `n - 1`.
    Degree,
    /// Dominant eigenvector of the adjacency matrix, unit L2 norm.
    Eigenvector,
    /// Normalized share of shortest paths passing through a vertex.
    Betweenness,
    /// Normalized share of shortest paths passing through an edge.
    EdgeBetweenness,
    /// Reachable vertices divided by the summed distance to them.
    Closeness,
    /// Stationary distribution of a random walk with teleportation.
    PageRank,
}

impl Centrality {
    /// Every measure, in declaration order.
    pub const ALL: [Centrality; 6] = [
        Centrality::Degree,
        Centrality::Eigenvector,
        Centrality::Betweenness,
        Centrality::EdgeBetweenness,
        Centrality::Closeness,
        Centrality::PageRank,
    ];

    /// Returns what the measure scores.
    pub fn target(self) -> Target {
        match self {
            Centrality::EdgeBetweenness => Target::Edges,
            _ => Target::Vertices,
        }
    }
}

impl fmt::Display for Centrality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Centrality::Degree => "degree centrality",
            Centrality::Eigenvector => "eigenvector centrality",
            Centrality::Betweenness => "betweenness centrality",
            Centrality::EdgeBetweenness => "edge betweenness centrality",
            Centrality::Closeness => "closeness centrality",
            Centrality::PageRank => "pagerank",
        };

        f.write_str(name)
    }
}

/// The kind of graph element a measure scores or a strategy removes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Vertices,
    Edges,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Vertices => f.write_str("vertices"),
            Target::Edges => f.write_str("edges"),
        }
    }
}

/// A vertex or edge, by its index in the graph the ranking was computed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Vertex(usize),
    Edge(usize),
}

/// Scores sorted from highest to lowest, ties broken by ascending index.
///
/// Scores closer than [`TIE_TOLERANCE`] relative to the largest finite score count as tied, so
/// elements that are equal up to floating point noise keep their index order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    measure: Centrality,
    entries: Vec<(Element, f64)>,
}

impl Ranking {
    /// Builds a ranking from scores indexed by element.
    pub fn from_scores(measure: Centrality, scores: &[f64]) -> Self {
        let element = match measure.target() {
            Target::Vertices => Element::Vertex,
            Target::Edges => Element::Edge,
        };

        let scale = scores
            .iter()
            .filter(|score| score.is_finite())
            .fold(0.0_f64, |max, score| max.max(score.abs()));

        let mut keyed: Vec<(f64, Element, f64)> = scores
            .iter()
            .enumerate()
            .map(|(i, &score)| (tie_key(score, scale), element(i), score))
            .collect();

        // `sort_by` is stable, equal keys keep their index order.
        keyed.sort_by(|(a, ..), (b, ..)| descending(*a, *b));

        let entries = keyed
            .into_iter()
            .map(|(_, element, score)| (element, score))
            .collect();

        Self { measure, entries }
    }

    pub fn measure(&self) -> Centrality {
        self.measure
    }

    /// Returns the highest ranked element and its score.
    pub fn first(&self) -> Option<(Element, f64)> {
        self.entries.first().copied()
    }

    pub fn entries(&self) -> &[(Element, f64)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Element, f64)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the score of the given element, if it was ranked.
    pub fn score(&self, element: Element) -> Option<f64> {
        self.entries
            .iter()
            .find(|(e, _)| *e == element)
            .map(|(_, score)| *score)
    }
}

/// Relative precision below which two scores are ranked as equal.
pub const TIE_TOLERANCE: f64 = 1e-12;

/// Snaps `score` to a multiple of `TIE_TOLERANCE * scale`. Non-finite scores pass through.
fn tie_key(score: f64, scale: f64) -> f64 {
    if score.is_finite() && scale > 0.0 {
        (score / scale / TIE_TOLERANCE).round()
    } else {
        score
    }
}

/// Higher first. NaN never comes out of the measures but sorts last if it does.
fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => b.total_cmp(&a),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
    }
}

/// Computes `measure` with the default configuration and ranks the result.
///
/// # Examples
///
/// ```
/// use netdismantle::centrality::{compute_centrality, Centrality, Element};
/// use netdismantle::config::Weighting;
/// use netdismantle::edge::Edge;
/// use netdismantle::graph::Graph;
///
/// // A star: vertex 0 is the hub.
/// let graph = Graph::from_edges(5, (1..5).map(|leaf| Edge::new(0, leaf)), false).unwrap();
/// let ranking = compute_centrality(&graph, Centrality::Betweenness, Weighting::Unweighted).unwrap();
///
/// assert_eq!(ranking.first(), Some((Element::Vertex(0), 1.0)));
/// assert_eq!(ranking.score(Element::Vertex(3)), Some(0.0));
/// ```
pub fn compute_centrality(
    graph: &Graph,
    measure: Centrality,
    weighting: Weighting,
) -> Result<Ranking> {
    compute_centrality_with(graph, measure, &CentralityConfig::weighted(weighting))
}

/// Computes `measure` with an explicit configuration and ranks the result.
#[instrument(skip(graph, config), fields(vertices = graph.vertex_count(), edges = graph.edge_count()))]
pub fn compute_centrality_with(
    graph: &Graph,
    measure: Centrality,
    config: &CentralityConfig,
) -> Result<Ranking> {
    config.validate()?;

    let weighting = config.weighting;
    let scores = match measure {
        Centrality::Degree => graph.degree_centrality(),
        Centrality::Eigenvector => spectral::eigenvector(graph, weighting, &config.power)?,
        Centrality::Betweenness => {
            compute_betweenness(graph, weighting, config.threads()).vertices
        }
        Centrality::EdgeBetweenness => compute_betweenness(graph, weighting, config.threads()).edges,
        Centrality::Closeness => compute_closeness(graph, weighting, config.threads()),
        Centrality::PageRank => {
            spectral::pagerank(graph, weighting, config.damping, &config.power)?
        }
    };

    Ok(Ranking::from_scores(measure, &scores))
}

/// Per-element scores, indexed like the graph's vertices (or edges).
impl Graph {
    /// Degree divided by `n - 1`, 0 for graphs with at most one vertex. Directed graphs count
    /// both incoming and outgoing edges.
    ///
    /// # Examples
    ///
    /// ```
    /// use netdismantle::edge::Edge;
    /// use netdismantle::graph::Graph;
    ///
    /// let graph = Graph::from_edges(5, (1..5).map(|leaf| Edge::new(0, leaf)), false).unwrap();
    /// assert_eq!(graph.degree_centrality(), vec![1.0, 0.25, 0.25, 0.25, 0.25]);
    /// ```
    pub fn degree_centrality(&self) -> Vec<f64> {
        let n = self.vertex_count();
        if n <= 1 {
            return vec![0.0; n];
        }

        let scale = (n - 1) as f64;
        self.degrees()
            .into_iter()
            .map(|degree| degree as f64 / scale)
            .collect()
    }

    /// Normalized vertex betweenness, see [`Centrality::Betweenness`].
    pub fn betweenness_centrality(&self, weighting: Weighting) -> Vec<f64> {
        compute_betweenness(self, weighting, CentralityConfig::default().threads()).vertices
    }

    /// Normalized edge betweenness, indexed like [`Graph::edges`].
    pub fn edge_betweenness_centrality(&self, weighting: Weighting) -> Vec<f64> {
        compute_betweenness(self, weighting, CentralityConfig::default().threads()).edges
    }

    /// Closeness, weights are read as distances.
    pub fn closeness_centrality(&self, weighting: Weighting) -> Vec<f64> {
        compute_closeness(self, weighting, CentralityConfig::default().threads())
    }

    /// Eigenvector centrality with unit L2 norm, weights are read as connection strengths.
    pub fn eigenvector_centrality(
        &self,
        weighting: Weighting,
        power: &PowerIteration,
    ) -> Result<Vec<f64>> {
        spectral::eigenvector(self, weighting, power)
    }

    /// PageRank with the given damping factor.
    pub fn pagerank(
        &self,
        weighting: Weighting,
        damping: f64,
        power: &PowerIteration,
    ) -> Result<Vec<f64>> {
        spectral::pagerank(self, weighting, damping, power)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{edge::Edge, error::Error};

    fn cycle(n: usize) -> Graph {
        Graph::from_edges(n, (0..n).map(|i| Edge::new(i, (i + 1) % n)), false).unwrap()
    }

    #[test]
    fn ranking_is_stable_on_ties() {
        let ranking = Ranking::from_scores(Centrality::Degree, &[0.5, 1.0, 0.5, 1.0, 0.0]);

        let order: Vec<Element> = ranking.iter().map(|(e, _)| *e).collect();
        assert_eq!(
            order,
            vec![
                Element::Vertex(1),
                Element::Vertex(3),
                Element::Vertex(0),
                Element::Vertex(2),
                Element::Vertex(4),
            ]
        );
    }

    #[test]
    fn near_equal_scores_tie() {
        let scores = [1.0, 1.0 + 4e-16, 0.25, 0.25 - 1e-16, 1.0 - 1e-9];
        let ranking = Ranking::from_scores(Centrality::Betweenness, &scores);

        let order: Vec<Element> = ranking.iter().map(|(e, _)| *e).collect();
        assert_eq!(
            order,
            vec![
                Element::Vertex(0),
                Element::Vertex(1),
                Element::Vertex(4),
                Element::Vertex(2),
                Element::Vertex(3),
            ]
        );
        // The raw scores are reported, not the keys they were sorted by.
        assert_eq!(ranking.score(Element::Vertex(1)), Some(1.0 + 4e-16));
    }

    #[test]
    fn hypercube_betweenness_ranks_in_index_order() {
        // Q4: every vertex is equivalent, summation order only moves the last bits.
        let edges = (0..16usize)
            .flat_map(|i| (0..4).map(move |bit| (i, i ^ (1 << bit))))
            .filter(|(i, j)| i < j)
            .map(|(i, j)| Edge::new(i, j));
        let graph = Graph::from_edges(16, edges, false).unwrap();

        let ranking =
            compute_centrality(&graph, Centrality::Betweenness, Weighting::Unweighted).unwrap();

        let order: Vec<Element> = ranking.iter().map(|(e, _)| *e).collect();
        assert_eq!(order, (0..16).map(Element::Vertex).collect::<Vec<_>>());
    }

    #[test]
    fn torus_rankings_follow_index_order() {
        let (rows, cols) = (5, 7);
        let at = |r: usize, c: usize| (r % rows) * cols + c % cols;
        let edges = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (r, c)))
            .flat_map(|(r, c)| {
                [
                    Edge::new(at(r, c), at(r, c + 1)),
                    Edge::new(at(r, c), at(r + 1, c)),
                ]
            });
        let graph = Graph::from_edges(rows * cols, edges, false).unwrap();

        for measure in [Centrality::Betweenness, Centrality::Closeness] {
            let ranking = compute_centrality(&graph, measure, Weighting::Unweighted).unwrap();

            let order: Vec<Element> = ranking.iter().map(|(e, _)| *e).collect();
            assert_eq!(order, (0..rows * cols).map(Element::Vertex).collect::<Vec<_>>());
        }
    }

    #[test]
    fn ranking_targets_edges_for_edge_measures() {
        let ranking = Ranking::from_scores(Centrality::EdgeBetweenness, &[0.1, 0.3]);

        assert_eq!(ranking.first(), Some((Element::Edge(1), 0.3)));
        assert_eq!(ranking.score(Element::Vertex(0)), None);
    }

    #[test]
    fn nan_sorts_last() {
        let ranking = Ranking::from_scores(Centrality::Closeness, &[f64::NAN, 0.2]);

        assert_eq!(ranking.first(), Some((Element::Vertex(1), 0.2)));
    }

    #[test]
    fn symmetric_cycle_ranks_in_index_order() {
        let graph = cycle(6);

        for measure in [
            Centrality::Degree,
            Centrality::Betweenness,
            Centrality::Closeness,
        ] {
            let ranking = compute_centrality(&graph, measure, Weighting::Unweighted).unwrap();
            let order: Vec<Element> = ranking.iter().map(|(e, _)| *e).collect();

            assert_eq!(order, (0..6).map(Element::Vertex).collect::<Vec<_>>());
            let first = ranking.entries()[0].1;
            assert!(ranking.iter().all(|(_, score)| *score == first));
        }
    }

    #[test]
    fn every_measure_ranks_every_element() {
        let graph = cycle(5);

        for measure in Centrality::ALL {
            let ranking = compute_centrality(&graph, measure, Weighting::Unweighted).unwrap();
            let expected = match measure.target() {
                Target::Vertices => graph.vertex_count(),
                Target::Edges => graph.edge_count(),
            };

            assert_eq!(ranking.len(), expected, "{measure}");
            assert_eq!(ranking.measure(), measure);
        }
    }

    #[test]
    fn degree_centrality_degenerate() {
        assert!(Graph::new(false).degree_centrality().is_empty());
        assert_eq!(
            Graph::from_edges(1, [], false).unwrap().degree_centrality(),
            vec![0.0]
        );
    }

    #[test]
    fn directed_degree_counts_both_directions() {
        let graph = Graph::from_edges(3, [Edge::new(0, 1), Edge::new(2, 1)], true).unwrap();

        assert_eq!(graph.degree_centrality(), vec![0.5, 1.0, 0.5]);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = CentralityConfig {
            damping: 2.0,
            ..Default::default()
        };

        assert!(matches!(
            compute_centrality_with(&cycle(3), Centrality::PageRank, &config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn display() {
        assert_eq!(Centrality::PageRank.to_string(), "pagerank");
        assert_eq!(
            Centrality::EdgeBetweenness.to_string(),
            "edge betweenness centrality"
        );
    }
}
