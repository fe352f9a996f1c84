//! Single-source shortest paths.
//!
//! Unweighted traversals use breadth-first search, weighted ones use Dijkstra with a binary heap.
//! Distances are `f64` hop counts or summed weights, unreachable vertices sit at [`UNREACHABLE`].
//! Self-loops never shorten a path and are skipped.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, VecDeque},
};

use crate::{
    config::Weighting,
    graph::{Direction, Graph, Link},
};

/// Distance to a vertex that can't be reached from the source.
pub const UNREACHABLE: f64 = f64::INFINITY;

/// Weighted distances closer than this (relative) are considered equal when counting shortest
/// paths.
const EPSILON: f64 = 1e-10;

/// Computes the distance from `source` to every vertex of the graph.
///
/// # Examples
///
/// ```
/// use netdismantle::config::Weighting;
/// use netdismantle::edge::Edge;
/// use netdismantle::graph::{Direction, Graph};
/// use netdismantle::paths::{single_source, UNREACHABLE};
///
/// let graph = Graph::from_edges(4, [Edge::new(0, 1), Edge::weighted(1, 2, 2.5)], false).unwrap();
///
/// assert_eq!(
///     single_source(&graph, 0, Weighting::Unweighted, Direction::Both),
///     vec![0.0, 1.0, 2.0, UNREACHABLE]
/// );
/// assert_eq!(
///     single_source(&graph, 0, Weighting::Weighted, Direction::Both),
///     vec![0.0, 1.0, 3.5, UNREACHABLE]
/// );
/// ```
pub fn single_source(
    graph: &Graph,
    source: usize,
    weighting: Weighting,
    direction: Direction,
) -> Vec<f64> {
    match weighting {
        Weighting::Unweighted => bfs(graph.links(direction), source),
        Weighting::Weighted => dijkstra(graph, graph.links(direction), source),
    }
}

/// Computes the distance matrix, one row per source, by running [`single_source`] from every
/// vertex.
pub fn all_pairs(graph: &Graph, weighting: Weighting, direction: Direction) -> Vec<Vec<f64>> {
    (0..graph.vertex_count())
        .map(|source| single_source(graph, source, weighting, direction))
        .collect()
}

fn bfs(links: &[Vec<Link>], source: usize) -> Vec<f64> {
    let mut distance = vec![UNREACHABLE; links.len()];
    let mut queue = VecDeque::new();

    distance[source] = 0.0;
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        for link in &links[v] {
            if distance[link.vertex] == UNREACHABLE {
                distance[link.vertex] = distance[v] + 1.0;
                queue.push_back(link.vertex);
            }
        }
    }

    distance
}

fn dijkstra(graph: &Graph, links: &[Vec<Link>], source: usize) -> Vec<f64> {
    let edges = graph.edges();
    let mut distance = vec![UNREACHABLE; links.len()];
    let mut settled = vec![false; links.len()];
    let mut heap = BinaryHeap::new();

    distance[source] = 0.0;
    heap.push(Candidate {
        distance: 0.0,
        vertex: source,
    });

    while let Some(Candidate { distance: d, vertex: v }) = heap.pop() {
        if settled[v] {
            continue;
        }
        settled[v] = true;

        for link in &links[v] {
            let w = link.vertex;
            if w == v {
                continue;
            }

            let alt = d + edges[link.edge].cost(Weighting::Weighted);
            if alt < distance[w] {
                distance[w] = alt;
                heap.push(Candidate {
                    distance: alt,
                    vertex: w,
                });
            }
        }
    }

    distance
}

/// The shortest-path DAG rooted at one source, as needed by Brandes' algorithm.
pub(crate) struct PathDag {
    /// Vertices in order of non-decreasing distance from the source.
    pub(crate) order: Vec<usize>,
    /// Number of shortest paths from the source to each vertex.
    pub(crate) sigma: Vec<f64>,
    /// For each vertex, its predecessors on shortest paths and the edges used to reach it from
    /// them.
    pub(crate) predecessors: Vec<Vec<Link>>,
}

impl PathDag {
    pub(crate) fn new(
        graph: &Graph,
        source: usize,
        weighting: Weighting,
        direction: Direction,
    ) -> Self {
        let links = graph.links(direction);
        match weighting {
            Weighting::Unweighted => Self::bfs(links, source),
            Weighting::Weighted => Self::dijkstra(graph, links, source),
        }
    }

    fn bfs(links: &[Vec<Link>], source: usize) -> Self {
        let n = links.len();
        let mut dag = Self::empty(n, source);
        let mut distance: Vec<Option<usize>> = vec![None; n];
        let mut queue = VecDeque::new();

        distance[source] = Some(0);
        queue.push_back(source);

        while let Some(v) = queue.pop_front() {
            dag.order.push(v);
            let next = distance[v].map(|d| d + 1);

            for link in &links[v] {
                let w = link.vertex;
                if distance[w].is_none() {
                    distance[w] = next;
                    queue.push_back(w);
                }
                if distance[w] == next {
                    dag.sigma[w] += dag.sigma[v];
                    dag.predecessors[w].push(Link {
                        vertex: v,
                        edge: link.edge,
                    });
                }
            }
        }

        dag
    }

    fn dijkstra(graph: &Graph, links: &[Vec<Link>], source: usize) -> Self {
        let n = links.len();
        let edges = graph.edges();
        let mut dag = Self::empty(n, source);
        let mut distance = vec![UNREACHABLE; n];
        let mut settled = vec![false; n];
        let mut heap = BinaryHeap::new();

        distance[source] = 0.0;
        heap.push(Candidate {
            distance: 0.0,
            vertex: source,
        });

        while let Some(Candidate { vertex: v, .. }) = heap.pop() {
            if settled[v] {
                continue;
            }
            settled[v] = true;
            dag.order.push(v);

            for link in &links[v] {
                let w = link.vertex;
                if w == v || settled[w] {
                    continue;
                }

                let alt = distance[v] + edges[link.edge].cost(Weighting::Weighted);
                if approx_eq(alt, distance[w]) {
                    dag.sigma[w] += dag.sigma[v];
                    dag.predecessors[w].push(Link {
                        vertex: v,
                        edge: link.edge,
                    });
                } else if alt < distance[w] {
                    distance[w] = alt;
                    dag.sigma[w] = dag.sigma[v];
                    dag.predecessors[w].clear();
                    dag.predecessors[w].push(Link {
                        vertex: v,
                        edge: link.edge,
                    });
                    heap.push(Candidate {
                        distance: alt,
                        vertex: w,
                    });
                }
            }
        }

        dag
    }

    fn empty(n: usize, source: usize) -> Self {
        let mut sigma = vec![0.0; n];
        sigma[source] = 1.0;

        Self {
            order: Vec::with_capacity(n),
            sigma,
            predecessors: vec![Vec::new(); n],
        }
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    a.is_finite() && b.is_finite() && (a - b).abs() <= EPSILON * a.abs().max(b.abs()).max(1.0)
}

/// A heap entry, ordered so that `BinaryHeap` pops the smallest distance first.
#[derive(Clone, Copy, Debug)]
struct Candidate {
    distance: f64,
    vertex: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}
