//! A module for working with edges.

use serde::{Deserialize, Serialize};

use crate::config::Weighting;

/// A connection between two vertex indices, optionally carrying a weight.
///
/// Whether the edge is directed is a property of the [`Graph`](crate::graph::Graph) holding it, the
/// `source`-`target` naming only matters for directed graphs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    source: usize,
    target: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weight: Option<f64>,
}

impl Edge {
    /// Creates a new unweighted edge between two vertex indices.
    ///
    /// # Examples
    ///
    /// ```
    /// use netdismantle::edge::Edge;
    ///
    /// let edge = Edge::new(0, 1);
    /// assert_eq!(edge.weight(), None);
    /// ```
    pub fn new(source: usize, target: usize) -> Self {
        Self {
            source,
            target,
            weight: None,
        }
    }

    /// Creates a new weighted edge. The weight is validated when the edge is added to a graph.
    ///
    /// # Examples
    ///
    /// ```
    /// use netdismantle::edge::Edge;
    ///
    /// let edge = Edge::weighted(0, 1, 2.5);
    /// assert_eq!(edge.weight(), Some(2.5));
    /// ```
    pub fn weighted(source: usize, target: usize, weight: f64) -> Self {
        Self {
            source,
            target,
            weight: Some(weight),
        }
    }

    /// Returns the index of the first vertex forming the edge.
    pub fn source(&self) -> usize {
        self.source
    }

    /// Returns the index of the second vertex forming the edge.
    pub fn target(&self) -> usize {
        self.target
    }

    /// Returns the weight, if one was given.
    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    /// Returns whether the edge touches the given vertex.
    ///
    /// # Examples
    ///
    /// ```
    /// use netdismantle::edge::Edge;
    ///
    /// let edge = Edge::new(0, 1);
    ///
    /// assert_eq!(edge.contains(0), true);
    /// assert_eq!(edge.contains(1), true);
    /// assert_eq!(edge.contains(2), false);
    /// ```
    pub fn contains(&self, vertex: usize) -> bool {
        self.source == vertex || self.target == vertex
    }

    /// Returns whether both ends of the edge are the same vertex.
    pub fn is_loop(&self) -> bool {
        self.source == self.target
    }

    /// The weight used by a computation, absent weights count as 1.
    pub(crate) fn cost(&self, weighting: Weighting) -> f64 {
        match weighting {
            Weighting::Unweighted => 1.0,
            Weighting::Weighted => self.weight.unwrap_or(1.0),
        }
    }

    /// Shifts the endpoints down to account for the removal of vertex `removed`.
    ///
    /// Must not be called on an edge touching `removed`.
    pub(crate) fn renumber(&mut self, removed: usize) {
        debug_assert!(!self.contains(removed));

        if self.source > removed {
            self.source -= 1;
        }
        if self.target > removed {
            self.target -= 1;
        }
    }
}
