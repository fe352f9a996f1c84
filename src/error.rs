//! Errors reported by graph construction and the analysis routines.

use crate::centrality::Centrality;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong when building or analysing a graph.
///
/// Degenerate inputs (empty graphs, single vertices, graphs without edges) are not errors, the
/// routines return the documented degenerate values for them instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// An edge references a vertex that doesn't exist.
    #[error("edge {edge} references vertex {endpoint} but the graph only has {vertex_count} vertices")]
    EdgeOutOfRange {
        edge: usize,
        endpoint: usize,
        vertex_count: usize,
    },

    /// Two vertices of a deserialized graph share the same identifier.
    #[error("vertex id {id} appears more than once")]
    DuplicateVertexId { id: usize },

    /// An edge weight is zero, negative or not finite.
    #[error("edge {edge} has weight {weight}, weights must be finite and strictly positive")]
    InvalidWeight { edge: usize, weight: f64 },

    /// Power iteration didn't reach the tolerance within the iteration budget.
    #[error("{measure} did not converge after {iterations} iterations")]
    NotConverged {
        measure: Centrality,
        iterations: usize,
    },

    /// A vertex measure was used to rank edges, or the other way around.
    #[error("{measure} cannot rank {target}")]
    IncompatibleMeasure {
        measure: Centrality,
        target: &'static str,
    },

    /// A configuration value is out of its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
