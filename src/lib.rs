//! Netdismantle measures how networks fall apart when their most important pieces are removed.
//!
//! # Basic usage
//!
//! The library is centered around the [`Graph`](graph::Graph) structure which can be constructed
//! from one or more [`Edge`](edge::Edge) instances, from named edge triples or from an adjacency
//! matrix. Once constructed, centrality rankings, connectivity and efficiency of the graph can be
//! computed, and a [`Dismantler`](dismantle::Dismantler) can attack a copy of it while tracing the
//! damage.
//!
//! ```rust
//! use netdismantle::centrality::{compute_centrality, Centrality, Element};
//! use netdismantle::config::Weighting;
//! use netdismantle::dismantle::{run_attack, Strategy};
//! use netdismantle::graph::Graph;
//!
//! // Two triangles bridged by the edge c - d.
//! let graph = Graph::from_named_edges(
//!     [
//!         ("a", "b", None),
//!         ("b", "c", None),
//!         ("c", "a", None),
//!         ("c", "d", None),
//!         ("d", "e", None),
//!         ("e", "f", None),
//!         ("f", "d", None),
//!     ],
//!     false,
//! )
//! .unwrap();
//!
//! // Rank the vertices...
//! let ranking = compute_centrality(&graph, Centrality::Betweenness, Weighting::Unweighted).unwrap();
//! assert_eq!(ranking.first().map(|(e, _)| e), Some(Element::Vertex(2)));
//!
//! // ...look at the structure...
//! assert_eq!(graph.articulation_points(), vec![2, 3]);
//! assert_eq!(graph.largest_component(), 6);
//!
//! // ...and cut the bridge.
//! let trace = run_attack(
//!     &graph,
//!     Strategy::EdgeCentrality(Centrality::EdgeBetweenness),
//!     1,
//!     Weighting::Unweighted,
//!     None,
//! )
//! .unwrap();
//!
//! assert_eq!(trace.removed[0].to_string(), "c -- d");
//! assert_eq!(trace.largest, vec![6, 3]);
//! assert_eq!(trace.second_largest, vec![0, 3]);
//! ```
//!
//! # Logging
//!
//! The crate emits [`tracing`] events: one `debug` event per removal during an attack, `trace`
//! events per power iteration and a `warn` when an iteration fails to converge. Install any
//! subscriber to see them.

mod betweenness;
mod closeness;
mod compute;
mod connectivity;
mod efficiency;
mod spectral;

pub mod centrality;
pub mod config;
pub mod dismantle;
pub mod edge;
pub mod error;
pub mod graph;
pub mod paths;

pub use centrality::{compute_centrality, compute_centrality_with, Centrality, Ranking};
pub use config::{AttackConfig, CentralityConfig, PowerIteration, Weighting};
pub use dismantle::{random_trials, run_attack, AttackTrace, Dismantler, Strategy};
pub use edge::Edge;
pub use error::{Error, Result};
pub use graph::Graph;
