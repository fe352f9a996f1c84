//! A module for working with graphs.

use std::{
    collections::{HashMap, HashSet},
    sync::OnceLock,
};

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::{
    config::Weighting,
    edge::Edge,
    error::{Error, Result},
};

/// A vertex record.
///
/// The `id` is the index the vertex had when the graph was constructed and, unlike its position in
/// the graph, survives the removal of other vertices. The optional `name` is what gets reported in
/// attack traces.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vertex {
    id: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl Vertex {
    /// Returns the stable identifier of the vertex.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the name of the vertex, if it has one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the name of the vertex, falling back to its stable identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use netdismantle::graph::Graph;
    ///
    /// let mut graph = Graph::new(false);
    /// let a = graph.add_vertex(Some("a"));
    /// let b = graph.add_vertex(None::<&str>);
    ///
    /// assert_eq!(graph.vertex(a).label(), "a");
    /// assert_eq!(graph.vertex(b).label(), "1");
    /// ```
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.id.to_string(),
        }
    }
}

/// Which edges to follow when walking out of a vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Follow edges from source to target.
    Outgoing,
    /// Follow edges from target to source.
    Incoming,
    /// Ignore edge direction.
    Both,
}

/// One entry of a neighbour list: the vertex reached and the edge used to reach it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Link {
    pub(crate) vertex: usize,
    pub(crate) edge: usize,
}

/// Neighbour lists derived from the edge list.
#[derive(Clone, Debug, Default)]
pub(crate) struct Adjacency {
    outgoing: Vec<Vec<Link>>,
    incoming: Vec<Vec<Link>>,
    both: Vec<Vec<Link>>,
}

/// A graph with index-addressed vertices and edges.
///
/// Vertex indices are contiguous from 0. Removing a vertex shifts every later index down by one,
/// use [`Vertex::id`] to track a vertex across removals.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "GraphData", into = "GraphData")]
pub struct Graph {
    /// The vertices, position is the vertex index.
    vertices: Vec<Vertex>,
    /// The edges, position is the edge index.
    edges: Vec<Edge>,
    /// Whether edges are directed.
    directed: bool,
    /// The identifier handed to the next added vertex.
    next_id: usize,
    /// Cache the neighbour lists when possible.
    adjacency: OnceLock<Adjacency>,
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.directed == other.directed
            && self.vertices == other.vertices
            && self.edges == other.edges
    }
}

impl Graph {
    /// Creates an empty graph.
    ///
    /// # Examples
    ///
    /// ```
    /// use netdismantle::graph::Graph;
    ///
    /// let graph = Graph::new(false);
    /// assert_eq!(graph.vertex_count(), 0);
    /// ```
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            ..Default::default()
        }
    }

    /// Creates a graph with `vertex_count` unnamed vertices and the given edges.
    ///
    /// # Examples
    ///
    /// ```
    /// use netdismantle::edge::Edge;
    /// use netdismantle::graph::Graph;
    ///
    /// let graph = Graph::from_edges(3, [Edge::new(0, 1), Edge::new(1, 2)], false).unwrap();
    /// assert_eq!(graph.edge_count(), 2);
    ///
    /// // Endpoints must exist.
    /// assert!(Graph::from_edges(2, [Edge::new(0, 2)], false).is_err());
    /// ```
    pub fn from_edges(
        vertex_count: usize,
        edges: impl IntoIterator<Item = Edge>,
        directed: bool,
    ) -> Result<Self> {
        let mut graph = Self::new(directed);
        for _ in 0..vertex_count {
            graph.add_vertex(None::<String>);
        }
        for edge in edges {
            graph.add_edge(edge)?;
        }

        Ok(graph)
    }

    /// Creates a graph from `(source, target, weight)` triples of vertex names.
    ///
    /// Vertices are indexed in order of first appearance, which is how edge lists are usually read.
    ///
    /// # Examples
    ///
    /// ```
    /// use netdismantle::graph::Graph;
    ///
    /// let graph = Graph::from_named_edges([("b", "a", None), ("a", "c", Some(2.0))], false).unwrap();
    ///
    /// assert_eq!(graph.vertex(0).label(), "b");
    /// assert_eq!(graph.vertex(2).label(), "c");
    /// ```
    pub fn from_named_edges<S: AsRef<str>>(
        edges: impl IntoIterator<Item = (S, S, Option<f64>)>,
        directed: bool,
    ) -> Result<Self> {
        let mut graph = Self::new(directed);
        let mut index: HashMap<String, usize> = HashMap::new();

        for (source, target, weight) in edges {
            let mut lookup = |name: &str, graph: &mut Self| match index.get(name) {
                Some(&i) => i,
                None => {
                    let i = graph.add_vertex(Some(name));
                    index.insert(name.to_owned(), i);
                    i
                }
            };

            let s = lookup(source.as_ref(), &mut graph);
            let t = lookup(target.as_ref(), &mut graph);
            let edge = match weight {
                Some(w) => Edge::weighted(s, t, w),
                None => Edge::new(s, t),
            };
            graph.add_edge(edge)?;
        }

        Ok(graph)
    }

    /// Creates a graph from a square dependency matrix weighted by its non-zero entries.
    ///
    /// A non-zero entry `(i, j)` reads as "`i` depends on `j`" and becomes the edge `j → i` in a
    /// directed graph. Undirected graphs get one edge per pair `{i, j}` with a non-zero entry in
    /// either triangle, weighted by `(i, j)` for `i <= j` when that entry is set and by `(j, i)`
    /// otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use nalgebra::dmatrix;
    /// use netdismantle::graph::Graph;
    ///
    /// let matrix = dmatrix![0.0, 1.0, 0.0;
    ///                       1.0, 0.0, 3.0;
    ///                       0.0, 3.0, 0.0];
    /// let graph = Graph::from_adjacency_matrix(&matrix, None, false).unwrap();
    ///
    /// assert_eq!(graph.edge_count(), 2);
    /// assert_eq!(graph.edges()[1].weight(), Some(3.0));
    /// ```
    pub fn from_adjacency_matrix(
        matrix: &DMatrix<f64>,
        names: Option<&[String]>,
        directed: bool,
    ) -> Result<Self> {
        let n = matrix.nrows();
        if matrix.ncols() != n {
            return Err(Error::InvalidConfig(format!(
                "adjacency matrix must be square, got {}x{}",
                n,
                matrix.ncols()
            )));
        }
        if let Some(names) = names {
            if names.len() != n {
                return Err(Error::InvalidConfig(format!(
                    "expected {} vertex names, got {}",
                    n,
                    names.len()
                )));
            }
        }

        let mut graph = Self::new(directed);
        for i in 0..n {
            graph.add_vertex(names.map(|names| names[i].as_str()));
        }

        for i in 0..n {
            if directed {
                for j in 0..n {
                    let w = matrix[(j, i)];
                    if w != 0.0 {
                        graph.add_edge(Edge::weighted(i, j, w))?;
                    }
                }
            } else {
                for j in i..n {
                    let w = match matrix[(i, j)] {
                        w if w != 0.0 => w,
                        _ => matrix[(j, i)],
                    };
                    if w != 0.0 {
                        graph.add_edge(Edge::weighted(i, j, w))?;
                    }
                }
            }
        }

        Ok(graph)
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex<S: Into<String>>(&mut self, name: Option<S>) -> usize {
        self.vertices.push(Vertex {
            id: self.next_id,
            name: name.map(Into::into),
        });
        self.next_id += 1;
        self.clear_cache();

        self.vertices.len() - 1
    }

    /// Adds an edge and returns its index.
    ///
    /// Fails if an endpoint doesn't exist or the weight isn't a finite positive number.
    pub fn add_edge(&mut self, edge: Edge) -> Result<usize> {
        let index = self.edges.len();
        validate_edge(index, &edge, self.vertices.len())?;

        self.edges.push(edge);
        self.clear_cache();

        Ok(index)
    }

    /// Sets the name of the vertex at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn set_name<S: Into<String>>(&mut self, index: usize, name: S) {
        self.vertices[index].name = Some(name.into());
    }

    /// Removes the vertex at `index` along with every edge touching it.
    ///
    /// Later vertices shift down by one index, edges are renumbered accordingly.
    ///
    /// # Examples
    ///
    /// ```
    /// use netdismantle::graph::Graph;
    ///
    /// let mut graph = Graph::from_named_edges([("a", "b", None), ("b", "c", None)], false).unwrap();
    /// let removed = graph.remove_vertex(1);
    ///
    /// assert_eq!(removed.label(), "b");
    /// assert_eq!(graph.vertex_count(), 2);
    /// assert_eq!(graph.edge_count(), 0);
    /// assert_eq!(graph.vertex(1).label(), "c");
    /// ```
    pub fn remove_vertex(&mut self, index: usize) -> Vertex {
        let vertex = self.vertices.remove(index);

        self.edges.retain(|edge| !edge.contains(index));
        for edge in &mut self.edges {
            edge.renumber(index);
        }

        self.clear_cache();

        vertex
    }

    /// Removes the edge at `index`. Later edges shift down by one index.
    pub fn remove_edge(&mut self, index: usize) -> Edge {
        let edge = self.edges.remove(index);
        self.clear_cache();

        edge
    }

    /// Returns the vertex count of the graph.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the edge count of the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns whether the edges are directed.
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the vertex at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn vertex(&self, index: usize) -> &Vertex {
        &self.vertices[index]
    }

    /// Returns the current index of the vertex with the given stable identifier.
    pub fn position_of(&self, id: usize) -> Option<usize> {
        self.vertices.iter().position(|vertex| vertex.id == id)
    }

    /// Returns the index of the vertex with the given name.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.vertices
            .iter()
            .position(|vertex| vertex.name() == Some(name))
    }

    /// Returns the labels of both endpoints of the edge at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn edge_labels(&self, index: usize) -> (String, String) {
        let edge = &self.edges[index];

        (
            self.vertices[edge.source()].label(),
            self.vertices[edge.target()].label(),
        )
    }

    /// Returns the number of edge endpoints at each vertex, regardless of direction. A self-loop
    /// counts twice.
    ///
    /// # Examples
    ///
    /// ```
    /// use netdismantle::edge::Edge;
    /// use netdismantle::graph::Graph;
    ///
    /// let graph = Graph::from_edges(3, [Edge::new(0, 1), Edge::new(0, 2)], false).unwrap();
    /// assert_eq!(graph.degrees(), vec![2, 1, 1]);
    /// ```
    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.vertex_count()];
        for edge in &self.edges {
            degrees[edge.source()] += 1;
            degrees[edge.target()] += 1;
        }

        degrees
    }

    /// Constructs the adjacency matrix for this graph.
    ///
    /// Entry `(i, j)` holds the summed weight of the edges `i → j`, the matrix is symmetric for
    /// undirected graphs.
    ///
    /// # Examples
    ///
    /// ```
    /// use nalgebra::dmatrix;
    /// use netdismantle::config::Weighting;
    /// use netdismantle::edge::Edge;
    /// use netdismantle::graph::Graph;
    ///
    /// let graph = Graph::from_edges(2, [Edge::new(0, 1)], false).unwrap();
    /// assert_eq!(
    ///     graph.adjacency_matrix(Weighting::Unweighted),
    ///     dmatrix![0.0, 1.0;
    ///              1.0, 0.0]
    /// );
    /// ```
    pub fn adjacency_matrix(&self, weighting: Weighting) -> DMatrix<f64> {
        let n = self.vertex_count();
        let mut matrix = DMatrix::<f64>::zeros(n, n);

        for edge in &self.edges {
            let (i, j) = (edge.source(), edge.target());
            let w = edge.cost(weighting);

            matrix[(i, j)] += w;
            if !self.directed && i != j {
                matrix[(j, i)] += w;
            }
        }

        matrix
    }

    /// Returns the subgraph induced by the given vertex indices, keeping their order, names and
    /// identifiers.
    pub fn induced_subgraph(&self, keep: &[usize]) -> Self {
        let mut mapping = vec![None; self.vertex_count()];
        for (new, &old) in keep.iter().enumerate() {
            mapping[old] = Some(new);
        }

        let edges = self
            .edges
            .iter()
            .filter_map(|edge| {
                let s = mapping[edge.source()]?;
                let t = mapping[edge.target()]?;
                Some(match edge.weight() {
                    Some(w) => Edge::weighted(s, t, w),
                    None => Edge::new(s, t),
                })
            })
            .collect();

        Self {
            vertices: keep.iter().map(|&i| self.vertices[i].clone()).collect(),
            edges,
            directed: self.directed,
            next_id: self.next_id,
            adjacency: OnceLock::new(),
        }
    }

    //
    // Crate-private
    //

    /// Returns the neighbour lists for walking in the given direction. Undirected graphs ignore
    /// the direction.
    pub(crate) fn links(&self, direction: Direction) -> &[Vec<Link>] {
        let adjacency = self.adjacency.get_or_init(|| self.build_adjacency());

        if !self.directed {
            return &adjacency.both;
        }

        match direction {
            Direction::Outgoing => &adjacency.outgoing,
            Direction::Incoming => &adjacency.incoming,
            Direction::Both => &adjacency.both,
        }
    }

    /// The direction shortest paths follow by default: along the edges for directed graphs.
    pub(crate) fn path_direction(&self) -> Direction {
        if self.directed {
            Direction::Outgoing
        } else {
            Direction::Both
        }
    }

    //
    // Private
    //

    /// Clears the computed state.
    ///
    /// This should be called every time the vertices or edges are mutated since the cached state
    /// won't correspond to the new graph.
    fn clear_cache(&mut self) {
        self.adjacency.take();
    }

    fn build_adjacency(&self) -> Adjacency {
        let n = self.vertex_count();
        let mut both = vec![Vec::new(); n];
        let (mut outgoing, mut incoming) = if self.directed {
            (vec![Vec::new(); n], vec![Vec::new(); n])
        } else {
            (Vec::new(), Vec::new())
        };

        for (e, edge) in self.edges.iter().enumerate() {
            let (s, t) = (edge.source(), edge.target());

            both[s].push(Link { vertex: t, edge: e });
            if s != t {
                both[t].push(Link { vertex: s, edge: e });
            }

            if self.directed {
                outgoing[s].push(Link { vertex: t, edge: e });
                incoming[t].push(Link { vertex: s, edge: e });
            }
        }

        Adjacency {
            outgoing,
            incoming,
            both,
        }
    }
}

//
// Helpers
//

fn validate_edge(index: usize, edge: &Edge, vertex_count: usize) -> Result<()> {
    for endpoint in [edge.source(), edge.target()] {
        if endpoint >= vertex_count {
            return Err(Error::EdgeOutOfRange {
                edge: index,
                endpoint,
                vertex_count,
            });
        }
    }

    if let Some(weight) = edge.weight() {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(Error::InvalidWeight {
                edge: index,
                weight,
            });
        }
    }

    Ok(())
}

/// The serialized form of a [`Graph`], validated on the way in.
#[derive(Serialize, Deserialize)]
struct GraphData {
    #[serde(default)]
    directed: bool,
    vertices: Vec<Vertex>,
    #[serde(default)]
    edges: Vec<Edge>,
}

impl TryFrom<GraphData> for Graph {
    type Error = Error;

    fn try_from(data: GraphData) -> Result<Self> {
        let mut seen = HashSet::with_capacity(data.vertices.len());
        if let Some(vertex) = data.vertices.iter().find(|vertex| !seen.insert(vertex.id)) {
            return Err(Error::DuplicateVertexId { id: vertex.id });
        }

        for (i, edge) in data.edges.iter().enumerate() {
            validate_edge(i, edge, data.vertices.len())?;
        }

        let next_id = data
            .vertices
            .iter()
            .map(|vertex| vertex.id + 1)
            .max()
            .unwrap_or(0);

        Ok(Self {
            vertices: data.vertices,
            edges: data.edges,
            directed: data.directed,
            next_id,
            adjacency: OnceLock::new(),
        })
    }
}

impl From<Graph> for GraphData {
    fn from(graph: Graph) -> Self {
        Self {
            directed: graph.directed,
            vertices: graph.vertices,
            edges: graph.edges,
        }
    }
}
