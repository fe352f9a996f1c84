//! Connected components and articulation points.
//!
//! Both ignore edge direction: components are the weakly connected ones on directed graphs.

use std::collections::VecDeque;

use tracing::instrument;

use crate::graph::{Direction, Graph};

const UNVISITED: usize = usize::MAX;

impl Graph {
    /// Partitions the vertices into connected components.
    ///
    /// Components are listed by their smallest vertex, vertices within a component in BFS order.
    ///
    /// # Examples
    ///
    /// ```
    /// use netdismantle::edge::Edge;
    /// use netdismantle::graph::Graph;
    ///
    /// let graph = Graph::from_edges(5, [Edge::new(0, 3), Edge::new(1, 2)], false).unwrap();
    /// assert_eq!(graph.components(), vec![vec![0, 3], vec![1, 2], vec![4]]);
    /// ```
    pub fn components(&self) -> Vec<Vec<usize>> {
        let links = self.links(Direction::Both);
        let mut seen = vec![false; self.vertex_count()];
        let mut components = Vec::new();
        let mut queue = VecDeque::new();

        for root in 0..self.vertex_count() {
            if seen[root] {
                continue;
            }

            let mut component = Vec::new();
            seen[root] = true;
            queue.push_back(root);

            while let Some(v) = queue.pop_front() {
                component.push(v);
                for link in &links[v] {
                    if !seen[link.vertex] {
                        seen[link.vertex] = true;
                        queue.push_back(link.vertex);
                    }
                }
            }

            components.push(component);
        }

        components
    }

    /// Returns the component sizes, largest first.
    pub fn component_sizes(&self) -> Vec<usize> {
        let mut sizes: Vec<usize> = self.components().iter().map(Vec::len).collect();
        sizes.sort_unstable_by(|a, b| b.cmp(a));

        sizes
    }

    /// Returns the size of the largest connected component, 0 for an empty graph.
    pub fn largest_component(&self) -> usize {
        self.component_sizes().first().copied().unwrap_or(0)
    }

    /// Returns the size of the second-largest connected component, 0 if there is only one.
    pub fn second_largest_component(&self) -> usize {
        self.component_sizes().get(1).copied().unwrap_or(0)
    }

    /// Returns the subgraph induced by the largest connected component. Ties go to the component
    /// containing the smallest vertex index.
    pub fn giant_component(&self) -> Graph {
        let components = self.components();
        let mut giant: Option<&Vec<usize>> = None;
        for component in &components {
            if giant.map_or(true, |g| component.len() > g.len()) {
                giant = Some(component);
            }
        }

        match giant {
            Some(component) => {
                let mut keep = component.clone();
                keep.sort_unstable();
                self.induced_subgraph(&keep)
            }
            None => Graph::new(self.is_directed()),
        }
    }

    /// Finds the articulation points: vertices whose removal splits their component.
    ///
    /// This is Tarjan's low-link depth-first search, run iteratively from every unvisited vertex
    /// in index order. The points are returned in the order the search discovered them.
    ///
    /// # Examples
    ///
    /// ```
    /// use netdismantle::edge::Edge;
    /// use netdismantle::graph::Graph;
    ///
    /// // 0 - 1 - 2 - 3 - 4
    /// let graph = Graph::from_edges(5, (1..5).map(|i| Edge::new(i - 1, i)), false).unwrap();
    /// assert_eq!(graph.articulation_points(), vec![1, 2, 3]);
    /// ```
    #[instrument(skip(self), fields(vertices = self.vertex_count()))]
    pub fn articulation_points(&self) -> Vec<usize> {
        let n = self.vertex_count();
        let links = self.links(Direction::Both);

        let mut discovery = vec![UNVISITED; n];
        let mut low = vec![UNVISITED; n];
        // The edge each vertex was reached through, so parallel edges still count as cycles.
        let mut parent_edge = vec![UNVISITED; n];
        let mut is_cut = vec![false; n];
        let mut time = 0;

        // (vertex, position in its neighbour list)
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in 0..n {
            if discovery[root] != UNVISITED {
                continue;
            }

            discovery[root] = time;
            low[root] = time;
            time += 1;
            let mut root_children = 0;
            stack.push((root, 0));

            while let Some(&(u, next)) = stack.last() {
                if let Some(link) = links[u].get(next) {
                    if let Some(top) = stack.last_mut() {
                        top.1 += 1;
                    }

                    let w = link.vertex;
                    if w == u || link.edge == parent_edge[u] {
                        continue;
                    }

                    if discovery[w] == UNVISITED {
                        discovery[w] = time;
                        low[w] = time;
                        time += 1;
                        parent_edge[w] = link.edge;
                        if u == root {
                            root_children += 1;
                        }
                        stack.push((w, 0));
                    } else {
                        low[u] = low[u].min(discovery[w]);
                    }
                } else {
                    stack.pop();
                    if let Some(&(parent, _)) = stack.last() {
                        low[parent] = low[parent].min(low[u]);
                        if parent != root && low[u] >= discovery[parent] {
                            is_cut[parent] = true;
                        }
                    }
                }
            }

            if root_children > 1 {
                is_cut[root] = true;
            }
        }

        let mut points: Vec<usize> = (0..n).filter(|&v| is_cut[v]).collect();
        points.sort_unstable_by_key(|&v| discovery[v]);

        points
    }
}
