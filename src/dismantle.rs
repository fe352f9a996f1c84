//! Network dismantling: repeatedly remove a vertex or edge and watch connectivity degrade.
//!
//! A run works on a private copy of the graph. Before the first removal and after every removal it
//! records the size of the largest and second-largest connected components and the global
//! efficiency, so every series has one entry more than there were removals.
//!
//! References:
//! - Holme, P., Kim, B. J., Yoon, C. N., Han, S. K. (2002). Attack vulnerability of complex
//!   networks. Phys. Rev. E 65, 056109.
//! - Bellingeri, M., Bevacqua, D., Scotognella, F. et al. (2020). A comparative analysis of link
//!   removal strategies in real complex weighted networks. Sci Rep 10, 3911.
//! - Tian, L., Bashan, A., Shi, D. N. et al. (2017). Articulation points in complex networks.
//!   Nat Commun 8, 14223.

use std::{collections::VecDeque, fmt};

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    centrality::{compute_centrality_with, Centrality, Element, Target},
    compute::fold_sources,
    config::{AttackConfig, CentralityConfig, Weighting},
    efficiency::compute_efficiency,
    error::{Error, Result},
    graph::Graph,
};

/// How the next victim is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Remove the highest ranked vertex, re-ranking after every removal.
    NodeCentrality(Centrality),
    /// Remove the highest ranked edge, re-ranking after every removal.
    EdgeCentrality(Centrality),
    /// Remove a uniformly chosen vertex.
    NodeRandom,
    /// Remove a uniformly chosen edge.
    EdgeRandom,
    /// Remove the articulation points of the initial graph in discovery order. They are not
    /// recomputed as the graph changes.
    ArticulationPoint,
}

impl Strategy {
    /// Returns what the strategy removes.
    pub fn target(self) -> Target {
        match self {
            Strategy::NodeCentrality(_) | Strategy::NodeRandom | Strategy::ArticulationPoint => {
                Target::Vertices
            }
            Strategy::EdgeCentrality(_) | Strategy::EdgeRandom => Target::Edges,
        }
    }

    /// Returns the measure a targeted strategy ranks by.
    pub fn measure(self) -> Option<Centrality> {
        match self {
            Strategy::NodeCentrality(measure) | Strategy::EdgeCentrality(measure) => Some(measure),
            _ => None,
        }
    }

    /// Checks that a targeted strategy ranks the kind of element it removes.
    pub fn validate(self) -> Result<()> {
        match self.measure() {
            Some(measure) if measure.target() != self.target() => Err(Error::IncompatibleMeasure {
                measure,
                target: match self.target() {
                    Target::Vertices => "vertices",
                    Target::Edges => "edges",
                },
            }),
            _ => Ok(()),
        }
    }

    /// Builds the victim selector for a run starting from `graph`.
    pub fn selector(self, graph: &Graph, config: &AttackConfig) -> Result<Box<dyn VictimSelector>> {
        self.validate()?;

        Ok(match self {
            Strategy::NodeCentrality(measure) | Strategy::EdgeCentrality(measure) => {
                Box::new(CentralityTarget::new(measure, config.centrality))
            }
            Strategy::NodeRandom => Box::new(RandomTarget::new(Target::Vertices, config.seed)),
            Strategy::EdgeRandom => Box::new(RandomTarget::new(Target::Edges, config.seed)),
            Strategy::ArticulationPoint => Box::new(ArticulationTarget::new(graph)),
        })
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::NodeCentrality(measure) => write!(f, "node attack by {measure}"),
            Strategy::EdgeCentrality(measure) => write!(f, "edge attack by {measure}"),
            Strategy::NodeRandom => f.write_str("random node attack"),
            Strategy::EdgeRandom => f.write_str("random edge attack"),
            Strategy::ArticulationPoint => f.write_str("articulation point attack"),
        }
    }
}

/// An element picked for removal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Victim {
    pub element: Element,
    /// The centrality score that got the element picked, for ranked choices.
    pub score: Option<f64>,
}

/// The capability shared by all strategies: pick the next element to remove.
pub trait VictimSelector {
    /// How many elements the selector can remove from `graph` in total.
    fn capacity(&self, graph: &Graph) -> usize;

    /// Picks the next victim from the current state of the graph, `None` once nothing is left.
    fn select(&mut self, graph: &Graph) -> Result<Option<Victim>>;
}

/// Ranks the current graph and takes the top element.
pub struct CentralityTarget {
    measure: Centrality,
    config: CentralityConfig,
}

impl CentralityTarget {
    pub fn new(measure: Centrality, config: CentralityConfig) -> Self {
        Self { measure, config }
    }
}

impl VictimSelector for CentralityTarget {
    fn capacity(&self, graph: &Graph) -> usize {
        match self.measure.target() {
            Target::Vertices => graph.vertex_count(),
            Target::Edges => graph.edge_count(),
        }
    }

    fn select(&mut self, graph: &Graph) -> Result<Option<Victim>> {
        let ranking = compute_centrality_with(graph, self.measure, &self.config)?;

        Ok(ranking.first().map(|(element, score)| Victim {
            element,
            score: Some(score),
        }))
    }
}

/// Picks uniformly among the remaining vertices or edges.
pub struct RandomTarget {
    target: Target,
    rng: StdRng,
}

impl RandomTarget {
    /// Seeds from the OS when no seed is given.
    pub fn new(target: Target, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self { target, rng }
    }
}

impl VictimSelector for RandomTarget {
    fn capacity(&self, graph: &Graph) -> usize {
        match self.target {
            Target::Vertices => graph.vertex_count(),
            Target::Edges => graph.edge_count(),
        }
    }

    fn select(&mut self, graph: &Graph) -> Result<Option<Victim>> {
        let remaining = self.capacity(graph);
        if remaining == 0 {
            return Ok(None);
        }

        let index = self.rng.gen_range(0..remaining);
        let element = match self.target {
            Target::Vertices => Element::Vertex(index),
            Target::Edges => Element::Edge(index),
        };

        Ok(Some(Victim {
            element,
            score: None,
        }))
    }
}

/// Replays the articulation points of the initial graph.
pub struct ArticulationTarget {
    /// Stable vertex identifiers, in discovery order.
    pending: VecDeque<usize>,
}

impl ArticulationTarget {
    pub fn new(graph: &Graph) -> Self {
        let pending = graph
            .articulation_points()
            .into_iter()
            .map(|v| graph.vertex(v).id())
            .collect();

        Self { pending }
    }
}

impl VictimSelector for ArticulationTarget {
    fn capacity(&self, _graph: &Graph) -> usize {
        self.pending.len()
    }

    fn select(&mut self, graph: &Graph) -> Result<Option<Victim>> {
        while let Some(id) = self.pending.pop_front() {
            // Indices shift as vertices go, the identifier doesn't.
            if let Some(index) = graph.position_of(id) {
                return Ok(Some(Victim {
                    element: Element::Vertex(index),
                    score: None,
                }));
            }
        }

        Ok(None)
    }
}

/// A removed element, by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Removed {
    Vertex(String),
    /// The labels of the source and target vertices.
    Edge(String, String),
}

impl fmt::Display for Removed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Removed::Vertex(name) => f.write_str(name),
            Removed::Edge(source, target) => write!(f, "{source} -- {target}"),
        }
    }
}

/// The record of one dismantling run.
///
/// `largest`, `second_largest` and `efficiency` hold the baseline at index 0 followed by one entry
/// per removal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttackTrace {
    pub strategy: Strategy,
    pub weighting: Weighting,
    /// Removed elements, in removal order.
    pub removed: Vec<Removed>,
    /// Size of the largest connected component.
    pub largest: Vec<usize>,
    /// Size of the second-largest connected component.
    pub second_largest: Vec<usize>,
    /// Global efficiency.
    pub efficiency: Vec<f64>,
    /// Score of each removed element, for centrality strategies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<Vec<f64>>,
}

impl AttackTrace {
    fn baseline(strategy: Strategy, weighting: Weighting) -> Self {
        Self {
            strategy,
            weighting,
            removed: Vec::new(),
            largest: Vec::new(),
            second_largest: Vec::new(),
            efficiency: Vec::new(),
            scores: strategy.measure().map(|_| Vec::new()),
        }
    }

    /// Returns the number of removals.
    pub fn len(&self) -> usize {
        self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }

    fn measure(&mut self, graph: &Graph, num_threads: usize) {
        let sizes = graph.component_sizes();

        self.largest.push(sizes.first().copied().unwrap_or(0));
        self.second_largest.push(sizes.get(1).copied().unwrap_or(0));
        self.efficiency
            .push(compute_efficiency(graph, self.weighting, num_threads));
    }
}

/// The outcome of a run: the trace and what's left of the graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Attack {
    pub residual: Graph,
    pub trace: AttackTrace,
}

/// Runs attacks against a graph it never mutates.
#[derive(Clone, Debug)]
pub struct Dismantler<'a> {
    graph: &'a Graph,
    config: AttackConfig,
}

impl<'a> Dismantler<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        Self::with_config(graph, AttackConfig::default())
    }

    pub fn with_config(graph: &'a Graph, config: AttackConfig) -> Self {
        Self { graph, config }
    }

    /// Removes up to `n` elements with the given strategy.
    ///
    /// The budget is clamped to `[1, removable]` where `removable` is the number of vertices,
    /// edges or initial articulation points the strategy could remove. A graph with nothing to
    /// remove yields a trace holding only the baseline.
    ///
    /// # Examples
    ///
    /// ```
    /// use netdismantle::centrality::Centrality;
    /// use netdismantle::dismantle::{Dismantler, Removed, Strategy};
    /// use netdismantle::graph::Graph;
    ///
    /// let graph = Graph::from_named_edges(
    ///     [("hub", "a", None), ("hub", "b", None), ("hub", "c", None)],
    ///     false,
    /// )
    /// .unwrap();
    ///
    /// let attack = Dismantler::new(&graph)
    ///     .attack(Strategy::NodeCentrality(Centrality::Degree), 1)
    ///     .unwrap();
    ///
    /// assert_eq!(attack.trace.removed, vec![Removed::Vertex("hub".into())]);
    /// assert_eq!(attack.trace.largest, vec![4, 1]);
    /// assert_eq!(attack.residual.edge_count(), 0);
    /// ```
    #[instrument(skip(self), fields(vertices = self.graph.vertex_count(), edges = self.graph.edge_count()))]
    pub fn attack(&self, strategy: Strategy, n: usize) -> Result<Attack> {
        self.config.centrality.validate()?;

        let mut residual = self.graph.clone();
        let mut selector = strategy.selector(&residual, &self.config)?;
        self.run(strategy, selector.as_mut(), &mut residual, n)
            .map(|trace| Attack { residual, trace })
    }

    /// Drives a custom selector. The trace is labelled with `strategy`.
    pub fn attack_with(
        &self,
        strategy: Strategy,
        selector: &mut dyn VictimSelector,
        n: usize,
    ) -> Result<Attack> {
        self.config.centrality.validate()?;

        let mut residual = self.graph.clone();
        self.run(strategy, selector, &mut residual, n)
            .map(|trace| Attack { residual, trace })
    }

    fn run(
        &self,
        strategy: Strategy,
        selector: &mut dyn VictimSelector,
        residual: &mut Graph,
        n: usize,
    ) -> Result<AttackTrace> {
        let threads = self.config.centrality.threads();
        let removable = selector.capacity(residual);
        let budget = n.max(1).min(removable);

        let mut trace = AttackTrace::baseline(strategy, self.config.weighting());
        trace.measure(residual, threads);

        for step in 1..=budget {
            let Some(victim) = selector.select(residual)? else {
                debug!(step, "nothing left to remove");
                break;
            };

            let removed = remove(residual, victim.element);
            if let (Some(scores), Some(score)) = (trace.scores.as_mut(), victim.score) {
                scores.push(score);
            }
            trace.measure(residual, threads);

            debug!(
                step,
                victim = %removed,
                score = victim.score,
                largest = trace.largest[step],
                efficiency = trace.efficiency[step],
                "removed"
            );
            trace.removed.push(removed);
        }

        Ok(trace)
    }
}

fn remove(graph: &mut Graph, element: Element) -> Removed {
    match element {
        Element::Vertex(v) => Removed::Vertex(graph.remove_vertex(v).label()),
        Element::Edge(e) => {
            let (source, target) = graph.edge_labels(e);
            graph.remove_edge(e);
            Removed::Edge(source, target)
        }
    }
}

/// Runs a single attack and returns its trace.
///
/// # Examples
///
/// ```
/// use netdismantle::config::Weighting;
/// use netdismantle::dismantle::{run_attack, Strategy};
/// use netdismantle::edge::Edge;
/// use netdismantle::graph::Graph;
///
/// let graph = Graph::from_edges(4, [Edge::new(0, 1), Edge::new(1, 2), Edge::new(2, 3)], false).unwrap();
///
/// let a = run_attack(&graph, Strategy::EdgeRandom, 2, Weighting::Unweighted, Some(7)).unwrap();
/// let b = run_attack(&graph, Strategy::EdgeRandom, 2, Weighting::Unweighted, Some(7)).unwrap();
///
/// assert_eq!(a, b);
/// assert_eq!(a.efficiency.len(), 3);
/// ```
pub fn run_attack(
    graph: &Graph,
    strategy: Strategy,
    n: usize,
    weighting: Weighting,
    seed: Option<u64>,
) -> Result<AttackTrace> {
    let config = AttackConfig {
        centrality: CentralityConfig::weighted(weighting),
        seed,
    };

    Dismantler::with_config(graph, config)
        .attack(strategy, n)
        .map(|attack| attack.trace)
}

/// Per-step mean and population standard deviation of a series over many trials.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub mean: Vec<f64>,
    pub std_dev: Vec<f64>,
}

impl SeriesStats {
    fn from_runs(runs: impl Iterator<Item = Vec<f64>>) -> Self {
        let runs: Vec<Vec<f64>> = runs.collect();
        let steps = runs.iter().map(Vec::len).max().unwrap_or(0);
        let mut stats = Self::default();

        for step in 0..steps {
            let values: Vec<f64> = runs.iter().filter_map(|run| run.get(step).copied()).collect();
            let count = values.len() as f64;
            let mean = values.iter().sum::<f64>() / count;
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;

            stats.mean.push(mean);
            stats.std_dev.push(variance.sqrt());
        }

        stats
    }
}

/// Averages of repeated attacks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialSummary {
    pub strategy: Strategy,
    pub trials: usize,
    pub largest: SeriesStats,
    pub second_largest: SeriesStats,
    pub efficiency: SeriesStats,
}

/// Repeats an attack `trials` times on independent copies of the graph and summarizes the series.
///
/// Trial `t` is seeded with `seed + t` (the base seed is drawn from the OS when the config has
/// none), so a seeded summary is reproducible. Trials run in parallel on
/// `config.centrality.num_threads` workers, each trial itself is single-threaded.
#[instrument(skip(graph, config), fields(vertices = graph.vertex_count()))]
pub fn random_trials(
    graph: &Graph,
    strategy: Strategy,
    n: usize,
    trials: usize,
    config: &AttackConfig,
) -> Result<TrialSummary> {
    if trials == 0 {
        return Err(Error::InvalidConfig("trials must be at least 1".into()));
    }
    strategy.validate()?;
    config.centrality.validate()?;

    let base_seed = config.seed.unwrap_or_else(rand::random);
    let trial_config = |t: usize| AttackConfig {
        centrality: CentralityConfig {
            num_threads: 1,
            ..config.centrality
        },
        seed: Some(base_seed.wrapping_add(t as u64)),
    };

    let traces: Vec<AttackTrace> = fold_sources(
        trials,
        config.centrality.threads(),
        Vec::new,
        |t, traces| {
            traces.push(
                Dismantler::with_config(graph, trial_config(t))
                    .attack(strategy, n)
                    .map(|attack| attack.trace),
            )
        },
    )
    .into_iter()
    .flatten()
    .collect::<Result<_>>()?;

    let as_f64 = |series: &[usize]| series.iter().map(|&v| v as f64).collect::<Vec<f64>>();

    Ok(TrialSummary {
        strategy,
        trials,
        largest: SeriesStats::from_runs(traces.iter().map(|t| as_f64(&t.largest))),
        second_largest: SeriesStats::from_runs(traces.iter().map(|t| as_f64(&t.second_largest))),
        efficiency: SeriesStats::from_runs(traces.iter().map(|t| t.efficiency.clone())),
    })
}
