//! Configuration for the centrality computations and the dismantling simulator.
//!
//! Every struct deserializes with missing fields filled from [`Default`], so a partial JSON or TOML
//! document is enough to override a single knob.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Lower bound on worker threads.
pub const MIN_NUM_THREADS: usize = 1;
/// Upper bound on worker threads.
pub const MAX_NUM_THREADS: usize = 128;

/// Selects whether edge weights take part in a computation.
///
/// When weighted, shortest paths treat weights as distances while eigenvector centrality and
/// PageRank treat them as connection strengths. Edges without a weight count as 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    #[default]
    Unweighted,
    Weighted,
}

/// Stopping rule for power iteration.
///
/// Iteration stops once the L1 norm of the change between two iterates drops below
/// `vertex_count * tolerance`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerIteration {
    /// Default: 1000.
    pub max_iter: usize,
    /// Default: 1e-8.
    pub tolerance: f64,
}

impl Default for PowerIteration {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
        }
    }
}

/// Knobs shared by all centrality measures.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CentralityConfig {
    pub weighting: Weighting,
    pub power: PowerIteration,
    /// PageRank damping factor. Default: 0.85.
    pub damping: f64,
    /// Worker threads used for the all-sources computations (betweenness, closeness, efficiency).
    /// Clamped to `[MIN_NUM_THREADS, MAX_NUM_THREADS]`.
    pub num_threads: usize,
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            weighting: Weighting::default(),
            power: PowerIteration::default(),
            damping: 0.85,
            num_threads: default_num_threads(),
        }
    }
}

impl CentralityConfig {
    /// Default configuration with the given weighting.
    pub fn weighted(weighting: Weighting) -> Self {
        Self {
            weighting,
            ..Default::default()
        }
    }

    /// Checks that every value is in range.
    ///
    /// # Examples
    ///
    /// ```
    /// use netdismantle::config::CentralityConfig;
    ///
    /// assert!(CentralityConfig::default().validate().is_ok());
    ///
    /// let config = CentralityConfig { damping: 1.0, ..Default::default() };
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.damping) {
            return Err(Error::InvalidConfig(format!(
                "damping must be in [0, 1), got {}",
                self.damping
            )));
        }
        if self.power.max_iter == 0 {
            return Err(Error::InvalidConfig("max_iter must be at least 1".into()));
        }
        if !(self.power.tolerance > 0.0 && self.power.tolerance.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "tolerance must be finite and positive, got {}",
                self.power.tolerance
            )));
        }

        Ok(())
    }

    pub(crate) fn threads(&self) -> usize {
        self.num_threads.clamp(MIN_NUM_THREADS, MAX_NUM_THREADS)
    }
}

/// Configuration of a dismantling run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    /// Used both to rank victims and to measure efficiency after each removal.
    pub centrality: CentralityConfig,
    /// Seed for the random strategies, drawn from the OS when absent.
    pub seed: Option<u64>,
}

impl AttackConfig {
    pub fn weighting(&self) -> Weighting {
        self.centrality.weighting
    }
}

fn default_num_threads() -> usize {
    std::thread::available_parallelism()
        .map(usize::from)
        .unwrap_or(MIN_NUM_THREADS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CentralityConfig::default();

        assert_eq!(config.weighting, Weighting::Unweighted);
        assert_eq!(config.damping, 0.85);
        assert_eq!(config.power.max_iter, 1000);
        assert_eq!(config.power.tolerance, 1e-8);
        assert!(config.threads() >= MIN_NUM_THREADS);
    }

    #[test]
    fn threads_are_clamped() {
        let none = CentralityConfig {
            num_threads: 0,
            ..Default::default()
        };
        let many = CentralityConfig {
            num_threads: 10_000,
            ..Default::default()
        };

        assert_eq!(none.threads(), MIN_NUM_THREADS);
        assert_eq!(many.threads(), MAX_NUM_THREADS);
    }

    #[test]
    fn validate_rejects_out_of_range() {
        let bad = [
            CentralityConfig {
                damping: -0.1,
                ..Default::default()
            },
            CentralityConfig {
                power: PowerIteration {
                    max_iter: 0,
                    tolerance: 1e-8,
                },
                ..Default::default()
            },
            CentralityConfig {
                power: PowerIteration {
                    max_iter: 10,
                    tolerance: 0.0,
                },
                ..Default::default()
            },
        ];

        for config in bad {
            assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        }
    }
}
