//! Independent replications of one shop configuration.
//!
//! Replication `i` runs with seed `config.seed + i` on its own engine and
//! random stream, so results do not depend on whether replications run
//! sequentially or on a rayon pool.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::ShopConfig;
use super::errors::SimError;
use super::simulation_engine::{SimulationEngine, SimulationReport};

/// Enumeration of supported concurrency modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConcurrencyMode {
    /// Replications run one after another on the calling thread
    #[default]
    Sequential,
    /// Replications are spread over a Rayon thread pool
    Rayon,
}

/// Configuration for replication execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplicationConfig {
    pub concurrency_mode: ConcurrencyMode,
    /// Size of a dedicated pool; `None` uses rayon's global pool.
    /// Only relevant when `concurrency_mode` is `Rayon`
    pub thread_pool_size: Option<usize>,
}

impl ReplicationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }

    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }
}

fn run_one(config: &ShopConfig, index: usize) -> Result<SimulationReport, SimError> {
    let seed = config.seed.wrapping_add(index as u64);
    let mut engine = SimulationEngine::new(config.clone().with_seed(seed))?;
    engine.run()
}

/// Run `replications` independent runs; reports come back in replication order
pub fn run_replications(
    config: &ShopConfig,
    replications: usize,
    options: &ReplicationConfig,
) -> Result<Vec<SimulationReport>, SimError> {
    config.validate()?;

    match options.concurrency_mode {
        ConcurrencyMode::Sequential => (0..replications).map(|i| run_one(config, i)).collect(),
        ConcurrencyMode::Rayon => {
            let run_all = || {
                (0..replications)
                    .into_par_iter()
                    .map(|i| run_one(config, i))
                    .collect::<Result<Vec<_>, SimError>>()
            };
            match options.thread_pool_size {
                Some(size) => {
                    let pool = rayon::ThreadPoolBuilder::new()
                        .num_threads(size)
                        .build()
                        .map_err(|e| SimError::ThreadPool(e.to_string()))?;
                    pool.install(run_all)
                }
                None => run_all(),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl MetricSummary {
    fn from_values(values: impl Iterator<Item = f64>) -> Self {
        let mut count = 0usize;
        let mut total = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in values {
            count += 1;
            total += value;
            min = min.min(value);
            max = max.max(value);
        }
        if count == 0 {
            return Self::default();
        }
        Self {
            mean: total / count as f64,
            min,
            max,
        }
    }
}

/// Cross-replication view of the headline KPIs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplicationSummary {
    pub replications: usize,
    pub total_tardiness: MetricSummary,
    pub makespan: MetricSummary,
    pub average_utilization: MetricSummary,
    pub completed: MetricSummary,
}

impl ReplicationSummary {
    pub fn from_reports(reports: &[SimulationReport]) -> Self {
        Self {
            replications: reports.len(),
            total_tardiness: MetricSummary::from_values(reports.iter().map(|r| r.total_tardiness)),
            makespan: MetricSummary::from_values(reports.iter().map(|r| r.makespan)),
            average_utilization: MetricSummary::from_values(
                reports.iter().map(|r| r.statistics.average_utilization),
            ),
            completed: MetricSummary::from_values(reports.iter().map(|r| r.completed.len() as f64)),
        }
    }
}
