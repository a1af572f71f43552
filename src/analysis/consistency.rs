//! Repeatability of elasticity estimates across independent trials.

use super::config::ElasticityConfig;
use super::elasticity::{check_improvement, run_elasticity_analysis, TrainableStat};
use super::error::AnalysisError;
use crate::templates::TeamTemplate;
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Spread of one stat's elasticity over several trials.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsistencySummary {
    pub stat: TrainableStat,
    /// Elasticity of every trial, in trial order.
    pub values: Vec<f64>,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl ConsistencySummary {
    fn from_values(stat: TrainableStat, values: Vec<f64>) -> Self {
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            stat,
            values,
            mean,
            min,
            max,
        }
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// Repeat [`run_elasticity_analysis`] for `config.trials` trials in parallel
/// and summarise each stat, largest absolute mean first.
///
/// Trial `i` runs under seed `config.seed + i`.
pub fn elasticity_consistency(
    base: &TeamTemplate,
    improvement: Decimal,
    config: &ElasticityConfig,
) -> Result<Vec<ConsistencySummary>, AnalysisError> {
    check_improvement(improvement)?;
    if config.trials == 0 {
        return Err(AnalysisError::NoTrials);
    }

    let trials = (0..config.trials)
        .into_par_iter()
        .map(|trial| {
            let seeded = config.with_seed(config.seed.wrapping_add(trial as u64));
            run_elasticity_analysis(base, improvement, &seeded)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut by_stat: BTreeMap<TrainableStat, Vec<f64>> = BTreeMap::new();
    for results in trials {
        for result in results {
            let values = by_stat.entry(result.stat).or_default();
            values.push(result.elasticity);
        }
    }

    let mut summaries: Vec<ConsistencySummary> = by_stat
        .into_iter()
        .map(|(stat, values)| ConsistencySummary::from_values(stat, values))
        .collect();
    summaries.sort_by(|a, b| b.mean.abs().total_cmp(&a.mean.abs()));

    for summary in &summaries {
        debug!(
            stat = %summary.stat,
            mean = summary.mean,
            range = summary.range(),
            "elasticity consistency"
        );
    }
    Ok(summaries)
}
