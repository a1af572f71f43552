//! Elasticity configuration.

use crate::simulation::{BatchConfig, MatchConfig};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SAMPLES: u64 = 10_000;
pub const DEFAULT_TRIALS: usize = 3;

/// What a win rate is measured over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinRateBasis {
    /// Share of independent points won, the serve alternating every point.
    #[default]
    Points,
    /// Share of completed matches won.
    Matches,
}

/// Configuration of an elasticity measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticityConfig {
    pub basis: WinRateBasis,
    /// Points or matches simulated per win rate.
    pub samples: u64,
    /// Seed shared by the baseline and every improved measurement.
    pub seed: u64,
    /// Independent repetitions for a consistency run.
    pub trials: usize,
    /// Match rules when measuring over matches.
    pub match_config: MatchConfig,
}

impl Default for ElasticityConfig {
    fn default() -> Self {
        Self {
            basis: WinRateBasis::Points,
            samples: DEFAULT_SAMPLES,
            seed: 0,
            trials: DEFAULT_TRIALS,
            match_config: MatchConfig::default(),
        }
    }
}

impl ElasticityConfig {
    /// Point-based measurement over `points` rallies.
    pub fn points(points: u64, seed: u64) -> Self {
        Self {
            samples: points,
            seed,
            ..Self::default()
        }
    }

    /// Match-based measurement over `matches` matches.
    pub fn matches(matches: u64, seed: u64) -> Self {
        Self {
            basis: WinRateBasis::Matches,
            samples: matches,
            seed,
            ..Self::default()
        }
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_match_config(mut self, match_config: MatchConfig) -> Self {
        self.match_config = match_config;
        self
    }

    /// The same measurement under another seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Batch configuration of a match-based measurement.
    pub fn batch(&self) -> BatchConfig {
        BatchConfig::new(self.samples as usize, self.seed).with_match_config(self.match_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_measure_ten_thousand_points() {
        let config = ElasticityConfig::default();
        assert_eq!(config.basis, WinRateBasis::Points);
        assert_eq!(config.samples, 10_000);
        assert_eq!(config.trials, 3);
    }

    #[test]
    fn match_basis_builds_a_batch() {
        let config = ElasticityConfig::matches(400, 12);
        let batch = config.batch();
        assert_eq!(batch.matches, 400);
        assert_eq!(batch.seed, 12);
        assert_eq!(batch.match_config, MatchConfig::default());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: ElasticityConfig =
            serde_json::from_str(r#"{"basis": "matches", "trials": 5}"#).unwrap();
        assert_eq!(config.basis, WinRateBasis::Matches);
        assert_eq!(config.trials, 5);
        assert_eq!(config.samples, DEFAULT_SAMPLES);
    }
}
