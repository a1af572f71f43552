//! Simulation configuration.

use super::matches::Team;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_RALLY_STEPS: usize = 200;
pub const DEFAULT_TARGET_SCORE: u32 = 21;
pub const DEFAULT_WIN_MARGIN: u32 = 2;

/// Limits of a single rally walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RallyConfig {
    /// Hard cap on transitions taken before the walk is aborted.
    pub max_steps: usize,
}

impl Default for RallyConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_RALLY_STEPS,
        }
    }
}

/// Scoring rule deciding when a match is won.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRules {
    pub target_score: u32,
    pub win_margin: u32,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            target_score: DEFAULT_TARGET_SCORE,
            win_margin: DEFAULT_WIN_MARGIN,
        }
    }
}

impl MatchRules {
    pub fn new(target_score: u32, win_margin: u32) -> Self {
        Self {
            target_score,
            win_margin,
        }
    }

    /// Winner of a match at this score, if it is over.
    ///
    /// A team wins once it has at least `target_score` points and leads by
    /// at least `win_margin` (and by at least one point).
    pub fn winner(&self, score_a: u32, score_b: u32) -> Option<Team> {
        let margin = self.win_margin.max(1);
        if score_a >= self.target_score && score_a.saturating_sub(score_b) >= margin {
            Some(Team::A)
        } else if score_b >= self.target_score && score_b.saturating_sub(score_a) >= margin {
            Some(Team::B)
        } else {
            None
        }
    }
}

/// Configuration of a match simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub rules: MatchRules,
    /// Abort the match once this many points have been played.
    pub max_points: Option<u32>,
    /// Keep the full rally trace of every point in the record.
    pub record_traces: bool,
    pub rally: RallyConfig,
}

impl MatchConfig {
    pub fn builder() -> MatchConfigBuilder {
        MatchConfigBuilder::new()
    }
}

/// Builder for [`MatchConfig`].
#[derive(Clone, Debug, Default)]
pub struct MatchConfigBuilder {
    config: MatchConfig,
}

impl MatchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points needed to win (default 21)
    pub fn target_score(mut self, target: u32) -> Self {
        self.config.rules.target_score = target;
        self
    }

    /// Required lead at the end (default 2)
    pub fn win_margin(mut self, margin: u32) -> Self {
        self.config.rules.win_margin = margin;
        self
    }

    /// Abort after this many points
    pub fn max_points(mut self, points: u32) -> Self {
        self.config.max_points = Some(points);
        self
    }

    pub fn record_traces(mut self, record: bool) -> Self {
        self.config.record_traces = record;
        self
    }

    /// Step guard for every rally
    pub fn max_rally_steps(mut self, steps: usize) -> Self {
        self.config.rally.max_steps = steps;
        self
    }

    pub fn build(self) -> MatchConfig {
        self.config
    }
}

/// Configuration of a batch of independent matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub matches: usize,
    /// Base seed; each match draws from its own stream of this seed.
    pub seed: u64,
    /// Let Team B serve first in every other match.
    pub alternate_first_server: bool,
    pub match_config: MatchConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            matches: 1_000,
            seed: 0,
            alternate_first_server: true,
            match_config: MatchConfig::default(),
        }
    }
}

impl BatchConfig {
    pub fn new(matches: usize, seed: u64) -> Self {
        Self {
            matches,
            seed,
            ..Self::default()
        }
    }

    pub fn with_match_config(mut self, match_config: MatchConfig) -> Self {
        self.match_config = match_config;
        self
    }
}
