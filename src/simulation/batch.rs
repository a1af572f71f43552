//! Batch simulation of independent matches and points.
//!
//! Every match draws from its own ChaCha stream derived from the batch seed
//! and the match index, so summaries do not depend on how rayon schedules
//! the work.

use super::config::{BatchConfig, RallyConfig};
use super::error::SimulationError;
use super::matches::{rally_winner, MatchRecord, Matchup, Team};
use super::rally::RallySimulator;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Aggregated outcome of many matches.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub matches: usize,
    pub team_a_wins: usize,
    pub team_b_wins: usize,
    pub aborted: usize,
    pub total_points: u64,
    pub total_rally_steps: u64,
    /// How many rallies ended in each terminal state.
    pub terminal_counts: BTreeMap<String, u64>,
}

impl BatchSummary {
    pub fn from_record(record: &MatchRecord) -> Self {
        let mut summary = Self {
            matches: 1,
            total_points: u64::from(record.total_points()),
            total_rally_steps: record.total_rally_steps() as u64,
            ..Self::default()
        };
        match record.winner() {
            Some(Team::A) => summary.team_a_wins = 1,
            Some(Team::B) => summary.team_b_wins = 1,
            None => summary.aborted = 1,
        }
        for point in &record.points {
            *summary
                .terminal_counts
                .entry(point.terminal_state.clone())
                .or_default() += 1;
        }
        summary
    }

    pub fn merge(mut self, other: Self) -> Self {
        self.matches += other.matches;
        self.team_a_wins += other.team_a_wins;
        self.team_b_wins += other.team_b_wins;
        self.aborted += other.aborted;
        self.total_points += other.total_points;
        self.total_rally_steps += other.total_rally_steps;
        for (state, count) in other.terminal_counts {
            *self.terminal_counts.entry(state).or_default() += count;
        }
        self
    }

    pub fn completed(&self) -> usize {
        self.team_a_wins + self.team_b_wins
    }

    /// Fraction of completed matches won by Team A (0 when none completed).
    pub fn team_a_win_rate(&self) -> f64 {
        ratio(self.team_a_wins as u64, self.completed() as u64)
    }

    pub fn mean_points_per_match(&self) -> f64 {
        ratio(self.total_points, self.matches as u64)
    }

    /// Mean transitions per rally.
    pub fn mean_rally_length(&self) -> f64 {
        ratio(self.total_rally_steps, self.total_points)
    }
}

/// Aggregated outcome of independent points.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointSummary {
    pub points: u64,
    pub team_a_points: u64,
    /// Points won by whichever team served.
    pub serving_team_points: u64,
    pub total_rally_steps: u64,
    pub terminal_counts: BTreeMap<String, u64>,
}

impl PointSummary {
    pub fn team_a_point_rate(&self) -> f64 {
        ratio(self.team_a_points, self.points)
    }

    pub fn serve_hold_rate(&self) -> f64 {
        ratio(self.serving_team_points, self.points)
    }

    pub fn mean_rally_length(&self) -> f64 {
        ratio(self.total_rally_steps, self.points)
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// RNG of one unit of work within a batch.
pub fn stream_rng(seed: u64, index: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(index);
    rng
}

fn first_server(config: &BatchConfig, index: usize) -> Team {
    if config.alternate_first_server && index % 2 == 1 {
        Team::B
    } else {
        Team::A
    }
}

/// Simulate `config.matches` independent matches in parallel.
///
/// Fails with the first error any match raises; the remaining results are
/// discarded.
pub fn simulate_matches(
    matchup: &Matchup,
    config: &BatchConfig,
) -> Result<BatchSummary, SimulationError> {
    let simulator = matchup.simulator(config.match_config);

    let summary = (0..config.matches)
        .into_par_iter()
        .map(|index| {
            let mut rng = stream_rng(config.seed, index as u64);
            simulator
                .run(first_server(config, index), &mut rng)
                .map(|record| BatchSummary::from_record(&record))
        })
        .try_reduce(BatchSummary::default, |left, right| Ok(left.merge(right)))?;

    debug!(
        matches = summary.matches,
        team_a_wins = summary.team_a_wins,
        team_b_wins = summary.team_b_wins,
        aborted = summary.aborted,
        "batch finished"
    );
    Ok(summary)
}

/// Simulate `points` independent rallies, alternating the serving team.
pub fn simulate_points(
    matchup: &Matchup,
    points: u64,
    seed: u64,
) -> Result<PointSummary, SimulationError> {
    let rally = RallyConfig::default();
    let mut rng = stream_rng(seed, 0);
    let mut summary = PointSummary::default();

    for index in 0..points {
        let server = if index % 2 == 0 { Team::A } else { Team::B };
        let simulator = RallySimulator::with_config(matchup.machine_for(server), rally);
        let trace = simulator.simulate(&mut rng)?;
        let winner = rally_winner(server, trace.winner);

        summary.points += 1;
        if winner == Team::A {
            summary.team_a_points += 1;
        }
        if winner == server {
            summary.serving_team_points += 1;
        }
        summary.total_rally_steps += trace.transition_count() as u64;
        *summary
            .terminal_counts
            .entry(trace.terminal_state)
            .or_default() += 1;
    }

    Ok(summary)
}
