//! Point-by-point match simulation.

use super::config::{MatchConfig, MatchRules, RallyConfig};
use super::error::SimulationError;
use super::rally::{RallySimulator, RallyTrace};
use crate::core::TeamDesignation;
use crate::machine::StateMachine;
use crate::templates::{create_state_machine_from_teams, TeamTemplate, TemplateCompositionError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Match-level team identity, independent of who serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

impl Team {
    pub fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "Team A"),
            Self::B => write!(f, "Team B"),
        }
    }
}

/// The machines used while each team serves.
///
/// Machines are shared read-only, so one matchup can back any number of
/// concurrent matches.
#[derive(Clone, Debug)]
pub struct Matchup {
    a_serving: Arc<StateMachine>,
    b_serving: Arc<StateMachine>,
}

impl Matchup {
    pub fn new(a_serving: Arc<StateMachine>, b_serving: Arc<StateMachine>) -> Self {
        Self {
            a_serving,
            b_serving,
        }
    }

    /// Use one machine regardless of which team serves.
    pub fn shared(machine: Arc<StateMachine>) -> Self {
        Self {
            a_serving: Arc::clone(&machine),
            b_serving: machine,
        }
    }

    /// Compose both serving orientations of two team templates.
    pub fn from_templates(
        team_a: &TeamTemplate,
        team_b: &TeamTemplate,
    ) -> Result<Self, TemplateCompositionError> {
        let a_serving = create_state_machine_from_teams(team_a, team_b)?;
        let b_serving = create_state_machine_from_teams(team_b, team_a)?;
        Ok(Self::new(Arc::new(a_serving), Arc::new(b_serving)))
    }

    pub fn machine_for(&self, server: Team) -> &StateMachine {
        match server {
            Team::A => self.a_serving.as_ref(),
            Team::B => self.b_serving.as_ref(),
        }
    }

    pub fn simulator(&self, config: MatchConfig) -> MatchSimulator<'_> {
        MatchSimulator::new(&self.a_serving, &self.b_serving, config)
    }
}

/// One played point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointRecord {
    /// 1-based index within the match.
    pub number: u32,
    pub server: Team,
    pub winner: Team,
    pub terminal_state: String,
    pub rally_length: usize,
    /// Score after the point.
    pub score_a: u32,
    pub score_b: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<RallyTrace>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbortReason {
    PointCap,
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    InProgress,
    Complete { winner: Team },
    Aborted { reason: AbortReason },
}

/// Score, serve and point history of a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub score_a: u32,
    pub score_b: u32,
    pub server: Team,
    pub first_server: Team,
    pub points: Vec<PointRecord>,
    pub status: MatchStatus,
}

impl MatchRecord {
    pub fn new(first_server: Team) -> Self {
        Self {
            score_a: 0,
            score_b: 0,
            server: first_server,
            first_server,
            points: Vec::new(),
            status: MatchStatus::InProgress,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.status, MatchStatus::Complete { .. })
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.status, MatchStatus::Aborted { .. })
    }

    pub fn winner(&self) -> Option<Team> {
        match self.status {
            MatchStatus::Complete { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn score(&self, team: Team) -> u32 {
        match team {
            Team::A => self.score_a,
            Team::B => self.score_b,
        }
    }

    pub fn total_points(&self) -> u32 {
        self.score_a + self.score_b
    }

    /// Total transitions taken over every rally of the match.
    pub fn total_rally_steps(&self) -> usize {
        self.points.iter().map(|point| point.rally_length).sum()
    }

    /// Award the point to `winner`, who serves next.
    pub(crate) fn record_point(&mut self, winner: Team, trace: RallyTrace, keep_trace: bool) {
        match winner {
            Team::A => self.score_a += 1,
            Team::B => self.score_b += 1,
        }

        let point = PointRecord {
            number: self.total_points(),
            server: self.server,
            winner,
            terminal_state: trace.terminal_state.clone(),
            rally_length: trace.transition_count(),
            score_a: self.score_a,
            score_b: self.score_b,
            trace: keep_trace.then_some(trace),
        };
        trace!(
            point = point.number,
            server = %point.server,
            winner = %winner,
            terminal = %point.terminal_state,
            "point played"
        );

        self.points.push(point);
        self.server = winner;
    }
}

/// Maps the rally winner (serving/receiving) to a match team.
pub(crate) fn rally_winner(server: Team, winner: TeamDesignation) -> Team {
    match winner {
        TeamDesignation::Serving => server,
        TeamDesignation::Receiving => server.opponent(),
    }
}

/// Runs matches over one machine per serving team.
#[derive(Clone, Copy, Debug)]
pub struct MatchSimulator<'a> {
    a_serving: &'a StateMachine,
    b_serving: &'a StateMachine,
    config: MatchConfig,
}

impl<'a> MatchSimulator<'a> {
    pub fn new(
        a_serving: &'a StateMachine,
        b_serving: &'a StateMachine,
        config: MatchConfig,
    ) -> Self {
        Self {
            a_serving,
            b_serving,
            config,
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    fn rally_for(&self, server: Team) -> RallySimulator<'a> {
        let machine = match server {
            Team::A => self.a_serving,
            Team::B => self.b_serving,
        };
        RallySimulator::with_config(machine, self.config.rally)
    }

    /// Play a match to completion or to the point cap.
    pub fn run<R: Rng + ?Sized>(
        &self,
        first_server: Team,
        rng: &mut R,
    ) -> Result<MatchRecord, SimulationError> {
        self.run_with_cancel(first_server, rng, &AtomicBool::new(false))
    }

    /// Play a match, checking `cancel` before every point.
    pub fn run_with_cancel<R: Rng + ?Sized>(
        &self,
        first_server: Team,
        rng: &mut R,
        cancel: &AtomicBool,
    ) -> Result<MatchRecord, SimulationError> {
        let rules = self.config.rules;
        let mut record = MatchRecord::new(first_server);

        loop {
            if let Some(winner) = rules.winner(record.score_a, record.score_b) {
                record.status = MatchStatus::Complete { winner };
                break;
            }

            if let Some(cap) = self.config.max_points {
                if record.total_points() >= cap {
                    record.status = MatchStatus::Aborted {
                        reason: AbortReason::PointCap,
                    };
                    break;
                }
            }

            if cancel.load(Ordering::Relaxed) {
                record.status = MatchStatus::Aborted {
                    reason: AbortReason::Cancelled,
                };
                break;
            }

            let server = record.server;
            let trace = self.rally_for(server).simulate(rng)?;
            let winner = rally_winner(server, trace.winner);
            record.record_point(winner, trace, self.config.record_traces);
        }

        debug!(
            score_a = record.score_a,
            score_b = record.score_b,
            status = ?record.status,
            "match finished"
        );
        Ok(record)
    }
}

/// Simulate a match with one machine for both serving teams, Team A serving
/// first.
pub fn simulate_match<R: Rng + ?Sized>(
    machine: &StateMachine,
    target_score: u32,
    win_margin: u32,
    rng: &mut R,
    max_points: Option<u32>,
) -> Result<MatchRecord, SimulationError> {
    let config = MatchConfig {
        rules: MatchRules::new(target_score, win_margin),
        max_points,
        record_traces: false,
        rally: RallyConfig::default(),
    };
    MatchSimulator::new(machine, machine, config).run(Team::A, rng)
}
