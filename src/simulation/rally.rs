//! Weighted random walk over a state machine.

use super::config::RallyConfig;
use super::error::SimulationError;
use crate::core::{State, TeamDesignation, TerminalOutcome, Transition};
use crate::machine::sampling::draw_unit;
use crate::machine::{StateMachine, UnknownStateError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// One visited state and the transition taken out of it.
///
/// The final step of a trace is the terminal state, with no transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RallyStep {
    pub state: String,
    pub transition: Option<Transition>,
}

/// Complete record of one rally, owned by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RallyTrace {
    pub steps: Vec<RallyStep>,
    pub terminal_state: String,
    pub outcome: TerminalOutcome,
    pub winner: TeamDesignation,
}

impl RallyTrace {
    /// Number of transitions taken.
    pub fn transition_count(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Visited state keys, initial state first, terminal state last.
    pub fn path(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.state.as_str()).collect()
    }
}

/// Rally simulator bound to one machine.
#[derive(Clone, Copy, Debug)]
pub struct RallySimulator<'m> {
    machine: &'m StateMachine,
    config: RallyConfig,
}

impl<'m> RallySimulator<'m> {
    pub fn new(machine: &'m StateMachine) -> Self {
        Self::with_config(machine, RallyConfig::default())
    }

    pub fn with_config(machine: &'m StateMachine, config: RallyConfig) -> Self {
        Self { machine, config }
    }

    pub fn machine(&self) -> &'m StateMachine {
        self.machine
    }

    /// Simulate a rally from the machine's initial serve state.
    pub fn simulate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RallyTrace, SimulationError> {
        self.simulate_from(self.machine.initial_state(), rng)
    }

    /// Simulate a rally starting at `initial_state`.
    pub fn simulate_from<R: Rng + ?Sized>(
        &self,
        initial_state: &str,
        rng: &mut R,
    ) -> Result<RallyTrace, SimulationError> {
        let mut current = self
            .machine
            .get_state(initial_state)
            .ok_or_else(|| UnknownStateError(initial_state.to_string()))?;
        let mut steps = Vec::new();

        loop {
            if self.machine.is_terminal_state(&current.key) {
                return finish(current, steps);
            }

            if steps.len() >= self.config.max_steps {
                return Err(SimulationError::StepLimitExceeded {
                    limit: self.config.max_steps,
                    state: current.key.clone(),
                });
            }

            let transition = select_transition(self.machine, &current.key, rng)?;
            let next = self.machine.get_state(&transition.target).ok_or_else(|| {
                SimulationError::MissingTarget {
                    from: current.key.clone(),
                    to: transition.target.clone(),
                }
            })?;

            trace!(
                from = %current.key,
                to = %next.key,
                category = %transition.category,
                "rally step"
            );
            steps.push(RallyStep {
                state: current.key.clone(),
                transition: Some(transition.clone()),
            });
            current = next;
        }
    }
}

fn finish(terminal: &State, mut steps: Vec<RallyStep>) -> Result<RallyTrace, SimulationError> {
    let (Some(outcome), Some(winner)) = (terminal.outcome(), terminal.point_winner()) else {
        return Err(SimulationError::DeadEnd {
            state: terminal.key.clone(),
        });
    };

    steps.push(RallyStep {
        state: terminal.key.clone(),
        transition: None,
    });

    Ok(RallyTrace {
        steps,
        terminal_state: terminal.key.clone(),
        outcome,
        winner,
    })
}

/// Draw one outgoing transition of `state` by inverse-CDF sampling.
pub fn select_transition<'m, R: Rng + ?Sized>(
    machine: &'m StateMachine,
    state: &str,
    rng: &mut R,
) -> Result<&'m Transition, SimulationError> {
    let transitions = machine.get_next_states(state)?;
    let distribution = machine.distribution(state)?;
    let draw = draw_unit(rng);

    distribution
        .select(draw)
        .and_then(|index| transitions.get(index))
        .ok_or_else(|| SimulationError::DeadEnd {
            state: state.to_string(),
        })
}

/// Simulate one rally from `initial_state` with the default step guard.
pub fn simulate_rally<R: Rng + ?Sized>(
    machine: &StateMachine,
    initial_state: &str,
    rng: &mut R,
) -> Result<RallyTrace, SimulationError> {
    RallySimulator::new(machine).simulate_from(initial_state, rng)
}
