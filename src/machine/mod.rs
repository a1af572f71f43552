//! The validated rally state machine.
//!
//! A [`StateMachine`] is an immutable graph of [`State`]s and their ordered,
//! probability-weighted outgoing [`Transition`]s. It is built once through
//! [`StateMachineBuilder`], validated, and afterwards only queried, so a
//! single instance can be shared by any number of concurrent simulations.
//!
//! # Example
//!
//! ```rust
//! use rally_machine::core::{ActionCategory, Phase, State, TeamDesignation, TerminalOutcome};
//! use rally_machine::machine::StateMachineBuilder;
//! use rust_decimal_macros::dec;
//!
//! let machine = StateMachineBuilder::new("s_serve_ready")
//!     .state(State::continuation("s_serve_ready", TeamDesignation::Serving, Phase::Serve))
//!     .state(State::terminal(
//!         "s_serve_ace",
//!         TeamDesignation::Serving,
//!         Phase::Serve,
//!         TerminalOutcome::ActingTeamPoint,
//!     ))
//!     .state(State::terminal(
//!         "s_serve_error",
//!         TeamDesignation::Serving,
//!         Phase::Serve,
//!         TerminalOutcome::OpponentPoint,
//!     ))
//!     .transition("s_serve_ready", "s_serve_ace", dec!(0.25), ActionCategory::Serve)
//!     .transition("s_serve_ready", "s_serve_error", dec!(0.75), ActionCategory::Serve)
//!     .build()
//!     .unwrap();
//!
//! assert!(machine.is_terminal_state("s_serve_ace"));
//! assert_eq!(machine.get_next_states("s_serve_ready").unwrap().len(), 2);
//! ```

mod builder;
pub mod error;
pub mod sampling;
pub mod validation;

pub use builder::StateMachineBuilder;
pub use error::{Severity, UnknownStateError, ValidationError, ValidationIssue};
pub use sampling::CumulativeDistribution;
pub use validation::{ValidationReport, PROBABILITY_TOLERANCE};

use crate::core::{State, TeamDesignation, TerminalOutcome, Transition};
use std::collections::{BTreeMap, BTreeSet};

/// Immutable graph of rally states and weighted transitions.
#[derive(Clone, Debug)]
pub struct StateMachine {
    initial_state: String,
    states: BTreeMap<String, State>,
    transitions: BTreeMap<String, Vec<Transition>>,
    distributions: BTreeMap<String, CumulativeDistribution>,
    terminal_states: BTreeSet<String>,
    construction_issues: Vec<ValidationIssue>,
}

impl StateMachine {
    /// Ordered outgoing transitions of `state`.
    pub fn get_next_states(&self, state: &str) -> Result<&[Transition], UnknownStateError> {
        self.transitions
            .get(state)
            .map(Vec::as_slice)
            .ok_or_else(|| UnknownStateError(state.to_string()))
    }

    /// True iff `state` exists and has no outgoing transitions.
    ///
    /// This is the check the rally walk stops on. [`State::is_terminal`]
    /// reads the declared kind instead; validation makes the two agree, but
    /// a machine from [`StateMachineBuilder::build_unvalidated`] may not.
    pub fn is_terminal_state(&self, state: &str) -> bool {
        self.terminal_states.contains(state)
    }

    /// Team acting in `state`.
    pub fn get_acting_team(&self, state: &str) -> Result<TeamDesignation, UnknownStateError> {
        self.require_state(state).map(|s| s.team)
    }

    /// Run every structural and probabilistic check, returning all issues.
    pub fn validate(&self) -> ValidationReport {
        validation::validate(self)
    }

    /// Fail with every fatal issue, ignoring warnings.
    pub fn validate_strict(&self) -> Result<(), ValidationError> {
        self.validate().into_result()
    }

    pub fn initial_state(&self) -> &str {
        &self.initial_state
    }

    pub fn get_state(&self, key: &str) -> Option<&State> {
        self.states.get(key)
    }

    pub fn contains_state(&self, key: &str) -> bool {
        self.states.contains_key(key)
    }

    /// All states ordered by key.
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.values()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(Vec::len).sum()
    }

    /// Keys of states with no outgoing transitions.
    pub fn terminal_states(&self) -> &BTreeSet<String> {
        &self.terminal_states
    }

    /// Keys of states with at least one outgoing transition.
    pub fn continuation_states(&self) -> impl Iterator<Item = &str> {
        self.transitions
            .iter()
            .filter(|(_, outgoing)| !outgoing.is_empty())
            .map(|(key, _)| key.as_str())
    }

    /// Whether `from` has an outgoing transition to `to`.
    pub fn is_valid_transition(&self, from: &str, to: &str) -> bool {
        self.transitions_of(from).iter().any(|t| t.target == to)
    }

    /// Scoring outcome of a terminal state.
    pub fn terminal_outcome(
        &self,
        state: &str,
    ) -> Result<Option<TerminalOutcome>, UnknownStateError> {
        self.require_state(state).map(State::outcome)
    }

    /// Side awarded the point when a rally ends in `state`.
    pub fn point_winner(
        &self,
        state: &str,
    ) -> Result<Option<TeamDesignation>, UnknownStateError> {
        self.require_state(state).map(State::point_winner)
    }

    /// Precomputed cumulative boundaries of `state`'s transitions.
    pub fn distribution(
        &self,
        state: &str,
    ) -> Result<&CumulativeDistribution, UnknownStateError> {
        self.distributions
            .get(state)
            .ok_or_else(|| UnknownStateError(state.to_string()))
    }

    pub(crate) fn transitions_of(&self, state: &str) -> &[Transition] {
        self.transitions
            .get(state)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn construction_issues(&self) -> &[ValidationIssue] {
        &self.construction_issues
    }

    fn require_state(&self, key: &str) -> Result<&State, UnknownStateError> {
        self.states
            .get(key)
            .ok_or_else(|| UnknownStateError(key.to_string()))
    }
}
