//! Errors and validation issues for state machine construction and queries.

use crate::core::ActionCategory;
use rust_decimal::Decimal;
use thiserror::Error;

/// Query against a state key the machine does not contain.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown state '{0}'")]
pub struct UnknownStateError(pub String);

/// How serious a validation issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The machine must not be used for simulation.
    Error,
    /// Reported for diagnostics; the machine is still usable.
    Warning,
}

/// A single defect found while validating a state machine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationIssue {
    #[error("State '{state}' probabilities sum to {sum}, not 1")]
    ProbabilitySum { state: String, sum: Decimal },

    #[error("Transition '{from}' -> '{to}' has probability {probability} outside (0, 1]")]
    InvalidProbability {
        from: String,
        to: String,
        probability: Decimal,
    },

    #[error("Transition '{from}' -> '{to}' targets an unknown state")]
    UnknownTarget { from: String, to: String },

    #[error("Transitions declared from undeclared state '{state}'")]
    UndeclaredSource { state: String },

    #[error("State '{state}' declared more than once")]
    DuplicateState { state: String },

    #[error("Initial state '{state}' is not defined")]
    MissingInitialState { state: String },

    #[error("Initial state '{state}' is terminal")]
    TerminalInitialState { state: String },

    #[error("Terminal state '{state}' has {count} outgoing transition(s)")]
    TerminalWithTransitions { state: String, count: usize },

    #[error("Continuation state '{state}' has no outgoing transitions")]
    DeadEnd { state: String },

    #[error("State '{state}' is unreachable from the initial state")]
    Unreachable { state: String },

    #[error("State '{state}' has no path to a terminal state")]
    CannotTerminate { state: String },

    #[error("Duplicate transition '{from}' -> '{to}' ({category}) merged to {merged}")]
    DuplicateMerged {
        from: String,
        to: String,
        category: ActionCategory,
        merged: Decimal,
    },
}

impl ValidationIssue {
    pub fn severity(&self) -> Severity {
        match self {
            Self::Unreachable { .. }
            | Self::CannotTerminate { .. }
            | Self::DuplicateMerged { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    /// State the issue is attached to.
    pub fn state(&self) -> &str {
        match self {
            Self::ProbabilitySum { state, .. }
            | Self::UndeclaredSource { state }
            | Self::DuplicateState { state }
            | Self::MissingInitialState { state }
            | Self::TerminalInitialState { state }
            | Self::TerminalWithTransitions { state, .. }
            | Self::DeadEnd { state }
            | Self::Unreachable { state }
            | Self::CannotTerminate { state } => state,
            Self::InvalidProbability { from, .. }
            | Self::UnknownTarget { from, .. }
            | Self::DuplicateMerged { from, .. } => from,
        }
    }
}

/// Strict validation failure carrying every fatal issue found.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("State machine has {} fatal issue(s): {}", .issues.len(), describe(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn describe(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
