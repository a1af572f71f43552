//! Simulation errors.

use crate::machine::UnknownStateError;
use thiserror::Error;

/// Errors that abort a single rally or match simulation.
///
/// Each variant signals a broken machine invariant; none is retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SimulationError {
    #[error(transparent)]
    UnknownState(#[from] UnknownStateError),

    #[error("Transition '{from}' -> '{to}' targets a state missing from the machine")]
    MissingTarget { from: String, to: String },

    #[error("State '{state}' has no outgoing transitions and no scoring outcome")]
    DeadEnd { state: String },

    #[error("Rally exceeded {limit} steps (stopped at '{state}')")]
    StepLimitExceeded { limit: usize, state: String },
}
