//! Analysis errors.

use crate::machine::UnknownStateError;
use crate::simulation::SimulationError;
use crate::templates::TemplateCompositionError;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    UnknownState(#[from] UnknownStateError),

    #[error("State '{state}' has no transition to '{target}'")]
    UnknownTransition { state: String, target: String },

    #[error("Scaling '{state}' -> '{target}' by {factor} leaves no valid distribution")]
    Saturated {
        state: String,
        target: String,
        factor: Decimal,
    },

    #[error("Improvement {0} must be non-zero and greater than -1")]
    InvalidImprovement(Decimal),

    #[error("Baseline win rate is zero; elasticity is undefined")]
    DegenerateBaseline,

    #[error("A consistency run needs at least one trial")]
    NoTrials,

    #[error("Failed to compose improved team: {0}")]
    Composition(#[from] TemplateCompositionError),

    #[error("Simulation failed: {0}")]
    Simulation(#[from] SimulationError),
}
