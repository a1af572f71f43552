//! Template composition errors.

use crate::machine::ValidationError;
use rust_decimal::Decimal;
use thiserror::Error;

/// A single defect found while overlaying team templates on the topology.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompositionIssue {
    #[error("Template '{template}': state '{state}' probabilities sum to {sum}, not 1")]
    ProbabilitySum {
        template: String,
        state: String,
        sum: Decimal,
    },

    #[error("Template '{template}': unknown state '{state}'")]
    UnknownState { template: String, state: String },

    #[error("Template '{template}': terminal state '{state}' cannot be overridden")]
    TerminalState { template: String, state: String },

    #[error("Template '{template}': state '{state}' has no transition to '{target}'")]
    UnknownTarget {
        template: String,
        state: String,
        target: String,
    },

    #[error("Template '{template}': '{state}' -> '{target}' = {probability} is outside (0, 1]")]
    InvalidProbability {
        template: String,
        state: String,
        target: String,
        probability: Decimal,
    },
}

impl CompositionIssue {
    /// State the issue is attached to.
    pub fn state(&self) -> &str {
        match self {
            Self::ProbabilitySum { state, .. }
            | Self::UnknownState { state, .. }
            | Self::TerminalState { state, .. }
            | Self::UnknownTarget { state, .. }
            | Self::InvalidProbability { state, .. } => state,
        }
    }
}

/// Errors that can occur when composing a machine from team templates.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TemplateCompositionError {
    #[error("Template composition failed with {} issue(s): {}", .issues.len(), describe(.issues))]
    Invalid { issues: Vec<CompositionIssue> },

    #[error("Composed machine failed validation: {0}")]
    Validation(#[from] ValidationError),
}

impl TemplateCompositionError {
    /// Overlay issues, empty when the failure came from re-validation.
    pub fn issues(&self) -> &[CompositionIssue] {
        match self {
            Self::Invalid { issues } => issues,
            Self::Validation(_) => &[],
        }
    }
}

fn describe(issues: &[CompositionIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
