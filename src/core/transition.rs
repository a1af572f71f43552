//! Weighted transitions between rally states.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of the action a transition represents.
///
/// Used for classification and reporting only; the engine never branches
/// on it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Serve,
    Reception,
    Set,
    Attack,
    Dig,
    Block,
    Transition,
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Serve => "serve",
            Self::Reception => "reception",
            Self::Set => "set",
            Self::Attack => "attack",
            Self::Dig => "dig",
            Self::Block => "block",
            Self::Transition => "transition",
        };
        f.write_str(name)
    }
}

/// An outgoing edge of a state: target, exact probability and category.
///
/// The source state is the key the transition is stored under.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Transition {
    pub target: String,
    pub probability: Decimal,
    pub category: ActionCategory,
}

impl Transition {
    pub fn new(target: impl Into<String>, probability: Decimal, category: ActionCategory) -> Self {
        Self {
            target: target.into(),
            probability,
            category,
        }
    }

    /// Probability lies in the half-open interval (0, 1].
    pub fn has_valid_probability(&self) -> bool {
        self.probability > Decimal::ZERO && self.probability <= Decimal::ONE
    }
}
