//! Value types of the rally model.
//!
//! This module contains the leaf types every other module builds on:
//! - States and their attributes (acting team, phase, terminal outcome)
//! - Weighted transitions tagged with an action category
//!
//! Everything here is a plain value with no behaviour beyond pure queries.

mod state;
mod transition;

pub use state::{
    mirror_key, Phase, State, StateKind, TeamDesignation, TerminalOutcome, RECEIVING_PREFIX,
    SERVING_PREFIX,
};
pub use transition::{ActionCategory, Transition};
