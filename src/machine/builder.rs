//! Builder for constructing state machines.

use crate::core::{ActionCategory, State, Transition};
use crate::machine::error::{ValidationError, ValidationIssue};
use crate::machine::sampling::CumulativeDistribution;
use crate::machine::StateMachine;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Builder for constructing state machines with a fluent API.
///
/// Construction is the only point where a machine's graph can change.
/// Duplicate `(source, target, category)` edges are merged by summing their
/// probabilities.
#[derive(Clone, Debug)]
pub struct StateMachineBuilder {
    initial: String,
    states: Vec<State>,
    transitions: Vec<(String, Transition)>,
}

impl StateMachineBuilder {
    /// Create a new builder with the given initial state key.
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            initial: initial.into(),
            states: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Declare a state.
    pub fn state(mut self, state: State) -> Self {
        self.states.push(state);
        self
    }

    /// Declare multiple states at once.
    pub fn states(mut self, states: impl IntoIterator<Item = State>) -> Self {
        self.states.extend(states);
        self
    }

    /// Add an outgoing transition from `from`.
    pub fn transition(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        probability: Decimal,
        category: ActionCategory,
    ) -> Self {
        self.transitions
            .push((from.into(), Transition::new(to, probability, category)));
        self
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, from: impl Into<String>, transition: Transition) -> Self {
        self.transitions.push((from.into(), transition));
        self
    }

    pub fn initial_state(&self) -> &str {
        &self.initial
    }

    pub fn declared_states(&self) -> &[State] {
        &self.states
    }

    /// Transitions declared so far, in declaration order.
    pub fn declared_transitions(&self) -> &[(String, Transition)] {
        &self.transitions
    }

    /// Build the machine and validate it strictly.
    ///
    /// Fails with every fatal issue found. Warning-level issues are logged.
    pub fn build(self) -> Result<StateMachine, ValidationError> {
        let machine = self.build_unvalidated();
        let report = machine.validate();

        for issue in report.warnings() {
            warn!(state = issue.state(), %issue, "state machine validation warning");
        }

        report.into_result()?;
        debug!(
            states = machine.state_count(),
            transitions = machine.transition_count(),
            initial = machine.initial_state(),
            "built state machine"
        );
        Ok(machine)
    }

    /// Build the machine without rejecting defects.
    ///
    /// Intended for inspection tools; call [`StateMachine::validate`] on the
    /// result to see what is wrong with it.
    pub fn build_unvalidated(self) -> StateMachine {
        let mut issues = Vec::new();
        let mut states = BTreeMap::new();
        let mut transitions: BTreeMap<String, Vec<Transition>> = BTreeMap::new();

        for state in self.states {
            let key = state.key.clone();
            if states.insert(key.clone(), state).is_some() {
                issues.push(ValidationIssue::DuplicateState { state: key.clone() });
            }
            transitions.entry(key).or_default();
        }

        let mut undeclared = BTreeSet::new();
        for (from, transition) in self.transitions {
            let Some(outgoing) = transitions.get_mut(&from) else {
                undeclared.insert(from);
                continue;
            };

            let existing = outgoing
                .iter_mut()
                .find(|t| t.target == transition.target && t.category == transition.category);

            match existing {
                Some(existing) => {
                    existing.probability += transition.probability;
                    issues.push(ValidationIssue::DuplicateMerged {
                        from: from.clone(),
                        to: transition.target.clone(),
                        category: transition.category,
                        merged: existing.probability,
                    });
                }
                None => outgoing.push(transition),
            }
        }

        issues.extend(
            undeclared
                .into_iter()
                .map(|state| ValidationIssue::UndeclaredSource { state }),
        );

        let distributions = transitions
            .iter()
            .map(|(key, outgoing)| {
                let distribution = CumulativeDistribution::from_transitions(outgoing);
                (key.clone(), distribution)
            })
            .collect();

        let terminal_states = transitions
            .iter()
            .filter(|(_, outgoing)| outgoing.is_empty())
            .map(|(key, _)| key.clone())
            .collect();

        StateMachine {
            initial_state: self.initial,
            states,
            transitions,
            distributions,
            terminal_states,
            construction_issues: issues,
        }
    }
}
