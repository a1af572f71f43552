//! Structural and probabilistic validation of a state machine.
//!
//! Fatal checks are accumulated with Stillwater's `Validation` so that a
//! broken machine reports every defect at once. Reachability checks only
//! produce warnings.

use crate::core::Transition;
use crate::machine::error::{ValidationError, ValidationIssue};
use crate::machine::StateMachine;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, VecDeque};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Allowed deviation of a state's probability sum from exactly 1.
pub const PROBABILITY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

type Check = Validation<(), NonEmptyVec<ValidationIssue>>;

/// Every issue found by [`StateMachine::validate`], fatal and otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| issue.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| !issue.is_error())
    }

    /// True when no fatal issue was found. Warnings are allowed.
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    /// Convert to a strict result, keeping only fatal issues.
    pub fn into_result(self) -> Result<(), ValidationError> {
        let issues: Vec<ValidationIssue> = self
            .issues
            .into_iter()
            .filter(ValidationIssue::is_error)
            .collect();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

/// Sum of the outgoing probabilities of a state.
pub fn probability_sum(transitions: &[Transition]) -> Decimal {
    transitions.iter().map(|t| t.probability).sum()
}

/// Whether `sum` equals 1 within [`PROBABILITY_TOLERANCE`].
pub fn sums_to_one(sum: Decimal) -> bool {
    (sum - Decimal::ONE).abs() <= PROBABILITY_TOLERANCE
}

fn ensure(condition: bool, issue: impl FnOnce() -> ValidationIssue) -> Check {
    if condition {
        Validation::success(())
    } else {
        Validation::fail(issue())
    }
}

pub(crate) fn validate(machine: &StateMachine) -> ValidationReport {
    let mut checks: Vec<Check> = Vec::new();

    let construction = machine.construction_issues();
    for issue in construction.iter().filter(|i| i.is_error()) {
        checks.push(Validation::fail(issue.clone()));
    }

    let initial = machine.initial_state();
    match machine.get_state(initial) {
        None => checks.push(Validation::fail(ValidationIssue::MissingInitialState {
            state: initial.to_string(),
        })),
        Some(state) => checks.push(ensure(!state.is_terminal(), || {
            ValidationIssue::TerminalInitialState {
                state: initial.to_string(),
            }
        })),
    }

    for state in machine.states() {
        let transitions = machine.transitions_of(&state.key);

        if state.is_terminal() {
            checks.push(ensure(transitions.is_empty(), || {
                ValidationIssue::TerminalWithTransitions {
                    state: state.key.clone(),
                    count: transitions.len(),
                }
            }));
            continue;
        }

        if transitions.is_empty() {
            checks.push(Validation::fail(ValidationIssue::DeadEnd {
                state: state.key.clone(),
            }));
            continue;
        }

        for transition in transitions {
            checks.push(ensure(transition.has_valid_probability(), || {
                ValidationIssue::InvalidProbability {
                    from: state.key.clone(),
                    to: transition.target.clone(),
                    probability: transition.probability,
                }
            }));
            checks.push(ensure(machine.contains_state(&transition.target), || {
                ValidationIssue::UnknownTarget {
                    from: state.key.clone(),
                    to: transition.target.clone(),
                }
            }));
        }

        let sum = probability_sum(transitions);
        checks.push(ensure(sums_to_one(sum), || ValidationIssue::ProbabilitySum {
            state: state.key.clone(),
            sum,
        }));
    }

    let mut issues: Vec<ValidationIssue> = match Validation::all_vec(checks) {
        Validation::Success(_) => Vec::new(),
        Validation::Failure(errors) => errors.iter().cloned().collect(),
    };

    issues.extend(
        machine
            .construction_issues()
            .iter()
            .filter(|issue| !issue.is_error())
            .cloned(),
    );
    issues.extend(reachability_warnings(machine));

    ValidationReport { issues }
}

/// States not reachable from the initial state, and states from which no
/// terminal state can be reached.
fn reachability_warnings(machine: &StateMachine) -> Vec<ValidationIssue> {
    let mut warnings = Vec::new();
    if !machine.contains_state(machine.initial_state()) {
        return warnings;
    }

    let reachable = reachable_from(machine, machine.initial_state());
    for state in machine.states() {
        if !reachable.contains(state.key.as_str()) {
            warnings.push(ValidationIssue::Unreachable {
                state: state.key.clone(),
            });
        }
    }

    let terminating = states_reaching_terminal(machine);
    for state in machine.states() {
        if !state.is_terminal() && !terminating.contains(state.key.as_str()) {
            warnings.push(ValidationIssue::CannotTerminate {
                state: state.key.clone(),
            });
        }
    }

    warnings
}

/// Breadth-first search over positive-probability edges.
pub(crate) fn reachable_from<'a>(machine: &'a StateMachine, start: &'a str) -> BTreeSet<&'a str> {
    let mut seen = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(key) = queue.pop_front() {
        for transition in machine.transitions_of(key) {
            if transition.probability <= Decimal::ZERO {
                continue;
            }
            if let Some(target) = machine.get_state(&transition.target) {
                if seen.insert(target.key.as_str()) {
                    queue.push_back(target.key.as_str());
                }
            }
        }
    }

    seen
}

/// Fixed point of "has an edge into a terminating state".
fn states_reaching_terminal(machine: &StateMachine) -> BTreeSet<&str> {
    let mut terminating: BTreeSet<&str> = machine
        .states()
        .filter(|state| state.is_terminal())
        .map(|state| state.key.as_str())
        .collect();

    loop {
        let before = terminating.len();
        for state in machine.states() {
            if terminating.contains(state.key.as_str()) {
                continue;
            }
            let reaches = machine.transitions_of(&state.key).iter().any(|t| {
                t.probability > Decimal::ZERO && terminating.contains(t.target.as_str())
            });
            if reaches {
                terminating.insert(state.key.as_str());
            }
        }
        if terminating.len() == before {
            return terminating;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ActionCategory, Phase, State, TeamDesignation, TerminalOutcome};
    use crate::machine::StateMachineBuilder;
    use rust_decimal_macros::dec;

    fn serve() -> State {
        State::continuation("s_serve_ready", TeamDesignation::Serving, Phase::Serve)
    }

    fn ace() -> State {
        State::terminal(
            "s_serve_ace",
            TeamDesignation::Serving,
            Phase::Serve,
            TerminalOutcome::ActingTeamPoint,
        )
    }

    fn fault() -> State {
        State::terminal(
            "s_serve_error",
            TeamDesignation::Serving,
            Phase::Serve,
            TerminalOutcome::OpponentPoint,
        )
    }

    #[test]
    fn tolerance_accepts_tiny_drift_only() {
        assert!(sums_to_one(dec!(1)));
        assert!(sums_to_one(dec!(0.9999995)));
        assert!(sums_to_one(dec!(1.000001)));
        assert!(!sums_to_one(dec!(1.0000011)));
        assert!(!sums_to_one(dec!(0.99)));
    }

    #[test]
    fn minimal_machine_is_valid() {
        let machine = StateMachineBuilder::new("s_serve_ready")
            .states([serve(), ace(), fault()])
            .transition(
                "s_serve_ready",
                "s_serve_ace",
                dec!(0.3),
                ActionCategory::Serve,
            )
            .transition(
                "s_serve_ready",
                "s_serve_error",
                dec!(0.7),
                ActionCategory::Serve,
            )
            .build_unvalidated();

        let report = machine.validate();
        assert!(report.is_valid(), "{:?}", report.issues());
        assert!(report.issues().is_empty());
    }

    #[test]
    fn all_fatal_issues_are_accumulated() {
        let machine = StateMachineBuilder::new("s_serve_ready")
            .states([serve(), ace(), fault()])
            .transition(
                "s_serve_ready",
                "s_serve_ace",
                dec!(0.3),
                ActionCategory::Serve,
            )
            .transition(
                "s_serve_ready",
                "s_nowhere",
                dec!(0.5),
                ActionCategory::Serve,
            )
            .transition(
                "s_serve_error",
                "s_serve_ace",
                dec!(1),
                ActionCategory::Serve,
            )
            .build_unvalidated();

        let report = machine.validate();
        let errors: Vec<&ValidationIssue> = report.errors().collect();

        assert!(errors.contains(&&ValidationIssue::UnknownTarget {
            from: "s_serve_ready".to_string(),
            to: "s_nowhere".to_string(),
        }));
        assert!(errors.contains(&&ValidationIssue::ProbabilitySum {
            state: "s_serve_ready".to_string(),
            sum: dec!(0.8),
        }));
        assert!(errors.contains(&&ValidationIssue::TerminalWithTransitions {
            state: "s_serve_error".to_string(),
            count: 1,
        }));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn terminal_initial_state_is_rejected() {
        let machine = StateMachineBuilder::new("s_serve_ace")
            .states([serve(), ace(), fault()])
            .transition(
                "s_serve_ready",
                "s_serve_ace",
                dec!(1),
                ActionCategory::Serve,
            )
            .build_unvalidated();

        let result = machine.validate().into_result();
        let error = result.unwrap_err();
        assert!(error.issues.contains(&ValidationIssue::TerminalInitialState {
            state: "s_serve_ace".to_string(),
        }));
    }

    #[test]
    fn unreachable_state_is_only_a_warning() {
        let machine = StateMachineBuilder::new("s_serve_ready")
            .states([serve(), ace(), fault()])
            .transition(
                "s_serve_ready",
                "s_serve_ace",
                dec!(1),
                ActionCategory::Serve,
            )
            .build_unvalidated();

        let report = machine.validate();
        assert!(report.is_valid());
        let warnings: Vec<&ValidationIssue> = report.warnings().collect();
        assert_eq!(
            warnings,
            vec![&ValidationIssue::Unreachable {
                state: "s_serve_error".to_string(),
            }]
        );
    }

    #[test]
    fn closed_cycle_is_reported_as_non_terminating() {
        let machine = StateMachineBuilder::new("s_serve_ready")
            .states([
                serve(),
                State::continuation("s_loop", TeamDesignation::Serving, Phase::Transition),
                ace(),
            ])
            .transition(
                "s_serve_ready",
                "s_serve_ace",
                dec!(0.5),
                ActionCategory::Serve,
            )
            .transition("s_serve_ready", "s_loop", dec!(0.5), ActionCategory::Serve)
            .transition("s_loop", "s_loop", dec!(1), ActionCategory::Transition)
            .build_unvalidated();

        let report = machine.validate();
        assert!(report.is_valid());
        assert!(report
            .warnings()
            .any(|w| *w == ValidationIssue::CannotTerminate {
                state: "s_loop".to_string()
            }));
    }

    #[test]
    fn dead_end_and_bad_probability_are_fatal() {
        let machine = StateMachineBuilder::new("s_serve_ready")
            .states([
                serve(),
                State::continuation("s_stuck", TeamDesignation::Serving, Phase::Set),
                ace(),
            ])
            .transition(
                "s_serve_ready",
                "s_serve_ace",
                dec!(1.5),
                ActionCategory::Serve,
            )
            .transition(
                "s_serve_ready",
                "s_stuck",
                dec!(-0.5),
                ActionCategory::Serve,
            )
            .build_unvalidated();

        let report = machine.validate();
        assert!(!report.is_valid());
        assert!(report
            .errors()
            .any(|e| matches!(e, ValidationIssue::DeadEnd { state } if state == "s_stuck")));
        assert_eq!(
            report
                .errors()
                .filter(|e| matches!(e, ValidationIssue::InvalidProbability { .. }))
                .count(),
            2
        );
    }
}
