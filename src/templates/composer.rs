//! Composition of a serving and a receiving template into one machine.

use super::error::{CompositionIssue, TemplateCompositionError};
use super::{StateOverrides, TeamTemplate};
use crate::core::{mirror_key, State, TeamDesignation, Transition};
use crate::definitions::canonical_definition;
use crate::machine::validation::{probability_sum, sums_to_one};
use crate::machine::{StateMachine, StateMachineBuilder};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Build a machine from the canonical topology with the serving team's
/// template applied to serving-team states and the receiving team's
/// template applied to receiving-team states.
pub fn create_state_machine_from_teams(
    serving: &TeamTemplate,
    receiving: &TeamTemplate,
) -> Result<StateMachine, TemplateCompositionError> {
    compose(canonical_definition(), serving, receiving)
}

/// Overlay two templates on an arbitrary topology.
///
/// Every entry of both templates is checked against the topology whatever
/// role the template plays, and every defect is collected before failing.
/// Only the acting team's entry is applied to a state.
pub fn compose(
    topology: StateMachineBuilder,
    serving: &TeamTemplate,
    receiving: &TeamTemplate,
) -> Result<StateMachine, TemplateCompositionError> {
    let states: Vec<State> = topology.declared_states().to_vec();
    let known: BTreeMap<&str, &State> = states.iter().map(|s| (s.key.as_str(), s)).collect();

    let checked = if serving == receiving {
        vec![serving]
    } else {
        vec![serving, receiving]
    };

    let mut issues = Vec::new();
    for template in &checked {
        issues.extend(unknown_keys(template, &known));
    }

    let mut defaults: BTreeMap<&str, Vec<&Transition>> = BTreeMap::new();
    for (from, transition) in topology.declared_transitions() {
        defaults.entry(from.as_str()).or_default().push(transition);
    }

    let mut builder =
        StateMachineBuilder::new(topology.initial_state()).states(states.iter().cloned());

    for state in &states {
        let Some(outgoing) = defaults.get(state.key.as_str()) else {
            continue;
        };

        for template in &checked {
            if let Some(overrides) = template.resolve(&state.key) {
                issues.extend(entry_issues(template, &state.key, outgoing, &overrides));
            }
        }

        let acting = match state.team {
            TeamDesignation::Serving => serving,
            TeamDesignation::Receiving => receiving,
        };

        let transitions = match acting.resolve(&state.key) {
            Some(overrides) => merge(outgoing, &overrides),
            None => outgoing.iter().map(|t| (*t).clone()).collect(),
        };
        for transition in transitions {
            builder = builder.add_transition(&state.key, transition);
        }
    }

    if !issues.is_empty() {
        return Err(TemplateCompositionError::Invalid { issues });
    }

    let machine = builder.build()?;
    debug!(
        serving = %serving.name,
        receiving = %receiving.name,
        "composed state machine from team templates"
    );
    Ok(machine)
}

/// Default transitions of a state with the entry's probabilities applied.
fn merge(outgoing: &[&Transition], overrides: &StateOverrides) -> Vec<Transition> {
    outgoing
        .iter()
        .map(|default| {
            let mut transition = (*default).clone();
            if let Some(probability) = overrides.get(&transition.target) {
                transition.probability = *probability;
            }
            transition
        })
        .collect()
}

/// Defects of one resolved entry against the state's default transitions.
fn entry_issues(
    template: &TeamTemplate,
    state: &str,
    outgoing: &[&Transition],
    overrides: &StateOverrides,
) -> Vec<CompositionIssue> {
    let mut issues = Vec::new();
    let targets: BTreeSet<&str> = outgoing.iter().map(|t| t.target.as_str()).collect();

    for (target, probability) in overrides {
        if !targets.contains(target.as_str()) {
            issues.push(CompositionIssue::UnknownTarget {
                template: template.name.clone(),
                state: state.to_string(),
                target: target.clone(),
            });
        }
        let candidate = Transition::new(target.as_str(), *probability, outgoing[0].category);
        if !candidate.has_valid_probability() {
            issues.push(CompositionIssue::InvalidProbability {
                template: template.name.clone(),
                state: state.to_string(),
                target: target.clone(),
                probability: *probability,
            });
        }
    }

    let sum = probability_sum(&merge(outgoing, overrides));
    if !sums_to_one(sum) {
        issues.push(CompositionIssue::ProbabilitySum {
            template: template.name.clone(),
            state: state.to_string(),
            sum,
        });
    }
    issues
}

/// Template keys that name neither a state nor a state's mirror, or that
/// name a terminal state.
fn unknown_keys(
    template: &TeamTemplate,
    known: &BTreeMap<&str, &State>,
) -> Vec<CompositionIssue> {
    let mut issues = Vec::new();
    for key in template.overrides.keys() {
        let resolved = known
            .get(key.as_str())
            .or_else(|| known.get(mirror_key(key).as_str()));
        match resolved {
            None => issues.push(CompositionIssue::UnknownState {
                template: template.name.clone(),
                state: key.clone(),
            }),
            Some(state) if state.is_terminal() => issues.push(CompositionIssue::TerminalState {
                template: template.name.clone(),
                state: key.clone(),
            }),
            Some(_) => {}
        }
    }
    issues
}
