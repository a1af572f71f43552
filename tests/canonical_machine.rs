//! Structural guarantees of the canonical rally machine.

use rally_machine::core::{TeamDesignation, TerminalOutcome};
use rally_machine::machine::validation::probability_sum;
use rally_machine::templates::builtin_templates;
use rally_machine::{create_canonical_state_machine, create_state_machine_from_teams, INITIAL_STATE};
use rust_decimal::Decimal;
use std::collections::{BTreeSet, VecDeque};

#[test]
fn every_state_is_terminal_or_sums_to_one() {
    let machine = create_canonical_state_machine();
    for state in machine.states() {
        let outgoing = machine.get_next_states(&state.key).unwrap();
        if machine.is_terminal_state(&state.key) {
            assert!(
                outgoing.is_empty(),
                "{} is terminal with transitions",
                state.key
            );
            assert!(state.is_terminal());
        } else {
            assert_eq!(probability_sum(outgoing), Decimal::ONE, "{}", state.key);
        }
    }
}

#[test]
fn every_state_is_reachable_from_the_serve() {
    let machine = create_canonical_state_machine();
    let mut seen = BTreeSet::from([INITIAL_STATE.to_string()]);
    let mut queue = VecDeque::from([INITIAL_STATE.to_string()]);

    while let Some(key) = queue.pop_front() {
        for transition in machine.get_next_states(&key).unwrap() {
            if seen.insert(transition.target.clone()) {
                queue.push_back(transition.target.clone());
            }
        }
    }

    let all: BTreeSet<String> = machine.states().map(|s| s.key.clone()).collect();
    assert_eq!(seen, all);
}

#[test]
fn validation_reports_no_issues() {
    let machine = create_canonical_state_machine();
    let report = machine.validate();
    assert!(report.is_valid());
    assert!(report.issues().is_empty(), "{:?}", report.issues());
}

#[test]
fn service_ace_awards_the_server() {
    let machine = create_canonical_state_machine();

    assert!(machine.is_terminal_state("s_serve_ace"));
    assert!(machine.get_next_states("s_serve_ace").unwrap().is_empty());
    assert_eq!(
        machine.get_acting_team("s_serve_ace").unwrap(),
        TeamDesignation::Serving
    );
    assert_eq!(
        machine.terminal_outcome("s_serve_ace").unwrap(),
        Some(TerminalOutcome::ActingTeamPoint)
    );
    assert_eq!(
        machine.point_winner("s_serve_ace").unwrap(),
        Some(TeamDesignation::Serving)
    );
}

#[test]
fn unknown_keys_are_errors() {
    let machine = create_canonical_state_machine();
    assert!(machine.get_next_states("s_timeout").is_err());
    assert!(machine.get_acting_team("s_timeout").is_err());
    assert!(!machine.is_terminal_state("s_timeout"));
}

#[test]
fn composed_machines_share_the_canonical_topology() {
    let canonical = create_canonical_state_machine();
    let templates = builtin_templates();

    for serving in templates.values() {
        for receiving in templates.values() {
            let machine = create_state_machine_from_teams(serving, receiving).unwrap();
            assert_eq!(machine.state_count(), canonical.state_count());
            assert_eq!(machine.transition_count(), canonical.transition_count());
            assert_eq!(machine.terminal_states(), canonical.terminal_states());
            assert!(machine.validate().is_valid());

            for state in canonical.states() {
                let targets = |m: &rally_machine::StateMachine| {
                    m.get_next_states(&state.key)
                        .unwrap()
                        .iter()
                        .map(|t| (t.target.clone(), t.category))
                        .collect::<Vec<_>>()
                };
                assert_eq!(targets(&machine), targets(&canonical));
            }
        }
    }
}
