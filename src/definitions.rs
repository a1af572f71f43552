//! Canonical rally topology and default probabilities.
//!
//! The reference graph has 30 continuation states and 17 terminal states
//! connected by 93 transitions. The rally phases after the reception
//! (set, attack, block, dig, cover, freeball) exist once per side with the
//! same default weights; serve, reception and overpass are one-sided.
//!
//! Default probabilities are skill-independent and every state sums to
//! exactly 1.

use crate::core::{ActionCategory, Phase, State, TeamDesignation, TerminalOutcome};
use crate::machine::{StateMachine, StateMachineBuilder};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Key of the state every rally starts from.
pub const INITIAL_STATE: &str = "s_serve_ready";

/// One row of the default transition table.
pub type TransitionRow = (String, String, Decimal, ActionCategory);

/// Build the canonical state machine with default probabilities.
pub fn create_canonical_state_machine() -> StateMachine {
    canonical_definition().build_unvalidated()
}

/// Canonical topology and weights, not yet built.
pub fn canonical_definition() -> StateMachineBuilder {
    let mut builder = StateMachineBuilder::new(INITIAL_STATE).states(canonical_states());
    for (from, to, probability, category) in canonical_transitions() {
        builder = builder.transition(from, to, probability, category);
    }
    builder
}

fn key(side: TeamDesignation, name: &str) -> String {
    format!("{}{}", side.prefix(), name)
}

/// All 47 canonical states.
pub fn canonical_states() -> Vec<State> {
    use Phase::{Attack, Defense, Reception, Serve, Set, Transition};
    use TeamDesignation::{Receiving, Serving};
    use TerminalOutcome::{ActingTeamPoint, OpponentPoint};

    let mut states = vec![
        State::continuation("s_serve_ready", Serving, Serve),
        State::continuation("s_serve_in_play", Serving, Serve),
        State::continuation("r_reception_perfect", Receiving, Reception),
        State::continuation("r_reception_good", Receiving, Reception),
        State::continuation("r_reception_poor", Receiving, Reception),
        State::continuation("r_overpass", Receiving, Transition),
        State::terminal("s_serve_ace", Serving, Serve, ActingTeamPoint),
        State::terminal("s_serve_error", Serving, Serve, OpponentPoint),
        State::terminal("r_reception_error", Receiving, Reception, OpponentPoint),
    ];

    for side in [Serving, Receiving] {
        states.extend([
            State::continuation(key(side, "set_perfect"), side, Set),
            State::continuation(key(side, "set_good"), side, Set),
            State::continuation(key(side, "set_poor"), side, Set),
            State::continuation(key(side, "attack_blocked"), side, Attack),
            State::continuation(key(side, "attack_defended"), side, Attack),
            State::continuation(key(side, "attack_shot"), side, Attack),
            State::continuation(key(side, "block_touch"), side, Defense),
            State::continuation(key(side, "dig_perfect"), side, Defense),
            State::continuation(key(side, "dig_good"), side, Defense),
            State::continuation(key(side, "dig_poor"), side, Defense),
            State::continuation(key(side, "cover"), side, Transition),
            State::continuation(key(side, "freeball"), side, Transition),
            State::terminal(key(side, "set_error"), side, Set, OpponentPoint),
            State::terminal(key(side, "attack_kill"), side, Attack, ActingTeamPoint),
            State::terminal(key(side, "attack_error"), side, Attack, OpponentPoint),
            State::terminal(key(side, "block_kill"), side, Defense, ActingTeamPoint),
            State::terminal(key(side, "block_error"), side, Defense, OpponentPoint),
            State::terminal(key(side, "dig_error"), side, Defense, OpponentPoint),
            State::terminal(key(side, "net_violation"), side, Transition, OpponentPoint),
        ]);
    }

    states
}

/// All 93 canonical transitions with default probabilities.
pub fn canonical_transitions() -> Vec<TransitionRow> {
    use ActionCategory::{Attack, Dig, Reception, Serve, Set, Transition};

    let row = |from: &str, to: &str, p: Decimal, category: ActionCategory| -> TransitionRow {
        (from.to_string(), to.to_string(), p, category)
    };

    let mut rows = vec![
        row("s_serve_ready", "s_serve_ace", dec!(0.04), Serve),
        row("s_serve_ready", "s_serve_error", dec!(0.12), Serve),
        row("s_serve_ready", "s_serve_in_play", dec!(0.84), Serve),
        row(
            "s_serve_in_play",
            "r_reception_error",
            dec!(0.12),
            Reception,
        ),
        row(
            "s_serve_in_play",
            "r_reception_perfect",
            dec!(0.33),
            Reception,
        ),
        row("s_serve_in_play", "r_reception_good", dec!(0.40), Reception),
        row("s_serve_in_play", "r_reception_poor", dec!(0.15), Reception),
        row("r_reception_perfect", "r_set_error", dec!(0.03), Set),
        row("r_reception_perfect", "r_set_perfect", dec!(0.62), Set),
        row("r_reception_perfect", "r_set_good", dec!(0.35), Set),
        row("r_reception_good", "r_set_perfect", dec!(0.30), Set),
        row("r_reception_good", "r_set_good", dec!(0.55), Set),
        row("r_reception_good", "r_set_poor", dec!(0.15), Set),
        row("r_reception_poor", "r_set_poor", dec!(0.55), Set),
        row("r_reception_poor", "r_overpass", dec!(0.15), Transition),
        row("r_reception_poor", "r_freeball", dec!(0.30), Transition),
        row("r_overpass", "s_attack_kill", dec!(0.50), Attack),
        row("r_overpass", "s_dig_good", dec!(0.40), Dig),
        row("r_overpass", "s_net_violation", dec!(0.10), Transition),
    ];

    for side in [TeamDesignation::Serving, TeamDesignation::Receiving] {
        rows.extend(rally_phase_transitions(side));
    }

    rows
}

/// Transitions of the phases both sides play, from `side`'s perspective.
fn rally_phase_transitions(side: TeamDesignation) -> Vec<TransitionRow> {
    use ActionCategory::{Attack, Block, Dig, Set, Transition};

    let opponent = side.opponent();
    let own = |name: &str| key(side, name);
    let opp = |name: &str| key(opponent, name);

    vec![
        (own("set_perfect"), own("attack_kill"), dec!(0.42), Attack),
        (own("set_perfect"), own("attack_error"), dec!(0.08), Attack),
        (own("set_perfect"), own("attack_blocked"), dec!(0.17), Attack),
        (own("set_perfect"), own("attack_defended"), dec!(0.33), Attack),
        (own("set_good"), own("attack_kill"), dec!(0.29), Attack),
        (own("set_good"), own("attack_error"), dec!(0.11), Attack),
        (own("set_good"), own("attack_blocked"), dec!(0.24), Attack),
        (own("set_good"), own("attack_defended"), dec!(0.36), Attack),
        (own("set_poor"), own("attack_shot"), dec!(0.55), Attack),
        (own("set_poor"), own("attack_error"), dec!(0.20), Attack),
        (own("set_poor"), own("freeball"), dec!(0.25), Transition),
        (own("attack_blocked"), opp("block_kill"), dec!(0.22), Block),
        (own("attack_blocked"), opp("block_error"), dec!(0.15), Block),
        (own("attack_blocked"), opp("block_touch"), dec!(0.45), Block),
        (own("attack_blocked"), own("cover"), dec!(0.18), Dig),
        (own("attack_defended"), opp("dig_error"), dec!(0.30), Dig),
        (own("attack_defended"), opp("dig_perfect"), dec!(0.28), Dig),
        (own("attack_defended"), opp("dig_good"), dec!(0.42), Dig),
        (own("attack_shot"), opp("dig_perfect"), dec!(0.35), Dig),
        (own("attack_shot"), opp("dig_good"), dec!(0.45), Dig),
        (own("attack_shot"), opp("dig_error"), dec!(0.20), Dig),
        (own("block_touch"), own("dig_good"), dec!(0.70), Dig),
        (own("block_touch"), own("dig_poor"), dec!(0.30), Dig),
        (own("cover"), own("dig_poor"), dec!(0.65), Dig),
        (own("cover"), own("dig_error"), dec!(0.35), Dig),
        (own("dig_perfect"), own("set_error"), dec!(0.03), Set),
        (own("dig_perfect"), own("set_perfect"), dec!(0.60), Set),
        (own("dig_perfect"), own("set_good"), dec!(0.37), Set),
        (own("dig_good"), own("set_perfect"), dec!(0.25), Set),
        (own("dig_good"), own("set_good"), dec!(0.55), Set),
        (own("dig_good"), own("set_poor"), dec!(0.20), Set),
        (own("dig_poor"), own("set_error"), dec!(0.15), Set),
        (own("dig_poor"), own("set_poor"), dec!(0.50), Set),
        (own("dig_poor"), own("freeball"), dec!(0.35), Transition),
        (own("freeball"), opp("dig_perfect"), dec!(0.60), Dig),
        (own("freeball"), opp("dig_good"), dec!(0.35), Dig),
        (own("freeball"), opp("net_violation"), dec!(0.05), Transition),
    ]
}
