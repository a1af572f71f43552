//! Rally states and the attributes attached to them.
//!
//! A state is identified by a human-readable key such as
//! `r_reception_perfect`: the prefix names the acting team (`s_` for the
//! serving team, `r_` for the receiving team), the rest names the phase and
//! the quality of the outcome. The key is only an identifier; every
//! attribute the engine relies on is stored explicitly on the record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key prefix for states acted by the serving team.
pub const SERVING_PREFIX: &str = "s_";

/// Key prefix for states acted by the receiving team.
pub const RECEIVING_PREFIX: &str = "r_";

/// Which side of a single rally acts in a state.
///
/// Within a rally the two teams are only distinguished by who served.
/// Match-level identities (Team A / Team B) are mapped onto these by the
/// match simulator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamDesignation {
    Serving,
    Receiving,
}

impl TeamDesignation {
    /// The other side of the net.
    pub fn opponent(self) -> Self {
        match self {
            Self::Serving => Self::Receiving,
            Self::Receiving => Self::Serving,
        }
    }

    /// Key prefix used by states this side acts in.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Serving => SERVING_PREFIX,
            Self::Receiving => RECEIVING_PREFIX,
        }
    }

    /// Infer the acting side from a state key prefix.
    pub fn from_key(key: &str) -> Option<Self> {
        if key.starts_with(SERVING_PREFIX) {
            Some(Self::Serving)
        } else if key.starts_with(RECEIVING_PREFIX) {
            Some(Self::Receiving)
        } else {
            None
        }
    }
}

impl fmt::Display for TeamDesignation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serving => f.write_str("serving"),
            Self::Receiving => f.write_str("receiving"),
        }
    }
}

/// Phase of play a state belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Serve,
    Reception,
    Set,
    Attack,
    /// Digs and blocks.
    Defense,
    /// Freeballs, covers and overpasses.
    Transition,
}

/// Who is awarded the point when a rally ends in a terminal state.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalOutcome {
    /// The acting team won the point (ace, kill, block kill).
    ActingTeamPoint,
    /// The acting team lost the point (errors and violations).
    OpponentPoint,
}

/// Whether a state continues the rally or ends it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "outcome")]
pub enum StateKind {
    Continuation,
    Terminal(TerminalOutcome),
}

/// A single state of the rally graph.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct State {
    pub key: String,
    pub team: TeamDesignation,
    pub phase: Phase,
    pub kind: StateKind,
}

impl State {
    /// Create a continuation state.
    pub fn continuation(key: impl Into<String>, team: TeamDesignation, phase: Phase) -> Self {
        Self {
            key: key.into(),
            team,
            phase,
            kind: StateKind::Continuation,
        }
    }

    /// Create a terminal state with an explicit scoring outcome.
    pub fn terminal(
        key: impl Into<String>,
        team: TeamDesignation,
        phase: Phase,
        outcome: TerminalOutcome,
    ) -> Self {
        Self {
            key: key.into(),
            team,
            phase,
            kind: StateKind::Terminal(outcome),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, StateKind::Terminal(_))
    }

    /// Scoring outcome, `None` for continuation states.
    pub fn outcome(&self) -> Option<TerminalOutcome> {
        match self.kind {
            StateKind::Terminal(outcome) => Some(outcome),
            StateKind::Continuation => None,
        }
    }

    /// Side awarded the point if the rally ends here.
    pub fn point_winner(&self) -> Option<TeamDesignation> {
        self.outcome().map(|outcome| match outcome {
            TerminalOutcome::ActingTeamPoint => self.team,
            TerminalOutcome::OpponentPoint => self.team.opponent(),
        })
    }
}

/// Swap the acting-team prefix of a state key (`s_set_good` ↔ `r_set_good`).
///
/// Keys without a team prefix are returned unchanged.
pub fn mirror_key(key: &str) -> String {
    if let Some(rest) = key.strip_prefix(SERVING_PREFIX) {
        format!("{RECEIVING_PREFIX}{rest}")
    } else if let Some(rest) = key.strip_prefix(RECEIVING_PREFIX) {
        format!("{SERVING_PREFIX}{rest}")
    } else {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent_is_an_involution() {
        assert_eq!(
            TeamDesignation::Serving.opponent(),
            TeamDesignation::Receiving
        );
        assert_eq!(
            TeamDesignation::Receiving.opponent().opponent(),
            TeamDesignation::Receiving
        );
    }

    #[test]
    fn designation_is_inferred_from_prefix() {
        assert_eq!(
            TeamDesignation::from_key("s_serve_ready"),
            Some(TeamDesignation::Serving)
        );
        assert_eq!(
            TeamDesignation::from_key("r_dig_good"),
            Some(TeamDesignation::Receiving)
        );
        assert_eq!(TeamDesignation::from_key("serve_ready"), None);
    }

    #[test]
    fn terminal_outcome_determines_point_winner() {
        let ace = State::terminal(
            "s_serve_ace",
            TeamDesignation::Serving,
            Phase::Serve,
            TerminalOutcome::ActingTeamPoint,
        );
        let error = State::terminal(
            "r_reception_error",
            TeamDesignation::Receiving,
            Phase::Reception,
            TerminalOutcome::OpponentPoint,
        );

        assert!(ace.is_terminal());
        assert_eq!(ace.point_winner(), Some(TeamDesignation::Serving));
        assert_eq!(error.point_winner(), Some(TeamDesignation::Serving));
    }

    #[test]
    fn continuation_has_no_point_winner() {
        let state = State::continuation("s_serve_ready", TeamDesignation::Serving, Phase::Serve);
        assert!(!state.is_terminal());
        assert_eq!(state.outcome(), None);
        assert_eq!(state.point_winner(), None);
    }

    #[test]
    fn mirror_key_swaps_prefix() {
        assert_eq!(mirror_key("s_set_good"), "r_set_good");
        assert_eq!(mirror_key("r_attack_blocked"), "s_attack_blocked");
        assert_eq!(mirror_key("unprefixed"), "unprefixed");
    }

    #[test]
    fn state_serializes_correctly() {
        let state = State::terminal(
            "r_block_kill",
            TeamDesignation::Receiving,
            Phase::Defense,
            TerminalOutcome::ActingTeamPoint,
        );
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: State = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
