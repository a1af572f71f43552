//! Built-in skill-level templates.
//!
//! Rally-phase entries are authored once from the serving side (`s_`) and
//! reflected for receive duty by the composer.

use super::TeamTemplate;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

pub const ELITE: &str = "elite";
pub const INTERMEDIATE: &str = "intermediate";
pub const BEGINNER: &str = "beginner";

/// Strong serving, clean side-out and high kill rates.
pub fn elite() -> TeamTemplate {
    TeamTemplate::new(ELITE)
        .with_state(
            "s_serve_ready",
            [
                ("s_serve_ace", dec!(0.10)),
                ("s_serve_error", dec!(0.08)),
                ("s_serve_in_play", dec!(0.82)),
            ],
        )
        .with_state(
            "s_serve_in_play",
            [
                ("r_reception_error", dec!(0.16)),
                ("r_reception_perfect", dec!(0.26)),
                ("r_reception_good", dec!(0.40)),
                ("r_reception_poor", dec!(0.18)),
            ],
        )
        .with_state(
            "r_reception_perfect",
            [
                ("r_set_error", dec!(0.01)),
                ("r_set_perfect", dec!(0.74)),
                ("r_set_good", dec!(0.25)),
            ],
        )
        .with_state(
            "r_reception_good",
            [
                ("r_set_perfect", dec!(0.40)),
                ("r_set_good", dec!(0.50)),
                ("r_set_poor", dec!(0.10)),
            ],
        )
        .with_state(
            "s_set_perfect",
            [
                ("s_attack_kill", dec!(0.52)),
                ("s_attack_error", dec!(0.05)),
                ("s_attack_blocked", dec!(0.13)),
                ("s_attack_defended", dec!(0.30)),
            ],
        )
        .with_state(
            "s_set_good",
            [
                ("s_attack_kill", dec!(0.36)),
                ("s_attack_error", dec!(0.08)),
                ("s_attack_blocked", dec!(0.20)),
                ("s_attack_defended", dec!(0.36)),
            ],
        )
        .with_state(
            "s_attack_blocked",
            [
                ("r_block_kill", dec!(0.16)),
                ("r_block_error", dec!(0.19)),
                ("r_block_touch", dec!(0.45)),
                ("s_cover", dec!(0.20)),
            ],
        )
        .with_state(
            "s_attack_defended",
            [
                ("r_dig_error", dec!(0.36)),
                ("r_dig_perfect", dec!(0.22)),
                ("r_dig_good", dec!(0.42)),
            ],
        )
        .with_state(
            "s_dig_perfect",
            [
                ("s_set_error", dec!(0.01)),
                ("s_set_perfect", dec!(0.70)),
                ("s_set_good", dec!(0.29)),
            ],
        )
        .with_state(
            "s_dig_good",
            [
                ("s_set_perfect", dec!(0.32)),
                ("s_set_good", dec!(0.53)),
                ("s_set_poor", dec!(0.15)),
            ],
        )
}

/// The canonical defaults, unchanged.
pub fn intermediate() -> TeamTemplate {
    TeamTemplate::new(INTERMEDIATE)
}

/// Error-prone serving and attacking, weaker ball control.
pub fn beginner() -> TeamTemplate {
    TeamTemplate::new(BEGINNER)
        .with_state(
            "s_serve_ready",
            [
                ("s_serve_ace", dec!(0.02)),
                ("s_serve_error", dec!(0.20)),
                ("s_serve_in_play", dec!(0.78)),
            ],
        )
        .with_state(
            "s_serve_in_play",
            [
                ("r_reception_error", dec!(0.08)),
                ("r_reception_perfect", dec!(0.40)),
                ("r_reception_good", dec!(0.38)),
                ("r_reception_poor", dec!(0.14)),
            ],
        )
        .with_state(
            "r_reception_perfect",
            [
                ("r_set_error", dec!(0.08)),
                ("r_set_perfect", dec!(0.47)),
                ("r_set_good", dec!(0.45)),
            ],
        )
        .with_state(
            "r_reception_good",
            [
                ("r_set_perfect", dec!(0.18)),
                ("r_set_good", dec!(0.57)),
                ("r_set_poor", dec!(0.25)),
            ],
        )
        .with_state(
            "s_set_perfect",
            [
                ("s_attack_kill", dec!(0.30)),
                ("s_attack_error", dec!(0.15)),
                ("s_attack_blocked", dec!(0.20)),
                ("s_attack_defended", dec!(0.35)),
            ],
        )
        .with_state(
            "s_set_good",
            [
                ("s_attack_kill", dec!(0.20)),
                ("s_attack_error", dec!(0.18)),
                ("s_attack_blocked", dec!(0.27)),
                ("s_attack_defended", dec!(0.35)),
            ],
        )
        .with_state(
            "s_attack_defended",
            [
                ("r_dig_error", dec!(0.22)),
                ("r_dig_perfect", dec!(0.34)),
                ("r_dig_good", dec!(0.44)),
            ],
        )
        .with_state(
            "s_dig_perfect",
            [
                ("s_set_error", dec!(0.08)),
                ("s_set_perfect", dec!(0.45)),
                ("s_set_good", dec!(0.47)),
            ],
        )
        .with_state(
            "s_cover",
            [("s_dig_poor", dec!(0.50)), ("s_dig_error", dec!(0.50))],
        )
}

/// Every built-in template keyed by name.
pub fn builtin_templates() -> BTreeMap<String, TeamTemplate> {
    [elite(), intermediate(), beginner()]
        .into_iter()
        .map(|template| (template.name.clone(), template))
        .collect()
}
