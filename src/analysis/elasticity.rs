//! Win-rate elasticity of individual skills.

use super::config::{ElasticityConfig, WinRateBasis};
use super::error::AnalysisError;
use crate::machine::StateMachine;
use crate::simulation::{simulate_matches, simulate_points, Matchup, Team};
use crate::templates::{StateOverrides, TeamTemplate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Fractional digits kept when rescaling probabilities.
const RESCALE_DIGITS: u32 = 12;

/// Whose template holds the transition a stat measures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatOwner {
    /// The improved team acts in the state.
    Own,
    /// The opponent acts in the state; the improved team is the one reacting.
    Opponent,
}

/// A skill that can be trained, expressed as one transition probability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrainableStat {
    ServeAceRate,
    ForcedReceptionError,
    ReceptionPerfectRate,
    ReceptionGoodRate,
    PerfectSetFromReception,
    AttackKillFromPerfectSet,
    AttackKillFromGoodSet,
    DigPerfectRate,
    BlockKillRate,
    CoverSave,
}

impl TrainableStat {
    pub const ALL: [TrainableStat; 10] = [
        TrainableStat::ServeAceRate,
        TrainableStat::ForcedReceptionError,
        TrainableStat::ReceptionPerfectRate,
        TrainableStat::ReceptionGoodRate,
        TrainableStat::PerfectSetFromReception,
        TrainableStat::AttackKillFromPerfectSet,
        TrainableStat::AttackKillFromGoodSet,
        TrainableStat::DigPerfectRate,
        TrainableStat::BlockKillRate,
        TrainableStat::CoverSave,
    ];

    /// The `(state, target)` transition this stat scales.
    pub fn transition(self) -> (&'static str, &'static str) {
        match self {
            Self::ServeAceRate => ("s_serve_ready", "s_serve_ace"),
            Self::ForcedReceptionError => ("s_serve_in_play", "r_reception_error"),
            Self::ReceptionPerfectRate => ("s_serve_in_play", "r_reception_perfect"),
            Self::ReceptionGoodRate => ("s_serve_in_play", "r_reception_good"),
            Self::PerfectSetFromReception => ("r_reception_perfect", "r_set_perfect"),
            Self::AttackKillFromPerfectSet => ("s_set_perfect", "s_attack_kill"),
            Self::AttackKillFromGoodSet => ("s_set_good", "s_attack_kill"),
            Self::DigPerfectRate => ("s_attack_defended", "r_dig_perfect"),
            Self::BlockKillRate => ("s_attack_blocked", "r_block_kill"),
            Self::CoverSave => ("s_cover", "s_dig_poor"),
        }
    }

    pub fn owner(self) -> StatOwner {
        match self {
            Self::ReceptionPerfectRate
            | Self::ReceptionGoodRate
            | Self::DigPerfectRate
            | Self::BlockKillRate => StatOwner::Opponent,
            _ => StatOwner::Own,
        }
    }
}

impl fmt::Display for TrainableStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ServeAceRate => "serve ace rate",
            Self::ForcedReceptionError => "forced reception error",
            Self::ReceptionPerfectRate => "reception perfect rate",
            Self::ReceptionGoodRate => "reception good rate",
            Self::PerfectSetFromReception => "perfect set from reception",
            Self::AttackKillFromPerfectSet => "attack kill from perfect set",
            Self::AttackKillFromGoodSet => "attack kill from good set",
            Self::DigPerfectRate => "dig perfect rate",
            Self::BlockKillRate => "block kill rate",
            Self::CoverSave => "cover save",
        };
        write!(f, "{name}")
    }
}

/// Scale the probability of `state -> target` by `factor` and rescale its
/// siblings so the state still sums to exactly 1.
///
/// Siblings keep their relative weights. Each is rounded to 12 fractional
/// digits and the last sibling absorbs the rounding residual. The result is
/// a full override entry for `state`.
///
/// Fails with [`AnalysisError::Saturated`] when the scaled probability
/// leaves no positive share for the siblings, or when a lone transition
/// would no longer be certain.
pub fn boost_transition(
    machine: &StateMachine,
    state: &str,
    target: &str,
    factor: Decimal,
) -> Result<StateOverrides, AnalysisError> {
    let transitions = machine.get_next_states(state)?;
    let index = transitions
        .iter()
        .position(|t| t.target == target)
        .ok_or_else(|| AnalysisError::UnknownTransition {
            state: state.to_string(),
            target: target.to_string(),
        })?;

    let saturated = || AnalysisError::Saturated {
        state: state.to_string(),
        target: target.to_string(),
        factor,
    };

    let siblings: Vec<_> = transitions
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, t)| t)
        .collect();

    let boosted = (transitions[index].probability * factor).round_dp(RESCALE_DIGITS);
    let siblings_before: Decimal = siblings.iter().map(|t| t.probability).sum();
    let siblings_after = Decimal::ONE - boosted;

    if boosted <= Decimal::ZERO || boosted > Decimal::ONE {
        return Err(saturated());
    }
    if siblings.is_empty() {
        if boosted != Decimal::ONE {
            return Err(saturated());
        }
    } else if siblings_before <= Decimal::ZERO || siblings_after <= Decimal::ZERO {
        return Err(saturated());
    }

    let mut overrides = StateOverrides::new();
    overrides.insert(target.to_string(), boosted);

    let mut assigned = Decimal::ZERO;
    for (position, sibling) in siblings.iter().enumerate() {
        let probability = if position + 1 == siblings.len() {
            siblings_after - assigned
        } else {
            (sibling.probability * siblings_after / siblings_before).round_dp(RESCALE_DIGITS)
        };
        if probability <= Decimal::ZERO {
            return Err(saturated());
        }
        assigned += probability;
        overrides.insert(sibling.target.clone(), probability);
    }

    Ok(overrides)
}

/// Win-rate response of one trained stat.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElasticityResult {
    pub stat: TrainableStat,
    pub improvement: Decimal,
    pub baseline_win_rate: f64,
    pub improved_win_rate: f64,
    /// Relative win-rate change per relative change of the stat.
    pub elasticity: f64,
}

/// `base` with `stat` scaled by `1 + improvement`.
pub fn improved_template(
    base: &TeamTemplate,
    stat: TrainableStat,
    improvement: Decimal,
) -> Result<TeamTemplate, AnalysisError> {
    check_improvement(improvement)?;
    let reference = Matchup::from_templates(base, base)?;
    let (state, target) = stat.transition();
    let overrides = boost_transition(
        reference.machine_for(Team::A),
        state,
        target,
        Decimal::ONE + improvement,
    )?;

    let mut template = base.clone();
    template.name = format!("{} (+{} {})", base.name, improvement, stat);
    Ok(template.with_state(state, overrides))
}

pub(crate) fn check_improvement(improvement: Decimal) -> Result<(), AnalysisError> {
    if improvement.is_zero() || improvement <= Decimal::NEGATIVE_ONE {
        return Err(AnalysisError::InvalidImprovement(improvement));
    }
    Ok(())
}

/// Team A's share of points or matches against Team B.
pub fn win_rate(
    team_a: &TeamTemplate,
    team_b: &TeamTemplate,
    config: &ElasticityConfig,
) -> Result<f64, AnalysisError> {
    let matchup = Matchup::from_templates(team_a, team_b)?;
    let rate = match config.basis {
        WinRateBasis::Points => {
            simulate_points(&matchup, config.samples, config.seed)?.team_a_point_rate()
        }
        WinRateBasis::Matches => simulate_matches(&matchup, &config.batch())?.team_a_win_rate(),
    };
    Ok(rate)
}

fn elasticity_against(
    baseline_win_rate: f64,
    stat: TrainableStat,
    improvement: Decimal,
    base: &TeamTemplate,
    config: &ElasticityConfig,
) -> Result<ElasticityResult, AnalysisError> {
    let relative = improvement
        .to_f64()
        .ok_or(AnalysisError::InvalidImprovement(improvement))?;
    let trained = improved_template(base, stat, improvement)?;

    // Team A is always the improved side; opponent-held stats are trained
    // into Team B's template so they surface when A is the reacting team.
    let improved_win_rate = match stat.owner() {
        StatOwner::Own => win_rate(&trained, base, config)?,
        StatOwner::Opponent => win_rate(base, &trained, config)?,
    };

    let elasticity = (improved_win_rate - baseline_win_rate) / (baseline_win_rate * relative);
    debug!(%stat, baseline_win_rate, improved_win_rate, elasticity, "stat elasticity");

    Ok(ElasticityResult {
        stat,
        improvement,
        baseline_win_rate,
        improved_win_rate,
        elasticity,
    })
}

/// Elasticity of Team A's win rate to `stat`, improved by the relative
/// amount `improvement` (0.1 for +10%), against an unchanged `base` team.
///
/// Baseline and improved measurements share `config`, including its seed.
pub fn stat_elasticity(
    stat: TrainableStat,
    improvement: Decimal,
    base: &TeamTemplate,
    config: &ElasticityConfig,
) -> Result<ElasticityResult, AnalysisError> {
    check_improvement(improvement)?;
    let baseline = baseline_win_rate(base, config)?;
    elasticity_against(baseline, stat, improvement, base, config)
}

/// Elasticity of every [`TrainableStat`], largest absolute effect first.
pub fn run_elasticity_analysis(
    base: &TeamTemplate,
    improvement: Decimal,
    config: &ElasticityConfig,
) -> Result<Vec<ElasticityResult>, AnalysisError> {
    check_improvement(improvement)?;
    let baseline = baseline_win_rate(base, config)?;

    let mut results = TrainableStat::ALL
        .iter()
        .map(|&stat| elasticity_against(baseline, stat, improvement, base, config))
        .collect::<Result<Vec<_>, _>>()?;
    results.sort_by(|a, b| b.elasticity.abs().total_cmp(&a.elasticity.abs()));
    Ok(results)
}

fn baseline_win_rate(base: &TeamTemplate, config: &ElasticityConfig) -> Result<f64, AnalysisError> {
    let rate = win_rate(base, base, config)?;
    if rate <= 0.0 {
        return Err(AnalysisError::DegenerateBaseline);
    }
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ActionCategory, Phase, State, TeamDesignation, TerminalOutcome};
    use crate::definitions::create_canonical_state_machine;
    use crate::machine::validation::{probability_sum, sums_to_one};
    use crate::machine::StateMachineBuilder;
    use crate::templates::create_state_machine_from_teams;
    use rust_decimal_macros::dec;

    #[test]
    fn boost_rescales_siblings_proportionally() {
        let machine = create_canonical_state_machine();
        let overrides =
            boost_transition(&machine, "s_serve_ready", "s_serve_ace", dec!(2)).unwrap();

        assert_eq!(overrides["s_serve_ace"], dec!(0.08));
        // siblings 0.12 and 0.84 share the remaining 0.92 in ratio 1:7
        assert_eq!(overrides["s_serve_error"], dec!(0.115));
        assert_eq!(overrides["s_serve_in_play"], dec!(0.805));
        assert_eq!(overrides.values().copied().sum::<Decimal>(), Decimal::ONE);
    }

    #[test]
    fn boost_sums_exactly_to_one_with_residual() {
        let machine = create_canonical_state_machine();
        let overrides =
            boost_transition(&machine, "s_serve_in_play", "r_reception_error", dec!(1.1)).unwrap();
        assert_eq!(overrides.values().copied().sum::<Decimal>(), Decimal::ONE);
        assert_eq!(overrides["r_reception_error"], dec!(0.132));
    }

    #[test]
    fn boosted_overrides_compose() {
        let machine = create_canonical_state_machine();
        let overrides =
            boost_transition(&machine, "s_set_good", "s_attack_kill", dec!(1.3)).unwrap();
        let template = TeamTemplate::new("trained").with_state("s_set_good", overrides);

        let composed =
            create_state_machine_from_teams(&template, &TeamTemplate::intermediate()).unwrap();
        let set_good = composed.get_next_states("s_set_good").unwrap();
        assert!(sums_to_one(probability_sum(set_good)));
        assert_eq!(set_good[0].target, "s_attack_kill");
        assert_eq!(set_good[0].probability, dec!(0.377));
    }

    #[test]
    fn boost_past_one_is_saturated() {
        let machine = create_canonical_state_machine();
        let error =
            boost_transition(&machine, "s_set_perfect", "s_attack_kill", dec!(3)).unwrap_err();
        assert!(matches!(error, AnalysisError::Saturated { .. }));
    }

    /// A state within tolerance of 1 whose dominant edge is already certain.
    fn near_certain_machine() -> StateMachine {
        let point = |key| {
            State::terminal(
                key,
                TeamDesignation::Serving,
                Phase::Attack,
                TerminalOutcome::ActingTeamPoint,
            )
        };
        StateMachineBuilder::new("s_a")
            .state(State::continuation("s_a", TeamDesignation::Serving, Phase::Attack))
            .states([point("s_x"), point("s_y"), point("s_z")])
            .transition("s_a", "s_x", dec!(1), ActionCategory::Attack)
            .transition("s_a", "s_y", dec!(0.0000005), ActionCategory::Attack)
            .transition("s_a", "s_z", dec!(0.0000005), ActionCategory::Attack)
            .build()
            .unwrap()
    }

    #[test]
    fn certain_edge_leaves_no_room_for_siblings() {
        let machine = near_certain_machine();
        let error = boost_transition(&machine, "s_a", "s_x", dec!(1)).unwrap_err();
        assert!(matches!(error, AnalysisError::Saturated { .. }));
    }

    #[test]
    fn siblings_are_scaled_by_their_actual_sum() {
        let machine = near_certain_machine();
        let overrides = boost_transition(&machine, "s_a", "s_x", dec!(0.5)).unwrap();

        assert_eq!(overrides["s_x"], dec!(0.5));
        assert_eq!(overrides["s_y"], dec!(0.25));
        assert_eq!(overrides["s_z"], dec!(0.25));
    }

    #[test]
    fn boost_of_missing_edge_fails() {
        let machine = create_canonical_state_machine();
        let error =
            boost_transition(&machine, "s_serve_ready", "r_attack_kill", dec!(1.1)).unwrap_err();
        assert!(matches!(error, AnalysisError::UnknownTransition { .. }));

        let error = boost_transition(&machine, "s_nowhere", "s_serve_ace", dec!(1.1)).unwrap_err();
        assert!(matches!(error, AnalysisError::UnknownState(_)));
    }

    #[test]
    fn every_stat_names_a_canonical_transition() {
        let machine = create_canonical_state_machine();
        for stat in TrainableStat::ALL {
            let (state, target) = stat.transition();
            assert!(machine.is_valid_transition(state, target), "{stat}");
            let acting = machine.get_acting_team(state).unwrap();
            assert_eq!(acting.prefix(), &state[..2], "{stat}");
        }
    }

    #[test]
    fn reception_stats_belong_to_the_receiving_side() {
        assert_eq!(
            TrainableStat::ReceptionGoodRate.owner(),
            StatOwner::Opponent
        );
        assert_eq!(
            TrainableStat::ReceptionPerfectRate.owner(),
            StatOwner::Opponent
        );
        assert_eq!(TrainableStat::ForcedReceptionError.owner(), StatOwner::Own);

        let trained = improved_template(
            &TeamTemplate::intermediate(),
            TrainableStat::ReceptionGoodRate,
            dec!(0.1),
        )
        .unwrap();
        assert_eq!(
            trained.entry("s_serve_in_play").unwrap()["r_reception_good"],
            dec!(0.44)
        );
    }

    #[test]
    fn improved_template_keeps_base_entries() {
        let base = TeamTemplate::elite();
        let trained = improved_template(&base, TrainableStat::ServeAceRate, dec!(0.1)).unwrap();

        assert_eq!(
            trained.entry("s_serve_ready").unwrap()["s_serve_ace"],
            dec!(0.11)
        );
        assert_eq!(trained.entry("s_set_perfect"), base.entry("s_set_perfect"));
    }

    #[test]
    fn zero_improvement_is_rejected() {
        let error = stat_elasticity(
            TrainableStat::ServeAceRate,
            dec!(0),
            &TeamTemplate::intermediate(),
            &ElasticityConfig::points(10, 0),
        )
        .unwrap_err();
        assert!(matches!(error, AnalysisError::InvalidImprovement(_)));
    }

    #[test]
    fn point_rate_of_identical_teams_is_even() {
        let base = TeamTemplate::intermediate();
        let rate = win_rate(&base, &base, &ElasticityConfig::points(20_000, 5)).unwrap();
        assert!((rate - 0.5).abs() < 0.02, "{rate}");
    }

    #[test]
    fn better_attacking_raises_point_rate() {
        let result = stat_elasticity(
            TrainableStat::AttackKillFromPerfectSet,
            dec!(0.5),
            &TeamTemplate::intermediate(),
            &ElasticityConfig::points(20_000, 17),
        )
        .unwrap();

        assert!(result.improved_win_rate > result.baseline_win_rate);
        assert!(result.elasticity > 0.0);
    }

    #[test]
    fn better_attacking_raises_match_rate() {
        let result = stat_elasticity(
            TrainableStat::AttackKillFromPerfectSet,
            dec!(0.5),
            &TeamTemplate::intermediate(),
            &ElasticityConfig::matches(2_000, 17),
        )
        .unwrap();

        assert!(result.improved_win_rate > result.baseline_win_rate);
        assert!(result.elasticity > 0.0);
    }

    #[test]
    fn analysis_covers_every_stat_once() {
        let results = run_elasticity_analysis(
            &TeamTemplate::intermediate(),
            dec!(0.05),
            &ElasticityConfig::points(500, 3),
        )
        .unwrap();

        assert_eq!(results.len(), TrainableStat::ALL.len());
        assert!(results
            .windows(2)
            .all(|pair| pair[0].elasticity.abs() >= pair[1].elasticity.abs()));
    }
}
