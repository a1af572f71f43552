//! Sensitivity of outcomes to individual skills.
//!
//! A [`TrainableStat`] names one transition probability. Training it by a
//! relative amount rescales that probability in a copy of the team's
//! template (siblings shrink proportionally so the state still sums to 1),
//! and the elasticity compares the win rates of the trained team and the
//! unchanged team against the same opponent:
//!
//! ```text
//! elasticity = (improved - baseline) / (baseline * improvement)
//! ```
//!
//! Win rates are measured over independent points by default, which reacts
//! to small skill changes far more than match outcomes do. A consistency run
//! repeats the whole analysis under several seeds and reports the spread.
//!
//! # Example
//!
//! ```rust
//! use rally_machine::analysis::{stat_elasticity, ElasticityConfig, TrainableStat};
//! use rally_machine::TeamTemplate;
//! use rust_decimal_macros::dec;
//!
//! let result = stat_elasticity(
//!     TrainableStat::AttackKillFromPerfectSet,
//!     dec!(0.1),
//!     &TeamTemplate::intermediate(),
//!     &ElasticityConfig::points(2_000, 7),
//! )
//! .unwrap();
//! assert!(result.baseline_win_rate > 0.0);
//! ```

pub mod config;
mod consistency;
mod elasticity;
pub mod error;

pub use config::{ElasticityConfig, WinRateBasis};
pub use consistency::{elasticity_consistency, ConsistencySummary};
pub use elasticity::{
    boost_transition, improved_template, run_elasticity_analysis, stat_elasticity, win_rate,
    ElasticityResult, StatOwner, TrainableStat,
};
pub use error::AnalysisError;
