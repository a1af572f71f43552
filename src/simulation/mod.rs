//! Rally, match and batch simulation.
//!
//! A rally is a weighted random walk from the serve state to a terminal
//! state. A match repeats rallies: the rally winner scores and serves the
//! next point, until one team reaches the target score with the required
//! lead. Simulations only read the machine and own their RNG, so any number
//! of them can share one machine across threads.
//!
//! # Example
//!
//! ```rust
//! use rally_machine::definitions::create_canonical_state_machine;
//! use rally_machine::simulation::{simulate_match, simulate_rally};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let machine = create_canonical_state_machine();
//! let mut rng = ChaCha8Rng::seed_from_u64(7);
//!
//! let rally = simulate_rally(&machine, "s_serve_ready", &mut rng).unwrap();
//! assert!(machine.is_terminal_state(&rally.terminal_state));
//!
//! let record = simulate_match(&machine, 21, 2, &mut rng, None).unwrap();
//! assert!(record.is_complete());
//! ```

mod batch;
pub mod config;
pub mod error;
mod matches;
mod rally;

pub use batch::{simulate_matches, simulate_points, stream_rng, BatchSummary, PointSummary};
pub use config::{BatchConfig, MatchConfig, MatchConfigBuilder, MatchRules, RallyConfig};
pub use error::SimulationError;
pub use matches::{
    simulate_match, AbortReason, MatchRecord, MatchSimulator, MatchStatus, Matchup, PointRecord,
    Team,
};
pub use rally::{select_transition, simulate_rally, RallySimulator, RallyStep, RallyTrace};
