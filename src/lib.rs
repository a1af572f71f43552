//! Rally Machine: a probabilistic state machine for beach-volleyball rallies
//!
//! A rally is modelled as a weighted random walk over a fixed graph of
//! states, from the serve to a terminal state that awards the point. Team
//! skill is expressed as templates that override transition probabilities;
//! the graph itself never changes.
//!
//! # Core Concepts
//!
//! - **State**: a rally situation keyed by acting team, phase and quality
//! - **Transition**: a weighted edge tagged with an action category
//! - **State Machine**: the validated, immutable graph; shared freely
//! - **Team Template**: per-state probability overrides for one team
//! - **Simulation**: rallies, matches and parallel batches driven by a
//!   caller-owned RNG
//!
//! # Example
//!
//! ```rust
//! use rally_machine::{create_state_machine_from_teams, simulate_match, TeamTemplate};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let machine =
//!     create_state_machine_from_teams(&TeamTemplate::elite(), &TeamTemplate::beginner()).unwrap();
//! assert!(machine.is_terminal_state("s_serve_ace"));
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(21);
//! let record = simulate_match(&machine, 21, 2, &mut rng, None).unwrap();
//! assert!(record.is_complete());
//! ```

pub mod analysis;
pub mod core;
pub mod definitions;
pub mod machine;
pub mod simulation;
pub mod templates;

// Re-export commonly used types
pub use core::{ActionCategory, Phase, State, TeamDesignation, TerminalOutcome, Transition};
pub use definitions::{create_canonical_state_machine, INITIAL_STATE};
pub use machine::{StateMachine, StateMachineBuilder, UnknownStateError, ValidationError};
pub use simulation::{
    simulate_match, simulate_matches, simulate_points, simulate_rally, MatchRecord, Matchup,
    RallyTrace, SimulationError, Team,
};
pub use templates::{create_state_machine_from_teams, TeamTemplate, TemplateCompositionError};
