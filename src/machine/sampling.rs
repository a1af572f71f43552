//! Inverse-CDF sampling over ordered transitions.
//!
//! Each state gets a precomputed list of cumulative probability boundaries.
//! A uniform draw `u` in `[0, 1)` selects the first transition whose
//! boundary is strictly greater than `u`, so a draw landing exactly on a
//! boundary belongs to the following transition.

use crate::core::Transition;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of fractional digits in a uniform draw.
pub const DRAW_SCALE: u32 = 12;

const DRAW_RESOLUTION: i64 = 1_000_000_000_000;

/// Cumulative boundaries of one state's outgoing transitions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeDistribution {
    boundaries: Vec<Decimal>,
}

impl CumulativeDistribution {
    pub fn from_transitions(transitions: &[Transition]) -> Self {
        let mut running = Decimal::ZERO;
        let boundaries = transitions
            .iter()
            .map(|transition| {
                running += transition.probability;
                running
            })
            .collect();
        Self { boundaries }
    }

    pub fn boundaries(&self) -> &[Decimal] {
        &self.boundaries
    }

    /// Sum of all weights (the last boundary).
    pub fn total(&self) -> Decimal {
        self.boundaries.last().copied().unwrap_or(Decimal::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Index of the transition selected by `draw`.
    ///
    /// Draws at or past the last boundary (possible when the weights sum to
    /// slightly less than 1 within tolerance) select the last transition.
    /// Returns `None` only for an empty distribution.
    pub fn select(&self, draw: Decimal) -> Option<usize> {
        if self.boundaries.is_empty() {
            return None;
        }
        let index = self.boundaries.partition_point(|b| *b <= draw);
        Some(index.min(self.boundaries.len() - 1))
    }
}

/// Draw an exact decimal uniformly from `[0, 1)`.
pub fn draw_unit<R: Rng + ?Sized>(rng: &mut R) -> Decimal {
    Decimal::new(rng.gen_range(0..DRAW_RESOLUTION), DRAW_SCALE)
}
