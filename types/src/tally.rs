//! Per-case vote counts.

use serde::{Deserialize, Serialize};

use crate::case::Side;

/// Basis points in 100%.
pub const BPS_SCALE: u64 = 10_000;

/// Current vote counts for the two sides of a case.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub side_a: u64,
    pub side_b: u64,
}

impl VoteTally {
    pub fn new(side_a: u64, side_b: u64) -> Self {
        Self { side_a, side_b }
    }

    pub fn total(&self) -> u64 {
        self.side_a.saturating_add(self.side_b)
    }

    pub fn count(&self, side: Side) -> u64 {
        match side {
            Side::SideA => self.side_a,
            Side::SideB => self.side_b,
        }
    }

    /// Add one vote for `side`.
    pub fn record(&mut self, side: Side) {
        match side {
            Side::SideA => self.side_a += 1,
            Side::SideB => self.side_b += 1,
        }
    }

    /// Whether `side` holds at least `threshold_bps` of the votes cast.
    ///
    /// Exact integer comparison; always false when no votes were cast.
    pub fn share_at_least(&self, side: Side, threshold_bps: u32) -> bool {
        let total = self.total();
        if total == 0 {
            return false;
        }
        (self.count(side) as u128) * (BPS_SCALE as u128)
            >= (threshold_bps as u128) * (total as u128)
    }

    /// Share of `side` as a whole percentage, rounded half-up, for display.
    ///
    /// An empty tally reads as an even 50/50 split.
    pub fn display_percent(&self, side: Side) -> u8 {
        let total = self.total() as u128;
        if total == 0 {
            return 50;
        }
        let count = self.count(side) as u128;
        ((200 * count + total) / (2 * total)) as u8
    }
}
