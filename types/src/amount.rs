//! Reward amounts.
//!
//! Rewards are fixed-point integers in cents (hundredths of a currency unit)
//! so ledger arithmetic never touches floating point. Reward *rates* are
//! expressed in micro-units, which are rounded to cents when a reward is
//! materialised.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Micro-units per cent.
pub const MICROS_PER_CENT: u64 = 10_000;

/// A non-negative reward, stored in cents.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RewardAmount(u64);

impl RewardAmount {
    pub const ZERO: Self = Self(0);

    pub fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Convert a micro-unit quantity to cents, rounding half-up.
    pub fn from_micros_rounded(micros: u64) -> Self {
        Self(micros.saturating_add(MICROS_PER_CENT / 2) / MICROS_PER_CENT)
    }

    pub fn cents(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for RewardAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}
