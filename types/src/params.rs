//! Lifecycle parameters: the knobs that decide when a case closes and how
//! much its owner earns.

use serde::{Deserialize, Serialize};

use crate::amount::RewardAmount;
use crate::tally::VoteTally;

/// Seconds in a day.
pub const DAY_SECS: u64 = 24 * 3600;

/// All parameters consulted by the case lifecycle.
///
/// Every field has a serde default so a partial `[lifecycle]` table in the
/// node configuration only overrides what it names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleParams {
    // ── Closure policy ───────────────────────────────────────────────────
    /// Maximum lifetime of an open case in seconds. Default: 7 days.
    pub time_limit_secs: u64,

    /// Minimum total votes before the vote-share threshold can close a case.
    pub threshold_min_votes: u64,

    /// Vote share (basis points) either side must reach to close early.
    /// Default: 9000 (90%).
    pub threshold_bps: u32,

    // ── Rewards ──────────────────────────────────────────────────────────
    /// Owner reward per net favourable vote, in micro-units.
    /// Default: 1000 (0.001 per net vote).
    pub reward_micros_per_net_vote: u64,

    // ── Voting ───────────────────────────────────────────────────────────
    /// How long after casting a voter may still change sides. Default: 24 hours.
    pub vote_change_window_secs: u64,
}

impl LifecycleParams {
    /// Reward earned for `net_votes` net favourable votes, rounded to cents.
    pub fn reward_for_net_votes(&self, net_votes: u64) -> RewardAmount {
        RewardAmount::from_micros_rounded(net_votes.saturating_mul(self.reward_micros_per_net_vote))
    }

    /// Whether `tally` has enough votes for the share threshold to apply.
    pub fn meets_min_votes(&self, tally: &VoteTally) -> bool {
        tally.total() >= self.threshold_min_votes
    }
}

impl Default for LifecycleParams {
    fn default() -> Self {
        Self {
            time_limit_secs: 7 * DAY_SECS,
            threshold_min_votes: 50,
            threshold_bps: 9000, // 90%
            reward_micros_per_net_vote: 1_000,
            vote_change_window_secs: DAY_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reward_is_a_tenth_of_a_cent_per_vote() {
        let params = LifecycleParams::default();
        assert_eq!(params.reward_for_net_votes(20).cents(), 2);
        assert_eq!(params.reward_for_net_votes(1_000).cents(), 100);
        assert_eq!(params.reward_for_net_votes(4).cents(), 0);
        assert_eq!(params.reward_for_net_votes(5).cents(), 1);
    }

    #[test]
    fn min_votes_is_inclusive() {
        let params = LifecycleParams::default();
        assert!(!params.meets_min_votes(&VoteTally::new(49, 0)));
        assert!(params.meets_min_votes(&VoteTally::new(48, 2)));
    }
}
