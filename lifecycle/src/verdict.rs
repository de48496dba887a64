//! Verdict calculator.
//!
//! Turns a vote tally into a verdict, a margin and the owner's reward. Pure
//! and infallible: every pair of counts has exactly one outcome.

use serde::{Deserialize, Serialize};

use jury_types::{LifecycleParams, RewardAmount, Verdict, VoteTally};

/// The result of resolving a tally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictOutcome {
    pub verdict: Verdict,
    /// `|A% − B%|` rounded half-up to a whole percentage point, in `0..=100`.
    pub margin_percent: u8,
    pub owner_reward: RewardAmount,
}

impl VerdictOutcome {
    /// The outcome of a case nobody voted on.
    pub const EMPTY: Self = Self {
        verdict: Verdict::Tied,
        margin_percent: 0,
        owner_reward: RewardAmount::ZERO,
    };
}

/// Resolve `tally` into a verdict, margin and owner reward.
///
/// A side wins when it holds strictly more than half of the votes; an exact
/// split is a tie. The owner is paid only when side A wins: side A is the
/// owner's own framing of the dispute, and the reward is
/// `(A − B) × reward_micros_per_net_vote`, rounded half-up to cents.
pub fn calculate_verdict(tally: &VoteTally, params: &LifecycleParams) -> VerdictOutcome {
    let total = tally.total();
    if total == 0 {
        return VerdictOutcome::EMPTY;
    }

    let (a, b) = (tally.side_a, tally.side_b);
    let verdict = if a > b {
        Verdict::SideAWins
    } else if b > a {
        Verdict::SideBWins
    } else {
        Verdict::Tied
    };

    // round(100·|a−b| / total) in exact integer arithmetic
    let diff = a.abs_diff(b) as u128;
    let total = total as u128;
    let margin_percent = ((200 * diff + total) / (2 * total)) as u8;

    let owner_reward = match verdict {
        Verdict::SideAWins => params.reward_for_net_votes(a - b),
        Verdict::SideBWins | Verdict::Tied => RewardAmount::ZERO,
    };

    VerdictOutcome {
        verdict,
        margin_percent,
        owner_reward,
    }
}
