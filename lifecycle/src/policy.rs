//! Closure policy: decides whether an open case should close now.

use jury_types::{CaseStatus, ClosureReason, LifecycleParams, Side, Timestamp, VoteTally};

/// What the policy decided for one case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClosureDecision {
    Remain,
    Close(ClosureReason),
}

impl ClosureDecision {
    pub fn reason(&self) -> Option<ClosureReason> {
        match self {
            Self::Remain => None,
            Self::Close(reason) => Some(*reason),
        }
    }
}

/// Evaluate the automatic closure rules. The first matching rule wins:
///
/// 1. a closed case stays as it is;
/// 2. a case at least `time_limit_secs` old closes on the time limit;
/// 3. a case with at least `threshold_min_votes` votes where either side holds
///    at least `threshold_bps` of them closes on the vote threshold;
/// 4. anything else remains open.
pub fn evaluate_closure(
    created_at: Timestamp,
    now: Timestamp,
    tally: &VoteTally,
    status: CaseStatus,
    params: &LifecycleParams,
) -> ClosureDecision {
    if !status.is_open() {
        return ClosureDecision::Remain;
    }

    if created_at.has_expired(params.time_limit_secs, now) {
        return ClosureDecision::Close(ClosureReason::AutoTimeLimit);
    }

    if params.meets_min_votes(tally)
        && (tally.share_at_least(Side::SideA, params.threshold_bps)
            || tally.share_at_least(Side::SideB, params.threshold_bps))
    {
        return ClosureDecision::Close(ClosureReason::AutoVoteThreshold);
    }

    ClosureDecision::Remain
}
