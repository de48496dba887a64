//! The case closer: the only path from OPEN to CLOSED.
//!
//! Manual, on-vote and sweep closures all end up in [`CaseLifecycle::close_locked`],
//! which must run under the case's lock. The store's conditional write is the
//! last word on whether this call closed the case: if another process got
//! there first the store reports it and nothing is written twice.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use jury_store::{CaseClosure, ClosureCommit};
use jury_types::{CaseId, ClosureReason, RewardAmount, Timestamp, UserId, Verdict, VoteTally};

use crate::engine::CaseLifecycle;
use crate::error::LifecycleError;
use crate::events::LifecycleEvent;
use crate::verdict::calculate_verdict;

/// A closure this process applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedCase {
    pub case_id: CaseId,
    pub owner: UserId,
    pub reason: ClosureReason,
    pub verdict: Verdict,
    pub margin_percent: u8,
    pub owner_reward: RewardAmount,
    pub closed_at: Timestamp,
    /// The tally the verdict was computed from.
    pub tally: VoteTally,
}

impl CaseLifecycle {
    /// Close a case for `reason`.
    ///
    /// Does not consult the closure policy; callers decide that the case
    /// should close. Returns [`LifecycleError::AlreadyClosed`] without touching
    /// anything if the case is no longer open.
    pub fn close_case(
        &self,
        id: &CaseId,
        reason: ClosureReason,
        now: Timestamp,
    ) -> Result<ClosedCase, LifecycleError> {
        self.locks
            .with_case(id, || self.close_locked(id, reason, now))
    }

    /// Close a case at its owner's request.
    ///
    /// Anyone other than the owner gets [`LifecycleError::Unauthorized`]; the
    /// closure policy is skipped.
    pub fn close_by_owner(
        &self,
        id: &CaseId,
        requester: &UserId,
        now: Timestamp,
    ) -> Result<ClosedCase, LifecycleError> {
        self.locks.with_case(id, || {
            let case = self.get_case(id)?;
            if &case.owner != requester {
                return Err(LifecycleError::Unauthorized(*id));
            }
            self.close_locked(id, ClosureReason::ManualByOwner, now)
        })
    }

    /// Body of every closure. The caller holds the lock for `id`.
    pub(crate) fn close_locked(
        &self,
        id: &CaseId,
        reason: ClosureReason,
        now: Timestamp,
    ) -> Result<ClosedCase, LifecycleError> {
        let case = self.get_case(id)?;
        if !case.is_open() {
            debug!(case = %id, "close requested for a closed case");
            return Err(LifecycleError::AlreadyClosed(*id));
        }

        let tally = self.store.tally(id)?;
        let outcome = calculate_verdict(&tally, &self.params);
        let closure = CaseClosure {
            closed_at: now,
            reason,
            verdict: outcome.verdict,
            margin_percent: outcome.margin_percent,
            owner_reward: outcome.owner_reward,
        };

        match self.store.commit_closure(id, &closure)? {
            ClosureCommit::Applied => {}
            ClosureCommit::AlreadyClosed => {
                debug!(case = %id, "case was closed by a concurrent writer");
                return Err(LifecycleError::AlreadyClosed(*id));
            }
        }

        let closed = ClosedCase {
            case_id: *id,
            owner: case.owner,
            reason,
            verdict: outcome.verdict,
            margin_percent: outcome.margin_percent,
            owner_reward: outcome.owner_reward,
            closed_at: now,
            tally,
        };
        info!(
            case = %id,
            reason = %reason,
            verdict = %closed.verdict,
            margin = closed.margin_percent,
            side_a = tally.side_a,
            side_b = tally.side_b,
            reward = %closed.owner_reward,
            "case closed"
        );
        self.events.emit(&LifecycleEvent::CaseClosed(closed.clone()));
        Ok(closed)
    }
}
