//! Vote recording and the on-vote closure trigger.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use jury_store::VoteRecord;
use jury_types::{CaseId, Side, Timestamp, UserId, VoteTally};

use crate::closer::ClosedCase;
use crate::engine::CaseLifecycle;
use crate::error::LifecycleError;
use crate::events::LifecycleEvent;
use crate::policy::{evaluate_closure, ClosureDecision};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteKind {
    /// The voter's first vote on this case.
    New,
    /// An existing vote was confirmed or switched within the change window.
    Changed,
}

/// What happened to a submitted vote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteReceipt {
    pub kind: VoteKind,
    pub side: Side,
    /// Tally after the vote was applied.
    pub tally: VoteTally,
    /// Set when this vote closed the case.
    pub closure: Option<ClosedCase>,
}

impl CaseLifecycle {
    /// Record `voter`'s vote on a case.
    ///
    /// A first vote is stored and the closure policy is evaluated against the
    /// fresh tally, all under the case lock, so the threshold check always
    /// sees the vote that was just counted. Changing sides is allowed until
    /// `vote_change_window_secs` after the first vote and never triggers a
    /// closure.
    pub fn cast_vote(
        &self,
        case_id: &CaseId,
        voter: &UserId,
        side: Side,
        now: Timestamp,
    ) -> Result<VoteReceipt, LifecycleError> {
        self.locks.with_case(case_id, || {
            let case = self.get_case(case_id)?;
            if !case.is_open() {
                return Err(LifecycleError::CaseClosed(*case_id));
            }

            if let Some(existing) = self.store.get_vote(case_id, voter)? {
                return self.change_vote(existing, side, now);
            }

            self.store.put_vote(&VoteRecord {
                case_id: *case_id,
                voter: voter.clone(),
                side,
                cast_at: now,
                updated_at: now,
            })?;
            debug!(case = %case_id, voter = %voter, side = %side, "vote recorded");
            self.events.emit(&LifecycleEvent::VoteRecorded {
                case_id: *case_id,
                voter: voter.clone(),
                side,
            });

            let tally = self.store.tally(case_id)?;
            let closure = match evaluate_closure(
                case.created_at,
                now,
                &tally,
                case.status(),
                &self.params,
            ) {
                ClosureDecision::Remain => None,
                ClosureDecision::Close(reason) => {
                    match self.close_locked(case_id, reason, now) {
                        Ok(closed) => Some(closed),
                        // The vote stands; the next vote or the sweep retries.
                        Err(e) => {
                            warn!(case = %case_id, error = %e, "on-vote closure failed");
                            None
                        }
                    }
                }
            };

            Ok(VoteReceipt {
                kind: VoteKind::New,
                side,
                tally,
                closure,
            })
        })
    }

    fn change_vote(
        &self,
        existing: VoteRecord,
        side: Side,
        now: Timestamp,
    ) -> Result<VoteReceipt, LifecycleError> {
        let case_id = existing.case_id;
        if existing.cast_at.elapsed_since(now) > self.params.vote_change_window_secs {
            return Err(LifecycleError::VoteLocked(case_id));
        }

        if existing.side != side {
            let from = existing.side;
            let voter = existing.voter.clone();
            self.store.put_vote(&VoteRecord {
                side,
                updated_at: now,
                ..existing
            })?;
            debug!(case = %case_id, voter = %voter, from = %from, to = %side, "vote changed");
            self.events.emit(&LifecycleEvent::VoteChanged {
                case_id,
                voter,
                from,
                to: side,
            });
        }

        Ok(VoteReceipt {
            kind: VoteKind::Changed,
            side,
            tally: self.store.tally(&case_id)?,
            closure: None,
        })
    }
}
