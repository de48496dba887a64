//! Vote storage trait.

use crate::StoreError;
use jury_types::{CaseId, Side, Timestamp, UserId, VoteTally};
use serde::{Deserialize, Serialize};

/// One voter's current position on one case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub case_id: CaseId,
    pub voter: UserId,
    pub side: Side,
    /// When the vote was first cast; the change window is measured from here.
    pub cast_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Trait for vote storage.
///
/// Keys are `(case, voter)` pairs; storing a vote for an existing pair
/// replaces it.
pub trait VoteStore {
    /// Insert or replace the vote for `(vote.case_id, vote.voter)`.
    fn put_vote(&self, vote: &VoteRecord) -> Result<(), StoreError>;

    /// Get a voter's vote on a case, if any.
    fn get_vote(&self, case_id: &CaseId, voter: &UserId) -> Result<Option<VoteRecord>, StoreError>;

    /// Count the votes on a case per side.
    fn tally(&self, case_id: &CaseId) -> Result<VoteTally, StoreError>;
}
