//! Case storage trait.

use crate::StoreError;
use jury_types::{
    CaseId, CaseStatus, Category, ClosureReason, RewardAmount, Timestamp, UserId, Verdict,
};
use serde::{Deserialize, Serialize};

/// A stored case.
///
/// The status is derived from `closure`: a case is closed exactly when its
/// closure fields are present, so a half-closed record cannot be expressed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: CaseId,
    pub owner: UserId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub side_a_label: String,
    pub side_b_label: String,
    pub created_at: Timestamp,
    /// Set exactly once, when the case closes.
    pub closure: Option<CaseClosure>,
}

impl CaseRecord {
    pub fn status(&self) -> CaseStatus {
        match self.closure {
            Some(_) => CaseStatus::Closed,
            None => CaseStatus::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.closure.is_none()
    }

    /// The owner's reward; zero while the case is open.
    pub fn owner_reward(&self) -> RewardAmount {
        self.closure
            .as_ref()
            .map(|c| c.owner_reward)
            .unwrap_or(RewardAmount::ZERO)
    }
}

/// The fields written when a case closes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseClosure {
    pub closed_at: Timestamp,
    pub reason: ClosureReason,
    pub verdict: Verdict,
    /// Absolute gap between the two sides' vote shares, in whole percentage points.
    pub margin_percent: u8,
    pub owner_reward: RewardAmount,
}

/// Outcome of a conditional closure write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClosureCommit {
    /// The case was open; closure and reward credit were both written.
    Applied,
    /// The case was already closed; nothing was written.
    AlreadyClosed,
}

/// Trait for case storage operations.
pub trait CaseStore {
    /// Store a new case. Fails with [`StoreError::Duplicate`] if the id exists.
    fn insert_case(&self, case: &CaseRecord) -> Result<(), StoreError>;

    /// Get a case by id. Fails with [`StoreError::NotFound`] if absent.
    fn get_case(&self, id: &CaseId) -> Result<CaseRecord, StoreError>;

    /// Ids of open cases created at or before `cutoff`, oldest first.
    fn open_cases_created_before(&self, cutoff: Timestamp) -> Result<Vec<CaseId>, StoreError>;

    /// Close a case and credit its owner in one atomic step.
    ///
    /// The write is conditional on the stored case still being open. When it
    /// is, the closure fields are written and the owner's case reward and
    /// total are incremented by `closure.owner_reward`; either both happen or
    /// neither does. When it is not, nothing is written and
    /// [`ClosureCommit::AlreadyClosed`] is returned.
    fn commit_closure(
        &self,
        id: &CaseId,
        closure: &CaseClosure,
    ) -> Result<ClosureCommit, StoreError>;

    /// Total number of stored cases.
    fn case_count(&self) -> Result<u64, StoreError>;
}
