use jury_store::StoreError;
use jury_types::CaseId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("case {0} not found")]
    NotFound(CaseId),

    #[error("case {0} is already closed")]
    AlreadyClosed(CaseId),

    #[error("only the owner of case {0} can close it")]
    Unauthorized(CaseId),

    #[error("case {0} is closed and no longer accepts votes")]
    CaseClosed(CaseId),

    #[error("vote on case {0} is past its change window")]
    VoteLocked(CaseId),

    #[error("invalid case: {0}")]
    InvalidCase(String),

    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),
}
