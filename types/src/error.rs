//! Parse errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid case id: {0}")]
    InvalidCaseId(String),

    #[error("invalid user id: {0}")]
    InvalidUserId(String),

    #[error("unknown side: {0}")]
    UnknownSide(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),
}
