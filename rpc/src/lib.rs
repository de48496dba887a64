//! HTTP API for the jury node.
//!
//! Provides endpoints for:
//! - Case submission and case views (with tally summary)
//! - Voting, including the on-vote closure
//! - Manual closure by the case owner
//! - User reward ledgers
//! - Prometheus metrics
//!
//! The caller's identity arrives already authenticated in the `x-user-id`
//! header.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use server::{router, RpcServer, RpcState, USER_ID_HEADER};
