//! Fundamental types for the jury case lifecycle.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! case and user identifiers, timestamps, reward amounts, lifecycle parameters,
//! vote tallies, and the closed enums describing a case's state.

pub mod amount;
pub mod case;
pub mod error;
pub mod id;
pub mod params;
pub mod tally;
pub mod time;

pub use amount::RewardAmount;
pub use case::{CaseStatus, Category, ClosureReason, Side, Verdict};
pub use error::TypeError;
pub use id::{CaseId, UserId};
pub use params::LifecycleParams;
pub use tally::VoteTally;
pub use time::{Clock, SystemClock, Timestamp};
