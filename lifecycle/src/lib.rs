//! Case lifecycle and verdict resolution.
//!
//! A case opens when its owner submits it, collects one vote per voter, and
//! closes exactly once: manually by its owner, when a new vote pushes one side
//! past the vote-share threshold, or when the periodic sweep finds it past the
//! time limit. All three paths go through the same closer, which computes the
//! verdict from a fresh tally and credits the owner in one atomic store write.
//!
//! The pure pieces ([`calculate_verdict`], [`evaluate_closure`]) never fail
//! and never touch storage. Everything stateful hangs off [`CaseLifecycle`].

pub mod ballot;
pub mod closer;
pub mod engine;
pub mod error;
pub mod events;
pub mod locks;
pub mod policy;
pub mod submission;
pub mod sweep;
pub mod tally;
pub mod verdict;

pub use ballot::{VoteKind, VoteReceipt};
pub use closer::ClosedCase;
pub use engine::CaseLifecycle;
pub use error::LifecycleError;
pub use events::{EventBus, LifecycleEvent};
pub use locks::CaseLocks;
pub use policy::{evaluate_closure, ClosureDecision};
pub use submission::{CaseSubmission, DEFAULT_SIDE_A_LABEL, DEFAULT_SIDE_B_LABEL};
pub use sweep::SweepReport;
pub use tally::{CaseView, TallySummary};
pub use verdict::{calculate_verdict, VerdictOutcome};
