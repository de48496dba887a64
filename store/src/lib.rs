//! Abstract storage traits for the jury case lifecycle.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits, usually
//! through an injected `Arc<dyn JuryStore>`.

pub mod case;
pub mod error;
pub mod rewards;
pub mod vote;

pub use case::{CaseClosure, CaseRecord, CaseStore, ClosureCommit};
pub use error::StoreError;
pub use rewards::{RewardStore, UserRewards};
pub use vote::{VoteRecord, VoteStore};

/// Everything the lifecycle needs from persistence, as one object-safe trait.
pub trait JuryStore: CaseStore + VoteStore + RewardStore + Send + Sync {}

impl<T> JuryStore for T where T: CaseStore + VoteStore + RewardStore + Send + Sync {}
