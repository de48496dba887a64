//! The case lifecycle facade.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use jury_store::{CaseRecord, JuryStore, StoreError, UserRewards};
use jury_types::{CaseId, LifecycleParams, UserId, VoteTally};

use crate::error::LifecycleError;
use crate::events::{EventBus, LifecycleEvent};
use crate::locks::CaseLocks;
use crate::tally::CaseView;

/// Owns everything a case needs between submission and closure: the store,
/// the parameters, the per-case locks and the event bus.
///
/// Operations live next to their concern: submission in
/// [`submission`](crate::submission), voting in [`ballot`](crate::ballot),
/// closing in [`closer`](crate::closer) and the periodic pass in
/// [`sweep`](crate::sweep). Every operation takes `now` explicitly.
pub struct CaseLifecycle {
    pub(crate) store: Arc<dyn JuryStore>,
    pub(crate) params: LifecycleParams,
    pub(crate) locks: CaseLocks,
    pub(crate) events: EventBus,
    pub(crate) id_nonce: AtomicU64,
}

impl CaseLifecycle {
    pub fn new(store: Arc<dyn JuryStore>, params: LifecycleParams) -> Self {
        Self {
            store,
            params,
            locks: CaseLocks::new(),
            events: EventBus::new(),
            id_nonce: AtomicU64::new(0),
        }
    }

    /// Register a listener. Must be done before the lifecycle is shared.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LifecycleEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    pub fn params(&self) -> &LifecycleParams {
        &self.params
    }

    pub fn store(&self) -> &Arc<dyn JuryStore> {
        &self.store
    }

    /// Load a case, mapping a missing record to [`LifecycleError::NotFound`].
    pub fn get_case(&self, id: &CaseId) -> Result<CaseRecord, LifecycleError> {
        match self.store.get_case(id) {
            Ok(case) => Ok(case),
            Err(StoreError::NotFound(_)) => Err(LifecycleError::NotFound(*id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Current per-side vote counts. Does not check that the case exists.
    pub fn current_tally(&self, id: &CaseId) -> Result<VoteTally, LifecycleError> {
        Ok(self.store.tally(id)?)
    }

    /// A case with its tally summary, as shown on the case page.
    pub fn case_view(&self, id: &CaseId) -> Result<CaseView, LifecycleError> {
        let case = self.get_case(id)?;
        let tally = self.current_tally(id)?;
        Ok(CaseView {
            case,
            tally: tally.into(),
        })
    }

    /// A user's reward ledger entry.
    pub fn rewards(&self, user: &UserId) -> Result<UserRewards, LifecycleError> {
        Ok(self.store.get_rewards(user)?)
    }
}
