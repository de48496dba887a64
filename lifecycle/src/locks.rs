//! Per-case mutual exclusion.
//!
//! Only one closure or vote for a given case runs its check-then-act sequence
//! at a time. Different cases never contend. Entries are dropped as soon as
//! nobody holds or waits on them, so the map stays as small as the number of
//! cases currently in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use jury_types::CaseId;

#[derive(Default)]
pub struct CaseLocks {
    locks: Mutex<HashMap<CaseId, Arc<Mutex<()>>>>,
}

impl CaseLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `id`.
    pub fn with_case<R>(&self, id: &CaseId, f: impl FnOnce() -> R) -> R {
        let entry = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Entry {
                owner: self,
                id: *id,
                lock: Arc::clone(locks.entry(*id).or_default()),
            }
        };

        // A panic in a previous holder leaves nothing half-written in the
        // store, so a poisoned lock is still usable.
        let _guard = entry.lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Number of cases currently locked or waited on.
    pub fn in_flight(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// A held reference to one case's lock. Dropped after the case guard, even
/// when the closure panics, and prunes the map entry if nobody else uses it.
struct Entry<'a> {
    owner: &'a CaseLocks,
    id: CaseId,
    lock: Arc<Mutex<()>>,
}

impl Drop for Entry<'_> {
    fn drop(&mut self) {
        let mut locks = self
            .owner
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one here: nobody else is waiting.
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.id);
        }
    }
}
