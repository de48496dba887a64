//! LMDB implementation of CaseStore.
//!
//! Open cases are additionally indexed in `open_cases_db` under
//! `created_at.to_be_bytes() ++ case_id`, so the sweep walks only open cases
//! in creation order and stops at the cutoff. The index entry is removed in
//! the same transaction that writes the closure.

use heed::RoTxn;

use jury_store::{CaseClosure, CaseRecord, CaseStore, ClosureCommit, StoreError, UserRewards};
use jury_types::{CaseId, Timestamp};

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

const OPEN_KEY_LEN: usize = 8 + CaseId::LEN;

/// Build the open-case index key `created_at_be ++ case_id`.
pub(crate) fn open_case_key(created_at: Timestamp, id: &CaseId) -> [u8; OPEN_KEY_LEN] {
    let mut key = [0u8; OPEN_KEY_LEN];
    key[..8].copy_from_slice(&created_at.as_secs().to_be_bytes());
    key[8..].copy_from_slice(id.as_bytes());
    key
}

impl LmdbEnvironment {
    pub(crate) fn read_case(&self, rtxn: &RoTxn, id: &CaseId) -> Result<CaseRecord, LmdbError> {
        let val = self
            .cases_db
            .get(rtxn, id.as_bytes())?
            .ok_or_else(|| LmdbError::NotFound(format!("case {id}")))?;
        Ok(bincode::deserialize(val)?)
    }
}

impl CaseStore for LmdbEnvironment {
    fn insert_case(&self, case: &CaseRecord) -> Result<(), StoreError> {
        let bytes = bincode::serialize(case).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .cases_db
            .get(&wtxn, case.id.as_bytes())
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(case.id.to_string()));
        }
        self.cases_db
            .put(&mut wtxn, case.id.as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        if case.is_open() {
            self.open_cases_db
                .put(&mut wtxn, &open_case_key(case.created_at, &case.id), &[])
                .map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_case(&self, id: &CaseId) -> Result<CaseRecord, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.read_case(&rtxn, id)?)
    }

    fn open_cases_created_before(&self, cutoff: Timestamp) -> Result<Vec<CaseId>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.open_cases_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut due = Vec::new();
        for result in iter {
            let (key, _) = result.map_err(LmdbError::from)?;
            if key.len() != OPEN_KEY_LEN {
                return Err(StoreError::Corruption(format!(
                    "open case index key has length {}",
                    key.len()
                )));
            }
            let mut ts = [0u8; 8];
            ts.copy_from_slice(&key[..8]);
            if u64::from_be_bytes(ts) > cutoff.as_secs() {
                break;
            }
            let mut id = [0u8; CaseId::LEN];
            id.copy_from_slice(&key[8..]);
            due.push(CaseId::new(id));
        }
        Ok(due)
    }

    fn commit_closure(
        &self,
        id: &CaseId,
        closure: &CaseClosure,
    ) -> Result<ClosureCommit, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut case = self.read_case(&wtxn, id)?;
        if !case.is_open() {
            // Dropping the transaction aborts it.
            return Ok(ClosureCommit::AlreadyClosed);
        }
        case.closure = Some(closure.clone());

        let owner_key = case.owner.as_str().as_bytes();
        let mut rewards = match self
            .rewards_db
            .get(&wtxn, owner_key)
            .map_err(LmdbError::from)?
        {
            Some(bytes) => bincode::deserialize(bytes).map_err(LmdbError::from)?,
            None => UserRewards::empty(case.owner.clone()),
        };
        rewards.credit_case_reward(closure.owner_reward);

        let case_bytes = bincode::serialize(&case).map_err(LmdbError::from)?;
        let reward_bytes = bincode::serialize(&rewards).map_err(LmdbError::from)?;
        self.cases_db
            .put(&mut wtxn, id.as_bytes(), &case_bytes)
            .map_err(LmdbError::from)?;
        self.rewards_db
            .put(&mut wtxn, owner_key, &reward_bytes)
            .map_err(LmdbError::from)?;
        self.open_cases_db
            .delete(&mut wtxn, &open_case_key(case.created_at, id))
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(ClosureCommit::Applied)
    }

    fn case_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.cases_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
