//! LMDB implementation of VoteStore.
//!
//! Key format: `case_id ++ voter.as_bytes()`. Case ids have a fixed length,
//! so a prefix scan on the case id yields exactly that case's votes.

use std::ops::Bound;

use jury_store::{StoreError, VoteRecord, VoteStore};
use jury_types::{CaseId, UserId, VoteTally};

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

fn vote_key(case_id: &CaseId, voter: &UserId) -> Vec<u8> {
    let voter = voter.as_str().as_bytes();
    let mut key = Vec::with_capacity(CaseId::LEN + voter.len());
    key.extend_from_slice(case_id.as_bytes());
    key.extend_from_slice(voter);
    key
}

impl VoteStore for LmdbEnvironment {
    fn put_vote(&self, vote: &VoteRecord) -> Result<(), StoreError> {
        let key = vote_key(&vote.case_id, &vote.voter);
        let bytes = bincode::serialize(vote).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.votes_db
            .put(&mut wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_vote(&self, case_id: &CaseId, voter: &UserId) -> Result<Option<VoteRecord>, StoreError> {
        let key = vote_key(case_id, voter);
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self.votes_db.get(&rtxn, &key).map_err(LmdbError::from)? {
            Some(bytes) => Ok(Some(
                bincode::deserialize(bytes).map_err(LmdbError::from)?,
            )),
            None => Ok(None),
        }
    }

    fn tally(&self, case_id: &CaseId) -> Result<VoteTally, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let prefix: &[u8] = case_id.as_bytes();
        let bounds = (Bound::Included(prefix), Bound::Unbounded);
        let iter = self
            .votes_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;
        let mut tally = VoteTally::default();
        for result in iter {
            let (key, val) = result.map_err(LmdbError::from)?;
            if !key.starts_with(prefix) {
                break;
            }
            let vote: VoteRecord = bincode::deserialize(val).map_err(LmdbError::from)?;
            tally.record(vote.side);
        }
        Ok(tally)
    }
}
