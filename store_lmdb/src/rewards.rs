//! LMDB implementation of RewardStore.

use jury_store::{RewardStore, StoreError, UserRewards};
use jury_types::{RewardAmount, UserId};

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

impl RewardStore for LmdbEnvironment {
    fn get_rewards(&self, user: &UserId) -> Result<UserRewards, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .rewards_db
            .get(&rtxn, user.as_str().as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(bincode::deserialize(bytes).map_err(LmdbError::from)?),
            None => Ok(UserRewards::empty(user.clone())),
        }
    }
}

impl LmdbEnvironment {
    /// Set a user's comment rewards, which are earned outside the case
    /// lifecycle. Case rewards are left as they are and the total is
    /// recomputed in the same write transaction.
    pub fn set_comment_rewards(
        &self,
        user: &UserId,
        amount: RewardAmount,
    ) -> Result<UserRewards, StoreError> {
        let key = user.as_str().as_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut rewards = match self.rewards_db.get(&wtxn, key).map_err(LmdbError::from)? {
            Some(bytes) => bincode::deserialize(bytes).map_err(LmdbError::from)?,
            None => UserRewards::empty(user.clone()),
        };
        rewards.set_comment_rewards(amount);
        let bytes = bincode::serialize(&rewards).map_err(LmdbError::from)?;
        self.rewards_db
            .put(&mut wtxn, key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(rewards)
    }
}
