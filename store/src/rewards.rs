//! User reward ledger storage trait.

use crate::StoreError;
use jury_types::{RewardAmount, UserId};
use serde::{Deserialize, Serialize};

/// Running reward totals for one user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRewards {
    pub user: UserId,
    /// Earned from closed cases the user owns.
    pub case_rewards: RewardAmount,
    /// Earned from comments (maintained outside the case lifecycle).
    pub comment_rewards: RewardAmount,
    pub total: RewardAmount,
}

impl UserRewards {
    /// A ledger entry with nothing earned yet.
    pub fn empty(user: UserId) -> Self {
        Self {
            user,
            case_rewards: RewardAmount::ZERO,
            comment_rewards: RewardAmount::ZERO,
            total: RewardAmount::ZERO,
        }
    }

    /// Add a case reward to both the case total and the overall total.
    pub fn credit_case_reward(&mut self, amount: RewardAmount) {
        self.case_rewards = self.case_rewards.saturating_add(amount);
        self.total = self.total.saturating_add(amount);
    }

    /// Replace the externally maintained comment reward, keeping case
    /// rewards untouched and the total equal to their sum.
    pub fn set_comment_rewards(&mut self, amount: RewardAmount) {
        self.comment_rewards = amount;
        self.total = self.case_rewards.saturating_add(amount);
    }
}

/// Trait for reading the reward ledger.
///
/// Case rewards are only ever written through
/// [`CaseStore::commit_closure`](crate::CaseStore::commit_closure). Backends
/// may offer a way to set comment rewards, which never touches case rewards.
pub trait RewardStore {
    /// Get a user's reward totals; users with no entry read as all zeros.
    fn get_rewards(&self, user: &UserId) -> Result<UserRewards, StoreError>;
}
