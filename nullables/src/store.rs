//! Nullable store: thread-safe in-memory storage for testing.

use jury_store::{
    CaseClosure, CaseRecord, CaseStore, ClosureCommit, RewardStore, StoreError, UserRewards,
    VoteRecord, VoteStore,
};
use jury_types::{CaseId, RewardAmount, Timestamp, UserId, VoteTally};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    cases: BTreeMap<CaseId, CaseRecord>,
    votes: HashMap<(CaseId, UserId), VoteRecord>,
    rewards: HashMap<UserId, UserRewards>,
}

/// An in-memory case + vote + reward store for testing.
///
/// All three tables sit behind one lock, so [`CaseStore::commit_closure`]
/// is atomic exactly as the LMDB write transaction is. Faults can be
/// injected to exercise failure paths.
pub struct NullStore {
    state: Mutex<State>,
    /// Number of upcoming `commit_closure` calls that should fail.
    failing_commits: AtomicU64,
    /// Cases whose reads and writes always fail.
    broken_cases: Mutex<HashSet<CaseId>>,
    /// Number of closures actually applied.
    applied_closures: AtomicU64,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            failing_commits: AtomicU64::new(0),
            broken_cases: Mutex::new(HashSet::new()),
            applied_closures: AtomicU64::new(0),
        }
    }

    /// Make the next `count` closure commits fail without writing anything.
    pub fn fail_next_commits(&self, count: u64) {
        self.failing_commits.store(count, Ordering::SeqCst);
    }

    /// Make every read or closure of `id` fail with a backend error.
    pub fn break_case(&self, id: CaseId) {
        self.broken_cases.lock().unwrap().insert(id);
    }

    /// How many closures have been applied so far.
    pub fn applied_closures(&self) -> u64 {
        self.applied_closures.load(Ordering::SeqCst)
    }

    /// Set a user's comment rewards; case rewards are left untouched.
    pub fn set_comment_rewards(&self, user: &UserId, amount: RewardAmount) -> UserRewards {
        let mut state = self.state.lock().unwrap();
        let rewards = state
            .rewards
            .entry(user.clone())
            .or_insert_with(|| UserRewards::empty(user.clone()));
        rewards.set_comment_rewards(amount);
        rewards.clone()
    }

    fn check_broken(&self, id: &CaseId) -> Result<(), StoreError> {
        if self.broken_cases.lock().unwrap().contains(id) {
            Err(StoreError::Backend(format!("injected fault for case {id}")))
        } else {
            Ok(())
        }
    }

    fn take_commit_fault(&self) -> bool {
        self.failing_commits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CaseStore for NullStore {
    fn insert_case(&self, case: &CaseRecord) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.cases.contains_key(&case.id) {
            return Err(StoreError::Duplicate(case.id.to_string()));
        }
        state.cases.insert(case.id, case.clone());
        Ok(())
    }

    fn get_case(&self, id: &CaseId) -> Result<CaseRecord, StoreError> {
        self.check_broken(id)?;
        self.state
            .lock()
            .unwrap()
            .cases
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn open_cases_created_before(&self, cutoff: Timestamp) -> Result<Vec<CaseId>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut open: Vec<(Timestamp, CaseId)> = state
            .cases
            .values()
            .filter(|c| c.is_open() && c.created_at <= cutoff)
            .map(|c| (c.created_at, c.id))
            .collect();
        open.sort();
        Ok(open.into_iter().map(|(_, id)| id).collect())
    }

    fn commit_closure(
        &self,
        id: &CaseId,
        closure: &CaseClosure,
    ) -> Result<ClosureCommit, StoreError> {
        self.check_broken(id)?;
        if self.take_commit_fault() {
            return Err(StoreError::Backend("injected commit failure".into()));
        }

        let mut state = self.state.lock().unwrap();
        let owner = {
            let case = state
                .cases
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            if !case.is_open() {
                return Ok(ClosureCommit::AlreadyClosed);
            }
            case.closure = Some(closure.clone());
            case.owner.clone()
        };
        state
            .rewards
            .entry(owner.clone())
            .or_insert_with(|| UserRewards::empty(owner))
            .credit_case_reward(closure.owner_reward);
        self.applied_closures.fetch_add(1, Ordering::SeqCst);
        Ok(ClosureCommit::Applied)
    }

    fn case_count(&self) -> Result<u64, StoreError> {
        Ok(self.state.lock().unwrap().cases.len() as u64)
    }
}

impl VoteStore for NullStore {
    fn put_vote(&self, vote: &VoteRecord) -> Result<(), StoreError> {
        self.state
            .lock()
            .unwrap()
            .votes
            .insert((vote.case_id, vote.voter.clone()), vote.clone());
        Ok(())
    }

    fn get_vote(&self, case_id: &CaseId, voter: &UserId) -> Result<Option<VoteRecord>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .votes
            .get(&(*case_id, voter.clone()))
            .cloned())
    }

    fn tally(&self, case_id: &CaseId) -> Result<VoteTally, StoreError> {
        self.check_broken(case_id)?;
        let state = self.state.lock().unwrap();
        let mut tally = VoteTally::default();
        for vote in state.votes.values().filter(|v| &v.case_id == case_id) {
            tally.record(vote.side);
        }
        Ok(tally)
    }
}

impl RewardStore for NullStore {
    fn get_rewards(&self, user: &UserId) -> Result<UserRewards, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .rewards
            .get(user)
            .cloned()
            .unwrap_or_else(|| UserRewards::empty(user.clone())))
    }
}
