//! End-to-end lifecycle behaviour against the in-memory store.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier, Mutex};

use jury_lifecycle::{
    calculate_verdict, evaluate_closure, CaseLifecycle, CaseSubmission, ClosureDecision,
    LifecycleError, LifecycleEvent, VoteKind,
};
use jury_nullables::NullStore;
use jury_store::{CaseRecord, CaseStore, JuryStore, RewardStore, UserRewards};
use jury_types::params::DAY_SECS;
use jury_types::{
    CaseStatus, Category, ClosureReason, LifecycleParams, Side, Timestamp, UserId, Verdict,
    VoteTally,
};

const T0: u64 = 1_700_000_000;

fn owner() -> UserId {
    UserId::new("owner")
}

fn submission() -> CaseSubmission {
    CaseSubmission {
        title: "Who keeps the security deposit?".into(),
        description: "We moved out early and the landlord refunded one of us.".into(),
        category: Category::RoommateDisputes,
        side_a_label: Some("Split it".into()),
        side_b_label: Some("Finder keeps".into()),
    }
}

fn setup() -> (Arc<NullStore>, CaseLifecycle, CaseRecord) {
    let store = Arc::new(NullStore::new());
    let lifecycle = CaseLifecycle::new(
        Arc::clone(&store) as Arc<dyn JuryStore>,
        LifecycleParams::default(),
    );
    let case = lifecycle
        .open_case(&owner(), &submission(), Timestamp::new(T0))
        .unwrap();
    (store, lifecycle, case)
}

/// Cast `n` first votes for `side` from voters named `{prefix}{i}`.
fn cast(lifecycle: &CaseLifecycle, case: &CaseRecord, prefix: &str, side: Side, n: u64, at: u64) {
    for i in 0..n {
        lifecycle
            .cast_vote(
                &case.id,
                &UserId::new(format!("{prefix}{i}")),
                side,
                Timestamp::new(at),
            )
            .unwrap();
    }
}

// ---------------------------------------------------------------------------
// Verdicts
// ---------------------------------------------------------------------------

#[test]
fn manual_close_with_side_a_majority_credits_owner() {
    let (store, lifecycle, case) = setup();
    cast(&lifecycle, &case, "a", Side::SideA, 6, T0 + 10);
    cast(&lifecycle, &case, "b", Side::SideB, 4, T0 + 10);
    // 60 vs 40 scaled down: verdict rules are ratio based
    let closed = lifecycle
        .close_by_owner(&case.id, &owner(), Timestamp::new(T0 + 100))
        .unwrap();

    assert_eq!(closed.verdict, Verdict::SideAWins);
    assert_eq!(closed.margin_percent, 20);
    assert_eq!(closed.reason, ClosureReason::ManualByOwner);

    let stored = store.get_case(&case.id).unwrap();
    let closure = stored.closure.unwrap();
    assert_eq!(closure.closed_at, Timestamp::new(T0 + 100));
    assert_eq!(closure.verdict, Verdict::SideAWins);
    assert_eq!(
        store.get_rewards(&owner()).unwrap().case_rewards,
        closed.owner_reward
    );
}

#[test]
fn sixty_forty_pays_two_cents() {
    let outcome = calculate_verdict(&VoteTally::new(60, 40), &LifecycleParams::default());
    assert_eq!(outcome.verdict, Verdict::SideAWins);
    assert_eq!(outcome.margin_percent, 20);
    assert_eq!(outcome.owner_reward.cents(), 2);
    assert_eq!(outcome.owner_reward.to_string(), "0.02");
}

#[test]
fn forty_sixty_pays_nothing() {
    let outcome = calculate_verdict(&VoteTally::new(40, 60), &LifecycleParams::default());
    assert_eq!(outcome.verdict, Verdict::SideBWins);
    assert_eq!(outcome.margin_percent, 20);
    assert!(outcome.owner_reward.is_zero());
}

#[test]
fn closing_without_votes_is_a_tie() {
    let (store, lifecycle, case) = setup();
    let closed = lifecycle
        .close_by_owner(&case.id, &owner(), Timestamp::new(T0 + 5))
        .unwrap();

    assert_eq!(closed.verdict, Verdict::Tied);
    assert_eq!(closed.margin_percent, 0);
    assert!(closed.owner_reward.is_zero());
    assert_eq!(store.get_rewards(&owner()).unwrap(), UserRewards::empty(owner()));
}

// ---------------------------------------------------------------------------
// Closure policy
// ---------------------------------------------------------------------------

#[test]
fn eight_day_old_case_closes_on_time_limit() {
    let decision = evaluate_closure(
        Timestamp::new(T0),
        Timestamp::new(T0 + 8 * DAY_SECS),
        &VoteTally::new(3, 1),
        CaseStatus::Open,
        &LifecycleParams::default(),
    );
    assert_eq!(decision, ClosureDecision::Close(ClosureReason::AutoTimeLimit));
}

#[test]
fn lopsided_young_case_closes_on_threshold() {
    let decision = evaluate_closure(
        Timestamp::new(T0),
        Timestamp::new(T0 + 3600),
        &VoteTally::new(48, 4),
        CaseStatus::Open,
        &LifecycleParams::default(),
    );
    assert_eq!(
        decision,
        ClosureDecision::Close(ClosureReason::AutoVoteThreshold)
    );
}

// ---------------------------------------------------------------------------
// On-vote trigger
// ---------------------------------------------------------------------------

#[test]
fn threshold_vote_closes_case_from_the_vote_path() {
    let (store, lifecycle, case) = setup();
    cast(&lifecycle, &case, "b", Side::SideB, 5, T0 + 60);
    cast(&lifecycle, &case, "a", Side::SideA, 44, T0 + 60);
    // 49 votes: below the minimum however lopsided
    assert!(store.get_case(&case.id).unwrap().is_open());

    // 50th vote: 45 vs 5, exactly 90% for side A
    let receipt = lifecycle
        .cast_vote(&case.id, &UserId::new("a44"), Side::SideA, Timestamp::new(T0 + 3600))
        .unwrap();

    assert_eq!(receipt.kind, VoteKind::New);
    assert_eq!(receipt.tally, VoteTally::new(45, 5));
    let closed = receipt.closure.expect("vote should close the case");
    assert_eq!(closed.reason, ClosureReason::AutoVoteThreshold);
    assert_eq!(closed.verdict, Verdict::SideAWins);
    assert_eq!(closed.margin_percent, 80);
    // 40 net votes at 0.001 = 0.04
    assert_eq!(closed.owner_reward.cents(), 4);
    assert_eq!(store.get_rewards(&owner()).unwrap().total.cents(), 4);
}

#[test]
fn first_vote_on_an_expired_case_closes_it_on_time() {
    let (_store, lifecycle, case) = setup();
    let receipt = lifecycle
        .cast_vote(
            &case.id,
            &UserId::new("late"),
            Side::SideB,
            Timestamp::new(T0 + 7 * DAY_SECS),
        )
        .unwrap();
    let closed = receipt.closure.unwrap();
    assert_eq!(closed.reason, ClosureReason::AutoTimeLimit);
    assert_eq!(closed.verdict, Verdict::SideBWins);
}

#[test]
fn votes_on_closed_case_are_rejected() {
    let (_store, lifecycle, case) = setup();
    lifecycle
        .cast_vote(&case.id, &UserId::new("v"), Side::SideA, Timestamp::new(T0 + 1))
        .unwrap();
    lifecycle
        .close_by_owner(&case.id, &owner(), Timestamp::new(T0 + 2))
        .unwrap();

    let new_vote = lifecycle.cast_vote(&case.id, &UserId::new("w"), Side::SideA, Timestamp::new(T0 + 3));
    let change = lifecycle.cast_vote(&case.id, &UserId::new("v"), Side::SideB, Timestamp::new(T0 + 3));

    assert!(matches!(new_vote, Err(LifecycleError::CaseClosed(_))));
    assert!(matches!(change, Err(LifecycleError::CaseClosed(_))));
    assert_eq!(lifecycle.current_tally(&case.id).unwrap(), VoteTally::new(1, 0));
}

#[test]
fn vote_can_change_within_a_day_and_not_after() {
    let (_store, lifecycle, case) = setup();
    let voter = UserId::new("fickle");
    lifecycle
        .cast_vote(&case.id, &voter, Side::SideA, Timestamp::new(T0))
        .unwrap();

    let changed = lifecycle
        .cast_vote(&case.id, &voter, Side::SideB, Timestamp::new(T0 + DAY_SECS))
        .unwrap();
    assert_eq!(changed.kind, VoteKind::Changed);
    assert_eq!(changed.tally, VoteTally::new(0, 1));
    assert!(changed.closure.is_none());

    let locked = lifecycle.cast_vote(&case.id, &voter, Side::SideA, Timestamp::new(T0 + DAY_SECS + 1));
    assert!(matches!(locked, Err(LifecycleError::VoteLocked(_))));
    assert_eq!(lifecycle.current_tally(&case.id).unwrap(), VoteTally::new(0, 1));
}

#[test]
fn repeating_the_same_side_changes_nothing() {
    let (_store, lifecycle, case) = setup();
    let voter = UserId::new("steady");
    lifecycle
        .cast_vote(&case.id, &voter, Side::SideB, Timestamp::new(T0))
        .unwrap();
    let again = lifecycle
        .cast_vote(&case.id, &voter, Side::SideB, Timestamp::new(T0 + 60))
        .unwrap();
    assert_eq!(again.kind, VoteKind::Changed);
    assert_eq!(again.tally, VoteTally::new(0, 1));
}

#[test]
fn vote_change_never_triggers_closure() {
    let (store, lifecycle, case) = setup();
    cast(&lifecycle, &case, "a", Side::SideA, 45, T0 + 60);
    cast(&lifecycle, &case, "b", Side::SideB, 5, T0 + 60);
    // 45/50 closed the case on the 50th vote
    assert!(!store.get_case(&case.id).unwrap().is_open());

    let (store, lifecycle, case) = setup();
    cast(&lifecycle, &case, "a", Side::SideA, 44, T0 + 60);
    cast(&lifecycle, &case, "b", Side::SideB, 6, T0 + 60);
    assert!(store.get_case(&case.id).unwrap().is_open());

    // b0 switches to A: 45 vs 5 would meet the threshold, but edits don't trigger
    let receipt = lifecycle
        .cast_vote(&case.id, &UserId::new("b0"), Side::SideA, Timestamp::new(T0 + 120))
        .unwrap();
    assert_eq!(receipt.tally, VoteTally::new(45, 5));
    assert!(receipt.closure.is_none());
    assert!(store.get_case(&case.id).unwrap().is_open());
}

#[test]
fn voting_on_unknown_case_is_not_found() {
    let (_store, lifecycle, _case) = setup();
    let result = lifecycle.cast_vote(
        &jury_types::CaseId::new([0xab; 16]),
        &UserId::new("v"),
        Side::SideA,
        Timestamp::new(T0),
    );
    assert!(matches!(result, Err(LifecycleError::NotFound(_))));
}

// ---------------------------------------------------------------------------
// Manual closure
// ---------------------------------------------------------------------------

#[test]
fn only_the_owner_may_close() {
    let (store, lifecycle, case) = setup();
    let result = lifecycle.close_by_owner(&case.id, &UserId::new("stranger"), Timestamp::new(T0 + 1));
    assert!(matches!(result, Err(LifecycleError::Unauthorized(_))));
    assert!(store.get_case(&case.id).unwrap().is_open());
}

#[test]
fn second_close_is_already_closed_and_changes_nothing() {
    let (store, lifecycle, case) = setup();
    cast(&lifecycle, &case, "a", Side::SideA, 30, T0 + 1);
    cast(&lifecycle, &case, "b", Side::SideB, 10, T0 + 1);

    let first = lifecycle
        .close_by_owner(&case.id, &owner(), Timestamp::new(T0 + 100))
        .unwrap();
    let before = store.get_case(&case.id).unwrap();
    let second = lifecycle.close_case(&case.id, ClosureReason::AutoTimeLimit, Timestamp::new(T0 + 200));

    assert!(matches!(second, Err(LifecycleError::AlreadyClosed(_))));
    assert_eq!(store.get_case(&case.id).unwrap(), before);
    assert_eq!(store.applied_closures(), 1);
    assert_eq!(
        store.get_rewards(&owner()).unwrap().total,
        first.owner_reward
    );
}

#[test]
fn persistence_failure_leaves_case_open_and_retry_succeeds() {
    let (store, lifecycle, case) = setup();
    cast(&lifecycle, &case, "a", Side::SideA, 20, T0 + 1);
    store.fail_next_commits(1);

    let failed = lifecycle.close_by_owner(&case.id, &owner(), Timestamp::new(T0 + 10));
    assert!(matches!(failed, Err(LifecycleError::Persistence(_))));
    assert!(store.get_case(&case.id).unwrap().is_open());
    assert!(store.get_rewards(&owner()).unwrap().total.is_zero());

    let closed = lifecycle
        .close_by_owner(&case.id, &owner(), Timestamp::new(T0 + 20))
        .unwrap();
    assert_eq!(closed.owner_reward.cents(), 2);
    assert_eq!(store.get_rewards(&owner()).unwrap().total.cents(), 2);
}

// ---------------------------------------------------------------------------
// Concurrent closure
// ---------------------------------------------------------------------------

#[test]
fn racing_closes_apply_exactly_once() {
    let store = Arc::new(NullStore::new());
    let lifecycle = Arc::new(CaseLifecycle::new(
        Arc::clone(&store) as Arc<dyn JuryStore>,
        LifecycleParams::default(),
    ));
    let case = lifecycle
        .open_case(&owner(), &submission(), Timestamp::new(T0))
        .unwrap();
    cast(&lifecycle, &case, "a", Side::SideA, 30, T0 + 1);

    let barrier = Arc::new(Barrier::new(2));
    let closers: Vec<_> = [ClosureReason::ManualByOwner, ClosureReason::AutoTimeLimit]
        .into_iter()
        .map(|reason| {
            let lifecycle = Arc::clone(&lifecycle);
            let barrier = Arc::clone(&barrier);
            let id = case.id;
            std::thread::spawn(move || {
                barrier.wait();
                lifecycle.close_case(&id, reason, Timestamp::new(T0 + 8 * DAY_SECS))
            })
        })
        .collect();
    let results: Vec<_> = closers.into_iter().map(|h| h.join().unwrap()).collect();

    let applied: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(applied.len(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(LifecycleError::AlreadyClosed(_)))));

    let stored = store.get_case(&case.id).unwrap().closure.unwrap();
    assert_eq!(stored.reason, applied[0].reason);
    assert_eq!(stored.verdict, applied[0].verdict);
    assert_eq!(stored.owner_reward, applied[0].owner_reward);
    assert_eq!(stored.closed_at, applied[0].closed_at);
    assert_eq!(store.applied_closures(), 1);
    assert_eq!(store.get_rewards(&owner()).unwrap().total.cents(), 3);
}

#[test]
fn engines_sharing_a_store_close_exactly_once() {
    // Separate lifecycles share no locks; only the store's conditional write
    // keeps the closure single.
    let store = Arc::new(NullStore::new());
    let engines: Vec<_> = (0..4)
        .map(|_| {
            Arc::new(CaseLifecycle::new(
                Arc::clone(&store) as Arc<dyn JuryStore>,
                LifecycleParams::default(),
            ))
        })
        .collect();
    let case = engines[0]
        .open_case(&owner(), &submission(), Timestamp::new(T0))
        .unwrap();

    let barrier = Arc::new(Barrier::new(engines.len()));
    let handles: Vec<_> = engines
        .iter()
        .map(|engine| {
            let engine = Arc::clone(engine);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                engine.sweep_expired(Timestamp::new(T0 + 7 * DAY_SECS)).unwrap()
            })
        })
        .collect();
    let reports: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(reports.iter().map(|r| r.closed).sum::<u64>(), 1);
    assert_eq!(reports.iter().map(|r| r.failed).sum::<u64>(), 0);
    assert_eq!(store.applied_closures(), 1);
}

// ---------------------------------------------------------------------------
// Sweep
// ---------------------------------------------------------------------------

#[test]
fn sweep_closes_only_expired_cases() {
    let (store, lifecycle, old) = setup();
    let young = lifecycle
        .open_case(&owner(), &submission(), Timestamp::new(T0 + 2 * DAY_SECS))
        .unwrap();
    cast(&lifecycle, &old, "a", Side::SideA, 3, T0 + 10);
    cast(&lifecycle, &old, "b", Side::SideB, 1, T0 + 10);

    let report = lifecycle
        .sweep_expired(Timestamp::new(T0 + 8 * DAY_SECS))
        .unwrap();

    assert_eq!(report.examined, 1);
    assert_eq!(report.closed, 1);
    let closure = store.get_case(&old.id).unwrap().closure.unwrap();
    assert_eq!(closure.reason, ClosureReason::AutoTimeLimit);
    assert_eq!(closure.verdict, Verdict::SideAWins);
    assert_eq!(closure.margin_percent, 50);
    assert!(store.get_case(&young.id).unwrap().is_open());

    // A second pass finds nothing left to do.
    let again = lifecycle
        .sweep_expired(Timestamp::new(T0 + 8 * DAY_SECS + 3600))
        .unwrap();
    assert_eq!(again.examined, 0);
}

#[test]
fn sweep_continues_past_a_failing_case() {
    let (store, lifecycle, broken) = setup();
    let healthy = lifecycle
        .open_case(&owner(), &submission(), Timestamp::new(T0 + 1))
        .unwrap();
    store.break_case(broken.id);

    let report = lifecycle
        .sweep_expired(Timestamp::new(T0 + 9 * DAY_SECS))
        .unwrap();

    assert_eq!(report.examined, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.closed, 1);
    assert!(!store.get_case(&healthy.id).unwrap().is_open());
}

// ---------------------------------------------------------------------------
// Submission and events
// ---------------------------------------------------------------------------

#[test]
fn open_case_assigns_distinct_ids() {
    let (store, lifecycle, first) = setup();
    let second = lifecycle
        .open_case(&owner(), &submission(), Timestamp::new(T0))
        .unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(store.case_count().unwrap(), 2);
    assert_eq!(second.side_a_label, "Split it");
    assert!(second.is_open());
}

#[test]
fn invalid_submission_is_rejected_without_storing() {
    let (store, lifecycle, _case) = setup();
    let mut bad = submission();
    bad.title = "Short".into();
    let result = lifecycle.open_case(&owner(), &bad, Timestamp::new(T0));
    assert!(matches!(result, Err(LifecycleError::InvalidCase(_))));
    assert_eq!(store.case_count().unwrap(), 1);
}

#[test]
fn events_follow_the_case_through_its_life() {
    let store = Arc::new(NullStore::new());
    let mut lifecycle = CaseLifecycle::new(
        Arc::clone(&store) as Arc<dyn JuryStore>,
        LifecycleParams::default(),
    );
    let log = Arc::new(Mutex::new(Vec::new()));
    let closes = Arc::new(AtomicU32::new(0));
    {
        let log = Arc::clone(&log);
        let closes = Arc::clone(&closes);
        lifecycle.subscribe(Box::new(move |event| {
            let name = match event {
                LifecycleEvent::CaseOpened { .. } => "opened",
                LifecycleEvent::VoteRecorded { .. } => "voted",
                LifecycleEvent::VoteChanged { .. } => "changed",
                LifecycleEvent::CaseClosed(_) => {
                    closes.fetch_add(1, Ordering::SeqCst);
                    "closed"
                }
            };
            log.lock().unwrap().push(name);
        }));
    }

    let case = lifecycle
        .open_case(&owner(), &submission(), Timestamp::new(T0))
        .unwrap();
    let voter = UserId::new("v");
    lifecycle
        .cast_vote(&case.id, &voter, Side::SideA, Timestamp::new(T0 + 1))
        .unwrap();
    lifecycle
        .cast_vote(&case.id, &voter, Side::SideB, Timestamp::new(T0 + 2))
        .unwrap();
    lifecycle
        .close_by_owner(&case.id, &owner(), Timestamp::new(T0 + 3))
        .unwrap();
    let _ = lifecycle.close_by_owner(&case.id, &owner(), Timestamp::new(T0 + 4));

    assert_eq!(
        *log.lock().unwrap(),
        vec!["opened", "voted", "changed", "closed"]
    );
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn case_view_reports_rounded_shares() {
    let (_store, lifecycle, case) = setup();
    cast(&lifecycle, &case, "a", Side::SideA, 1, T0 + 1);
    cast(&lifecycle, &case, "b", Side::SideB, 7, T0 + 1);

    let view = lifecycle.case_view(&case.id).unwrap();
    assert_eq!(view.case.id, case.id);
    assert_eq!(view.tally.total_votes, 8);
    assert_eq!(view.tally.side_a_percent, 13);
    assert_eq!(view.tally.side_b_percent, 88);
}
