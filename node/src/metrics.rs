//! Prometheus metrics for the jury node.
//!
//! [`NodeMetrics`] owns a dedicated [`Registry`] that the HTTP `/metrics`
//! endpoint encodes into the Prometheus text exposition format. Lifecycle
//! counters are driven by [`NodeMetrics::observe`], subscribed to the
//! lifecycle event bus; sweep metrics by [`NodeMetrics::record_sweep`].

use prometheus::{
    register_int_counter_vec_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};

use jury_lifecycle::{LifecycleEvent, SweepReport};

pub struct NodeMetrics {
    pub registry: Registry,

    // ── Cases ───────────────────────────────────────────────────────────
    pub cases_opened: IntCounter,
    /// Closed cases, labelled by closure reason.
    pub cases_closed: IntCounterVec,
    /// Owner rewards credited at closure, in cents.
    pub reward_cents_credited: IntCounter,

    // ── Votes ───────────────────────────────────────────────────────────
    pub votes_recorded: IntCounter,
    pub votes_changed: IntCounter,

    // ── Sweeper ─────────────────────────────────────────────────────────
    pub sweep_runs: IntCounter,
    /// Cases the sweeper failed to close (retried on the next pass).
    pub sweep_case_failures: IntCounter,
    /// Sweeps that failed before examining any case.
    pub sweep_errors: IntCounter,
    /// Cases closed by the most recent sweep.
    pub last_sweep_closed: IntGauge,
}

impl NodeMetrics {
    /// Create a fresh set of metrics, all registered under a new [`Registry`].
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let cases_opened = register_int_counter_with_registry!(
            Opts::new("jury_cases_opened_total", "Total cases submitted"),
            registry
        )?;
        let cases_closed = register_int_counter_vec_with_registry!(
            Opts::new("jury_cases_closed_total", "Total cases closed, by closure reason"),
            &["reason"],
            registry
        )?;
        let reward_cents_credited = register_int_counter_with_registry!(
            Opts::new(
                "jury_reward_cents_credited_total",
                "Total owner rewards credited at closure, in cents"
            ),
            registry
        )?;
        let votes_recorded = register_int_counter_with_registry!(
            Opts::new("jury_votes_recorded_total", "Total first votes cast"),
            registry
        )?;
        let votes_changed = register_int_counter_with_registry!(
            Opts::new("jury_votes_changed_total", "Total votes switched to the other side"),
            registry
        )?;
        let sweep_runs = register_int_counter_with_registry!(
            Opts::new("jury_sweep_runs_total", "Total expiry sweeps completed"),
            registry
        )?;
        let sweep_case_failures = register_int_counter_with_registry!(
            Opts::new(
                "jury_sweep_case_failures_total",
                "Total expired cases the sweeper failed to close"
            ),
            registry
        )?;
        let sweep_errors = register_int_counter_with_registry!(
            Opts::new("jury_sweep_errors_total", "Total sweeps that failed outright"),
            registry
        )?;
        let last_sweep_closed = register_int_gauge_with_registry!(
            Opts::new("jury_last_sweep_closed", "Cases closed by the most recent sweep"),
            registry
        )?;

        Ok(Self {
            registry,
            cases_opened,
            cases_closed,
            reward_cents_credited,
            votes_recorded,
            votes_changed,
            sweep_runs,
            sweep_case_failures,
            sweep_errors,
            last_sweep_closed,
        })
    }

    /// Update counters from a lifecycle event.
    pub fn observe(&self, event: &LifecycleEvent) {
        match event {
            LifecycleEvent::CaseOpened { .. } => self.cases_opened.inc(),
            LifecycleEvent::VoteRecorded { .. } => self.votes_recorded.inc(),
            LifecycleEvent::VoteChanged { .. } => self.votes_changed.inc(),
            LifecycleEvent::CaseClosed(closed) => {
                self.cases_closed
                    .with_label_values(&[closed.reason.as_str()])
                    .inc();
                self.reward_cents_credited.inc_by(closed.owner_reward.cents());
            }
        }
    }

    pub fn record_sweep(&self, report: &SweepReport) {
        self.last_sweep_closed.set(report.closed as i64);
        self.sweep_case_failures.inc_by(report.failed);
        self.sweep_runs.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jury_lifecycle::ClosedCase;
    use jury_types::{
        CaseId, Category, ClosureReason, RewardAmount, Side, Timestamp, UserId, Verdict, VoteTally,
    };

    #[test]
    fn observe_counts_each_event_kind() {
        let metrics = NodeMetrics::new().unwrap();
        let case_id = CaseId::new([1; 16]);
        let owner = UserId::new("owner");

        metrics.observe(&LifecycleEvent::CaseOpened {
            case_id,
            owner: owner.clone(),
            category: Category::Other,
        });
        metrics.observe(&LifecycleEvent::VoteRecorded {
            case_id,
            voter: UserId::new("v"),
            side: Side::SideA,
        });
        metrics.observe(&LifecycleEvent::VoteChanged {
            case_id,
            voter: UserId::new("v"),
            from: Side::SideA,
            to: Side::SideB,
        });
        metrics.observe(&LifecycleEvent::CaseClosed(ClosedCase {
            case_id,
            owner,
            reason: ClosureReason::AutoVoteThreshold,
            verdict: Verdict::SideAWins,
            margin_percent: 80,
            owner_reward: RewardAmount::from_cents(4),
            closed_at: Timestamp::new(10),
            tally: VoteTally::new(45, 5),
        }));

        assert_eq!(metrics.cases_opened.get(), 1);
        assert_eq!(metrics.votes_recorded.get(), 1);
        assert_eq!(metrics.votes_changed.get(), 1);
        assert_eq!(
            metrics
                .cases_closed
                .with_label_values(&["AUTO_VOTE_THRESHOLD"])
                .get(),
            1
        );
        assert_eq!(metrics.reward_cents_credited.get(), 4);
    }

    #[test]
    fn record_sweep_tracks_last_run() {
        let metrics = NodeMetrics::new().unwrap();
        metrics.record_sweep(&SweepReport {
            examined: 3,
            closed: 2,
            already_closed: 0,
            failed: 1,
        });
        metrics.record_sweep(&SweepReport::default());
        assert_eq!(metrics.sweep_runs.get(), 2);
        assert_eq!(metrics.sweep_case_failures.get(), 1);
        assert_eq!(metrics.last_sweep_closed.get(), 0);
    }

    #[test]
    fn registry_exposes_jury_metrics() {
        let metrics = NodeMetrics::new().unwrap();
        metrics.cases_opened.inc();
        let names: Vec<String> = metrics
            .registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"jury_cases_opened_total".to_string()));
    }
}
