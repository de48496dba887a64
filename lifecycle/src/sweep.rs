//! Periodic closure of cases past their time limit.

use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use jury_types::{ClosureReason, Timestamp};

use crate::engine::CaseLifecycle;
use crate::error::LifecycleError;

/// Outcome of one sweep pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Open cases found past the time limit.
    pub examined: u64,
    /// Cases this pass closed.
    pub closed: u64,
    /// Cases another trigger closed first.
    pub already_closed: u64,
    /// Cases whose closure failed; they stay open for the next pass.
    pub failed: u64,
}

impl CaseLifecycle {
    /// Close every open case created at least `time_limit_secs` before `now`.
    ///
    /// A failure on one case is logged and counted and the pass moves on.
    /// Only failing to list the due cases aborts the pass.
    pub fn sweep_expired(&self, now: Timestamp) -> Result<SweepReport, LifecycleError> {
        let _span = info_span!("sweep", now = now.as_secs()).entered();

        let cutoff = now.saturating_sub_secs(self.params.time_limit_secs);
        let due = self.store.open_cases_created_before(cutoff)?;
        let mut report = SweepReport {
            examined: due.len() as u64,
            ..SweepReport::default()
        };

        for id in due {
            match self.close_case(&id, ClosureReason::AutoTimeLimit, now) {
                Ok(_) => report.closed += 1,
                Err(LifecycleError::AlreadyClosed(_)) => report.already_closed += 1,
                Err(e) => {
                    warn!(case = %id, error = %e, "failed to close expired case");
                    report.failed += 1;
                }
            }
        }

        info!(
            examined = report.examined,
            closed = report.closed,
            already_closed = report.already_closed,
            failed = report.failed,
            "sweep complete"
        );
        Ok(report)
    }
}
