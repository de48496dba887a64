//! Background task that closes cases past their time limit.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use jury_lifecycle::{CaseLifecycle, SweepReport};
use jury_types::Clock;

use crate::metrics::NodeMetrics;
use crate::NodeError;

/// Run one sweep pass at the clock's current time and record it.
pub fn run_sweep(
    lifecycle: &CaseLifecycle,
    clock: &dyn Clock,
    metrics: Option<&NodeMetrics>,
) -> Result<SweepReport, NodeError> {
    match lifecycle.sweep_expired(clock.now()) {
        Ok(report) => {
            if let Some(m) = metrics {
                m.record_sweep(&report);
            }
            Ok(report)
        }
        Err(e) => {
            if let Some(m) = metrics {
                m.sweep_errors.inc();
            }
            Err(e.into())
        }
    }
}

/// Spawn the sweeper loop.
///
/// The first pass runs immediately, so cases that expired while the node
/// was down are closed at startup. Each pass runs on the blocking pool
/// since store calls are synchronous.
pub fn spawn_sweeper(
    lifecycle: Arc<CaseLifecycle>,
    clock: Arc<dyn Clock>,
    metrics: Option<Arc<NodeMetrics>>,
    period: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    info!("sweeper shutting down");
                    break;
                }
                _ = interval.tick() => {
                    let lifecycle = Arc::clone(&lifecycle);
                    let clock = Arc::clone(&clock);
                    let metrics = metrics.clone();
                    let pass = tokio::task::spawn_blocking(move || {
                        run_sweep(&lifecycle, clock.as_ref(), metrics.as_deref())
                    })
                    .await;
                    match pass {
                        Ok(Ok(report)) if report.examined > 0 => {
                            info!(
                                examined = report.examined,
                                closed = report.closed,
                                failed = report.failed,
                                "sweep pass finished"
                            );
                        }
                        Ok(Ok(_)) => debug!("sweep pass found no expired cases"),
                        Ok(Err(e)) => error!("sweep pass failed: {e}"),
                        Err(e) => error!("sweep task panicked: {e}"),
                    }
                }
            }
        }
    })
}
