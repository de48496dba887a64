//! The jury node: storage, lifecycle, sweeper and HTTP API in one process.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use jury_lifecycle::CaseLifecycle;
use jury_rpc::{RpcServer, RpcState};
use jury_store::{CaseStore, JuryStore};
use jury_store_lmdb::{check_data_dir, check_integrity, LmdbEnvironment};
use jury_types::{Clock, SystemClock};

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::metrics::NodeMetrics;
use crate::shutdown::ShutdownController;
use crate::sweeper::spawn_sweeper;

/// Maximum number of LMDB named databases.
const MAX_DBS: u32 = 8;

/// How long [`JuryNode::stop`] waits for background tasks.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct JuryNode {
    pub config: NodeConfig,
    store: Arc<LmdbEnvironment>,
    lifecycle: Arc<CaseLifecycle>,
    clock: Arc<dyn Clock>,
    pub metrics: Arc<NodeMetrics>,
    shutdown: Arc<ShutdownController>,
    /// Address the HTTP API is bound to, once started.
    rpc_addr: Option<SocketAddr>,
    /// Handles for spawned background tasks (joined during shutdown).
    task_handles: Vec<JoinHandle<()>>,
}

impl JuryNode {
    /// Create a node running on the wall clock.
    ///
    /// Opens the LMDB environment at `config.data_dir` and checks it.
    /// Call [`start`](Self::start) to begin sweeping and serving.
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: NodeConfig, clock: Arc<dyn Clock>) -> Result<Self, NodeError> {
        config.validate()?;

        check_data_dir(&config.data_dir).map_err(NodeError::Integrity)?;
        let store = LmdbEnvironment::open(&config.data_dir, MAX_DBS, config.lmdb_map_size)?;

        let report = check_integrity(&store)?;
        if !report.is_healthy() {
            for e in &report.errors {
                error!("integrity: {e}");
            }
            return Err(NodeError::Integrity(report.errors.join("; ")));
        }
        info!(
            databases = report.databases_checked,
            entries = report.total_entries,
            open_cases = report.open_cases,
            "database integrity check passed"
        );

        let store = Arc::new(store);
        let metrics = Arc::new(NodeMetrics::new()?);

        let mut lifecycle = CaseLifecycle::new(
            Arc::clone(&store) as Arc<dyn JuryStore>,
            config.lifecycle.clone(),
        );
        {
            let metrics = Arc::clone(&metrics);
            lifecycle.subscribe(Box::new(move |event| metrics.observe(event)));
        }

        info!(
            data_dir = %config.data_dir.display(),
            cases = store.case_count()?,
            "jury node initialised"
        );

        Ok(Self {
            config,
            store,
            lifecycle: Arc::new(lifecycle),
            clock,
            metrics,
            shutdown: Arc::new(ShutdownController::new()),
            rpc_addr: None,
            task_handles: Vec::new(),
        })
    }

    pub fn lifecycle(&self) -> &Arc<CaseLifecycle> {
        &self.lifecycle
    }

    pub fn store(&self) -> &Arc<LmdbEnvironment> {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// The bound HTTP address, if the API is running.
    pub fn rpc_addr(&self) -> Option<SocketAddr> {
        self.rpc_addr
    }

    pub fn shutdown_controller(&self) -> &Arc<ShutdownController> {
        &self.shutdown
    }

    /// Spawn the sweeper and, if enabled, the HTTP API. Returns once both
    /// are running.
    pub async fn start(&mut self) -> Result<(), NodeError> {
        info!("jury node starting");

        // ── Expiry sweeper ────────────────────────────────────────────────
        let sweeper = spawn_sweeper(
            Arc::clone(&self.lifecycle),
            Arc::clone(&self.clock),
            Some(Arc::clone(&self.metrics)),
            Duration::from_secs(self.config.sweep_interval_secs),
            self.shutdown.subscribe(),
        );
        self.task_handles.push(sweeper);

        // ── HTTP API (optional) ───────────────────────────────────────────
        if self.config.enable_rpc {
            let addr = resolve_bind_addr(&self.config.rpc_host, self.config.rpc_port).await?;
            let state = Arc::new(RpcState {
                lifecycle: Arc::clone(&self.lifecycle),
                clock: Arc::clone(&self.clock),
                registry: self
                    .config
                    .enable_metrics
                    .then(|| self.metrics.registry.clone()),
            });
            let server = RpcServer::bind(addr, state).await?;
            self.rpc_addr = Some(server.local_addr()?);

            let mut shutdown_rx = self.shutdown.subscribe();
            let rpc_handle = tokio::spawn(async move {
                let stop = async move {
                    let _ = shutdown_rx.recv().await;
                    info!("RPC server shutting down");
                };
                match server.serve(stop).await {
                    Ok(()) => info!("RPC server exited"),
                    Err(e) => error!("RPC server error: {e}"),
                }
            });
            self.task_handles.push(rpc_handle);
        }

        info!(rpc = ?self.rpc_addr, "jury node started");
        Ok(())
    }

    /// Start, run until SIGINT/SIGTERM, then stop.
    pub async fn run(&mut self) -> Result<(), NodeError> {
        self.start().await?;
        self.shutdown.wait_for_signal().await;
        self.stop().await
    }

    /// Stop the node gracefully.
    ///
    /// Signals every background task, waits for them (with a timeout) and
    /// flushes LMDB to disk.
    pub async fn stop(&mut self) -> Result<(), NodeError> {
        info!("jury node stopping");
        self.shutdown.shutdown();

        let handles: Vec<JoinHandle<()>> = self.task_handles.drain(..).collect();
        let wait_all = async {
            for handle in handles {
                let _ = handle.await;
            }
        };
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, wait_all).await.is_err() {
            warn!(
                "shutdown timeout ({:?}), some tasks may still be running",
                SHUTDOWN_TIMEOUT
            );
        }
        self.rpc_addr = None;

        match self.store.env().force_sync() {
            Ok(()) => info!("LMDB flushed to disk"),
            Err(e) => warn!("LMDB force_sync failed: {e}"),
        }

        info!("jury node stopped");
        Ok(())
    }
}

/// Resolve `host` (an IP literal, bare IPv6 included, or a hostname) and
/// `port` to the first address it maps to.
pub async fn resolve_bind_addr(host: &str, port: u16) -> Result<SocketAddr, NodeError> {
    tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| NodeError::Config(format!("cannot resolve RPC host '{host}': {e}")))?
        .next()
        .ok_or_else(|| NodeError::Config(format!("RPC host '{host}' resolved to no address")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    #[tokio::test]
    async fn resolves_ip_literals_including_bare_ipv6() {
        let v4 = resolve_bind_addr("0.0.0.0", 7070).await.unwrap();
        assert_eq!(v4, SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 7070));

        let v6 = resolve_bind_addr("::", 7070).await.unwrap();
        assert_eq!(v6, SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 7070));

        let v6_loopback = resolve_bind_addr("::1", 0).await.unwrap();
        assert!(v6_loopback.ip().is_loopback());
    }

    #[tokio::test]
    async fn resolves_hostnames() {
        let addr = resolve_bind_addr("localhost", 8080).await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 8080);
    }
}
