//! Axum-based HTTP server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use jury_lifecycle::CaseLifecycle;
use jury_types::Clock;

use crate::error::RpcError;
use crate::handlers;

/// Header carrying the authenticated caller's user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Shared state for every handler.
pub struct RpcState {
    pub lifecycle: Arc<CaseLifecycle>,
    pub clock: Arc<dyn Clock>,
    /// Served at `/metrics` when present.
    pub registry: Option<prometheus::Registry>,
}

/// Build the router with all routes.
pub fn router(state: Arc<RpcState>) -> Router {
    Router::new()
        .route("/cases", post(handlers::create_case))
        .route("/cases/:id", get(handlers::get_case))
        .route("/cases/:id/vote", post(handlers::cast_vote))
        .route("/cases/:id/close", post(handlers::close_case))
        .route("/users/:id/rewards", get(handlers::get_rewards))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
}

/// A bound HTTP server, ready to serve.
pub struct RpcServer {
    listener: TcpListener,
    state: Arc<RpcState>,
}

impl RpcServer {
    /// Bind to `addr`. Port 0 picks a free port; see [`RpcServer::local_addr`].
    pub async fn bind(addr: SocketAddr, state: Arc<RpcState>) -> Result<Self, RpcError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| RpcError::Server(format!("failed to bind {addr}: {e}")))?;
        Ok(Self { listener, state })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RpcError> {
        self.listener
            .local_addr()
            .map_err(|e| RpcError::Server(e.to_string()))
    }

    /// Serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        info!("RPC server listening on {}", addr);
        axum::serve(self.listener, router(self.state))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}
