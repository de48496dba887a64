//! RPC error types.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use jury_lifecycle::LifecycleError;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("missing or invalid caller identity")]
    Unauthenticated,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("metrics are disabled")]
    MetricsDisabled,

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("server error: {0}")]
    Server(String),
}

impl RpcError {
    /// HTTP status and machine-readable error kind.
    pub fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            RpcError::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            RpcError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            RpcError::MetricsDisabled => (StatusCode::NOT_FOUND, "metrics_disabled"),
            RpcError::Lifecycle(e) => match e {
                LifecycleError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                LifecycleError::AlreadyClosed(_) => (StatusCode::CONFLICT, "already_closed"),
                LifecycleError::Unauthorized(_) => (StatusCode::FORBIDDEN, "forbidden"),
                LifecycleError::CaseClosed(_) => (StatusCode::CONFLICT, "case_closed"),
                LifecycleError::VoteLocked(_) => (StatusCode::BAD_REQUEST, "vote_locked"),
                LifecycleError::InvalidCase(_) => (StatusCode::BAD_REQUEST, "invalid_case"),
                LifecycleError::Persistence(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
                }
            },
            RpcError::Server(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl From<JsonRejection> for RpcError {
    fn from(rejection: JsonRejection) -> Self {
        RpcError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "error": kind,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
