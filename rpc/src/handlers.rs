//! RPC request handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info_span;

use jury_lifecycle::{
    CaseLifecycle, CaseSubmission, CaseView, ClosedCase, LifecycleError, VoteKind,
};
use jury_store::UserRewards;
use jury_types::{CaseId, Category, Side, UserId};

use crate::error::RpcError;
use crate::server::{RpcState, USER_ID_HEADER};

// ── Helpers ──────────────────────────────────────────────────────────────

/// The authenticated caller, from the `x-user-id` header.
fn caller(headers: &HeaderMap) -> Result<UserId, RpcError> {
    let raw = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(RpcError::Unauthenticated)?;
    UserId::parse(raw).map_err(|_| RpcError::Unauthenticated)
}

fn parse_case_id(raw: &str) -> Result<CaseId, RpcError> {
    raw.parse()
        .map_err(|_| RpcError::InvalidRequest(format!("malformed case id '{raw}'")))
}

/// Run a lifecycle operation off the async executor; store calls block.
async fn blocking<T, F>(state: &RpcState, op: F) -> Result<T, RpcError>
where
    F: FnOnce(&CaseLifecycle) -> Result<T, LifecycleError> + Send + 'static,
    T: Send + 'static,
{
    let lifecycle = Arc::clone(&state.lifecycle);
    tokio::task::spawn_blocking(move || op(&lifecycle))
        .await
        .map_err(|e| RpcError::Server(e.to_string()))?
        .map_err(RpcError::from)
}

// ── Cases ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateCaseRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub side_a_label: Option<String>,
    #[serde(default)]
    pub side_b_label: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CaseResponse {
    pub id: String,
    pub owner: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub side_a_label: String,
    pub side_b_label: String,
    pub created_at: u64,
    pub status: String,
    pub side_a_votes: u64,
    pub side_b_votes: u64,
    pub total_votes: u64,
    pub side_a_percent: u8,
    pub side_b_percent: u8,
    pub closed_at: Option<u64>,
    pub closure_reason: Option<String>,
    pub verdict: Option<String>,
    pub verdict_margin: Option<u8>,
    pub owner_reward: String,
}

impl From<CaseView> for CaseResponse {
    fn from(view: CaseView) -> Self {
        let CaseView { case, tally } = view;
        let status = case.status().as_str().to_string();
        let owner_reward = case.owner_reward().to_string();
        let closure = case.closure;
        Self {
            id: case.id.to_string(),
            owner: case.owner.to_string(),
            title: case.title,
            description: case.description,
            category: case.category,
            side_a_label: case.side_a_label,
            side_b_label: case.side_b_label,
            created_at: case.created_at.as_secs(),
            status,
            side_a_votes: tally.side_a_votes,
            side_b_votes: tally.side_b_votes,
            total_votes: tally.total_votes,
            side_a_percent: tally.side_a_percent,
            side_b_percent: tally.side_b_percent,
            closed_at: closure.as_ref().map(|c| c.closed_at.as_secs()),
            closure_reason: closure.as_ref().map(|c| c.reason.as_str().to_string()),
            verdict: closure.as_ref().map(|c| c.verdict.as_str().to_string()),
            verdict_margin: closure.as_ref().map(|c| c.margin_percent),
            owner_reward,
        }
    }
}

pub async fn create_case(
    State(state): State<Arc<RpcState>>,
    headers: HeaderMap,
    body: Result<Json<CreateCaseRequest>, JsonRejection>,
) -> Result<impl IntoResponse, RpcError> {
    let owner = caller(&headers)?;
    let Json(req) = body?;
    let category: Category = req
        .category
        .parse()
        .map_err(|_| RpcError::InvalidRequest(format!("unknown category '{}'", req.category)))?;
    let submission = CaseSubmission {
        title: req.title,
        description: req.description,
        category,
        side_a_label: req.side_a_label,
        side_b_label: req.side_b_label,
    };
    let now = state.clock.now();

    let view = blocking(&state, move |lifecycle| {
        let _span = info_span!("rpc", action = "create_case", owner = %owner).entered();
        let case = lifecycle.open_case(&owner, &submission, now)?;
        lifecycle.case_view(&case.id)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(CaseResponse::from(view))))
}

pub async fn get_case(
    State(state): State<Arc<RpcState>>,
    Path(id): Path<String>,
) -> Result<Json<CaseResponse>, RpcError> {
    let id = parse_case_id(&id)?;
    let view = blocking(&state, move |lifecycle| lifecycle.case_view(&id)).await?;
    Ok(Json(view.into()))
}

// ── Votes ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub side: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteResponse {
    pub case_id: String,
    pub side: Side,
    pub kind: VoteKind,
    pub side_a_votes: u64,
    pub side_b_votes: u64,
    /// Whether this vote closed the case.
    pub closed: bool,
    pub verdict: Option<String>,
    pub closure_reason: Option<String>,
}

pub async fn cast_vote(
    State(state): State<Arc<RpcState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, RpcError> {
    let voter = caller(&headers)?;
    let Json(req) = body?;
    let id = parse_case_id(&id)?;
    let side: Side = req.side.parse().map_err(|_| {
        RpcError::InvalidRequest(format!("side must be SIDE_A or SIDE_B, got '{}'", req.side))
    })?;
    let now = state.clock.now();

    let receipt = blocking(&state, move |lifecycle| {
        let _span = info_span!("rpc", action = "vote", case = %id, voter = %voter).entered();
        lifecycle.cast_vote(&id, &voter, side, now)
    })
    .await?;

    let status = match receipt.kind {
        VoteKind::New => StatusCode::CREATED,
        VoteKind::Changed => StatusCode::OK,
    };
    let body = VoteResponse {
        case_id: id.to_string(),
        side: receipt.side,
        kind: receipt.kind,
        side_a_votes: receipt.tally.side_a,
        side_b_votes: receipt.tally.side_b,
        closed: receipt.closure.is_some(),
        verdict: receipt
            .closure
            .as_ref()
            .map(|c| c.verdict.as_str().to_string()),
        closure_reason: receipt
            .closure
            .as_ref()
            .map(|c| c.reason.as_str().to_string()),
    };
    Ok((status, Json(body)))
}

// ── Closure ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct CloseResponse {
    pub case_id: String,
    pub closure_reason: String,
    pub verdict: String,
    pub verdict_margin: u8,
    /// Decimal string, e.g. "0.02".
    pub owner_reward: String,
    pub owner_reward_cents: u64,
    pub closed_at: u64,
}

impl From<ClosedCase> for CloseResponse {
    fn from(closed: ClosedCase) -> Self {
        Self {
            case_id: closed.case_id.to_string(),
            closure_reason: closed.reason.as_str().to_string(),
            verdict: closed.verdict.as_str().to_string(),
            verdict_margin: closed.margin_percent,
            owner_reward: closed.owner_reward.to_string(),
            owner_reward_cents: closed.owner_reward.cents(),
            closed_at: closed.closed_at.as_secs(),
        }
    }
}

pub async fn close_case(
    State(state): State<Arc<RpcState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<CloseResponse>, RpcError> {
    let requester = caller(&headers)?;
    let id = parse_case_id(&id)?;
    let now = state.clock.now();

    let closed = blocking(&state, move |lifecycle| {
        let _span = info_span!("rpc", action = "close_case", case = %id).entered();
        lifecycle.close_by_owner(&id, &requester, now)
    })
    .await?;

    Ok(Json(closed.into()))
}

// ── Rewards ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct RewardsResponse {
    pub user: String,
    pub case_earnings: String,
    pub comment_earnings: String,
    pub total_earnings: String,
    pub total_cents: u64,
}

impl From<UserRewards> for RewardsResponse {
    fn from(rewards: UserRewards) -> Self {
        Self {
            user: rewards.user.to_string(),
            case_earnings: rewards.case_rewards.to_string(),
            comment_earnings: rewards.comment_rewards.to_string(),
            total_earnings: rewards.total.to_string(),
            total_cents: rewards.total.cents(),
        }
    }
}

pub async fn get_rewards(
    State(state): State<Arc<RpcState>>,
    Path(user): Path<String>,
) -> Result<Json<RewardsResponse>, RpcError> {
    let user = UserId::parse(&user).map_err(|e| RpcError::InvalidRequest(e.to_string()))?;
    let rewards = blocking(&state, move |lifecycle| lifecycle.rewards(&user)).await?;
    Ok(Json(rewards.into()))
}

// ── Metrics ──────────────────────────────────────────────────────────────

pub async fn metrics(State(state): State<Arc<RpcState>>) -> Result<impl IntoResponse, RpcError> {
    use prometheus::Encoder;

    let registry = state.registry.as_ref().ok_or(RpcError::MetricsDisabled)?;
    let encoder = prometheus::TextEncoder::new();
    let mut buf = Vec::new();
    encoder
        .encode(&registry.gather(), &mut buf)
        .map_err(|e| RpcError::Server(e.to_string()))?;
    let body = String::from_utf8(buf).map_err(|e| RpcError::Server(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, encoder.format_type().to_string())], body))
}
