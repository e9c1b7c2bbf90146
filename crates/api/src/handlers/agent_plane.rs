//! Handlers for the agent plane (`/agent/...`).
//!
//! Registration is trust-bootstrapped; every other endpoint requires an
//! agent bearer token and is scoped to the token's bound account. The
//! heartbeat and control-state verdicts are the agent's authoritative
//! permission to proceed: a disallowed verdict means stop executing and
//! stop polling until re-authorized.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Duration;
use outpost_core::dispatch::{MAX_PULL_BATCH, POLL_INTERVAL_SECS};
use outpost_core::error::CoreError;
use outpost_core::types::{Id, Timestamp};
use serde::{Deserialize, Serialize};

use outpost_db::models::agent::{HeartbeatRequest, RegisterAgent};
use outpost_db::models::audit::CreateAuditEntry;
use outpost_db::models::enums::{
    ActorType, AgentEventType, AgentState, ReportedStatus, ScreenshotStage,
};
use outpost_db::models::job::{AssignedJob, Job};
use outpost_db::models::job_result::SubmitResult;
use outpost_db::repositories::{
    AccountRepo, AgentRepo, AgentTokenRepo, JobRepo,
};

use crate::audit;
use crate::auth::agent_token::generate_agent_token;
use crate::dispatch;
use crate::error::{AppError, AppResult};
use crate::middleware::agent::AuthAgent;
use crate::oracle::RiskOracle;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// Response for `POST /agent/register`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub agent_token: String,
    pub poll_interval_seconds: i32,
}

/// The `{allowed, reason}` heartbeat verdict.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictResponse {
    pub allowed: bool,
    pub reason: Option<&'static str>,
}

/// The control-state variant of the verdict (same contract, different keys).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlStateResponse {
    pub execution_allowed: bool,
    pub reason: Option<&'static str>,
}

/// Batch of assigned jobs returned from a pull.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobBatchResponse {
    pub jobs: Vec<AssignedJob>,
}

/// Query string carrying the target account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountIdQuery {
    pub account_id: Id,
}

/// Body for `POST /agent/events`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentEvent {
    pub job_id: Id,
    pub event_type: AgentEventType,
    pub message: Option<String>,
    pub timestamp: Option<Timestamp>,
}

/// Body for `POST /agent/screenshots`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotUpload {
    pub job_id: Id,
    pub stage: ScreenshotStage,
    pub image_url: Option<String>,
    pub image_base64: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify the token's bound account covers the requested account.
fn require_account_scope(auth: &AuthAgent, account_id: &Id) -> Result<(), AppError> {
    if &auth.account_id != account_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Agent token is not scoped to this account".into(),
        )));
    }
    Ok(())
}

/// Load a job and verify it belongs to the reporting agent.
async fn find_owned_job(
    state: &AppState,
    auth: &AuthAgent,
    job_id: &Id,
) -> AppResult<Job> {
    let job = JobRepo::find_by_id(&state.pool, job_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Job",
            id: job_id.clone(),
        })?;

    if job.account_id != auth.account_id
        || job.assigned_agent_id.as_deref() != Some(auth.agent_id.as_str())
    {
        return Err(AppError::Core(CoreError::Forbidden(
            "Job is not assigned to this agent".into(),
        )));
    }

    Ok(job)
}

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

/// POST /agent/register
///
/// Trust-bootstrapped: no prior auth, but the `(userId, accountId)` pair in
/// the body must exist and be bound together. Creates or reuses the single
/// live agent row, rotates its token (revoking any predecessor atomically),
/// and returns the plaintext token exactly once.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterAgent>,
) -> AppResult<impl IntoResponse> {
    let account = AccountRepo::find_by_id(&state.pool, &input.account_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Account",
            id: input.account_id.clone(),
        })?;

    if account.user_id != input.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account does not belong to this user".into(),
        )));
    }

    let agent = AgentRepo::register(
        &state.pool,
        &account.id,
        &input.agent_version,
        &input.platform,
    )
    .await?;

    let (plaintext, hash) = generate_agent_token();
    let expires_at = chrono::Utc::now() + Duration::hours(state.config.agent_token_ttl_hours);
    AgentTokenRepo::rotate(&state.pool, &agent.id, &account.id, &hash, expires_at).await?;

    audit::emit(
        &state.pool,
        CreateAuditEntry {
            domain: "agents",
            event_type: "agent_registered".to_string(),
            entity_type: "Agent",
            entity_id: agent.id.clone(),
            actor_type: ActorType::Agent,
            actor_id: Some(agent.id.clone()),
            payload: serde_json::json!({
                "accountId": account.id,
                "agentVersion": input.agent_version,
                "platform": input.platform,
            }),
        },
    )
    .await;

    tracing::info!(agent_id = %agent.id, account_id = %account.id, "Agent registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            agent_token: plaintext,
            poll_interval_seconds: POLL_INTERVAL_SECS,
        }),
    ))
}

// ---------------------------------------------------------------------------
// Deregister
// ---------------------------------------------------------------------------

/// POST /agent/deregister
///
/// Explicit lifecycle exit: terminates the agent row and revokes every live
/// token for it. The next call with the old token fails authentication.
pub async fn deregister(
    auth: AuthAgent,
    State(state): State<AppState>,
) -> AppResult<StatusCode> {
    let terminated = AgentRepo::terminate(&state.pool, &auth.agent_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Agent",
            id: auth.agent_id.clone(),
        })?;

    AgentTokenRepo::revoke_for_agent(&state.pool, &auth.agent_id).await?;

    audit::emit(
        &state.pool,
        CreateAuditEntry {
            domain: "agents",
            event_type: "agent_deregistered".to_string(),
            entity_type: "Agent",
            entity_id: terminated.id.clone(),
            actor_type: ActorType::Agent,
            actor_id: Some(terminated.id.clone()),
            payload: serde_json::json!({ "accountId": terminated.account_id }),
        },
    )
    .await;

    tracing::info!(agent_id = %terminated.id, "Agent deregistered");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Heartbeat / control state
// ---------------------------------------------------------------------------

/// POST /agent/heartbeat
///
/// Fast path: stamps liveness, maps the self-reported status onto the
/// stored agent state, and returns the execution verdict. No side effects
/// beyond the liveness stamp.
pub async fn heartbeat(
    auth: AuthAgent,
    State(state): State<AppState>,
    Json(input): Json<HeartbeatRequest>,
) -> AppResult<Json<VerdictResponse>> {
    require_account_scope(&auth, &input.account_id)?;

    let agent_state = match input.status {
        ReportedStatus::Idle | ReportedStatus::Paused => AgentState::Idle,
        ReportedStatus::Executing => AgentState::Active,
    };

    AgentRepo::heartbeat(&state.pool, &auth.agent_id, agent_state)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Agent has been terminated".into()))
        })?;

    let verdict = RiskOracle::is_execution_allowed(&state.pool, &auth.account_id).await?;

    tracing::debug!(
        agent_id = %auth.agent_id,
        account_id = %auth.account_id,
        allowed = verdict.allowed,
        reason = ?verdict.reason,
        current_job_id = ?input.current_job_id,
        "Heartbeat",
    );

    Ok(Json(VerdictResponse {
        allowed: verdict.allowed,
        reason: verdict.reason,
    }))
}

/// GET /agent/control-state?accountId=...
///
/// The heartbeat verdict without the liveness side effect.
pub async fn control_state(
    auth: AuthAgent,
    State(state): State<AppState>,
    Query(query): Query<AccountIdQuery>,
) -> AppResult<Json<ControlStateResponse>> {
    require_account_scope(&auth, &query.account_id)?;

    let verdict = RiskOracle::is_execution_allowed(&state.pool, &auth.account_id).await?;

    Ok(Json(ControlStateResponse {
        execution_allowed: verdict.allowed,
        reason: verdict.reason,
    }))
}

// ---------------------------------------------------------------------------
// Pull
// ---------------------------------------------------------------------------

/// GET /agent/jobs?accountId=...
///
/// Consults the oracle first; a veto yields an empty batch (the agent
/// learns the reason from the heartbeat path). Otherwise atomically claims
/// up to the batch limit of eligible pending jobs in dispatch order.
pub async fn pull_jobs(
    auth: AuthAgent,
    State(state): State<AppState>,
    Query(query): Query<AccountIdQuery>,
) -> AppResult<Json<JobBatchResponse>> {
    require_account_scope(&auth, &query.account_id)?;

    let verdict = RiskOracle::is_execution_allowed(&state.pool, &auth.account_id).await?;
    if !verdict.allowed {
        tracing::debug!(
            account_id = %auth.account_id,
            reason = ?verdict.reason,
            "Pull vetoed, returning empty batch",
        );
        return Ok(Json(JobBatchResponse { jobs: Vec::new() }));
    }

    let claimed = JobRepo::claim_batch(
        &state.pool,
        &auth.account_id,
        &auth.agent_id,
        MAX_PULL_BATCH,
    )
    .await?;

    for job in &claimed {
        audit::emit(
            &state.pool,
            CreateAuditEntry {
                domain: "dispatch",
                event_type: "job_assigned".to_string(),
                entity_type: "Job",
                entity_id: job.id.clone(),
                actor_type: ActorType::Agent,
                actor_id: Some(auth.agent_id.clone()),
                payload: serde_json::json!({ "accountId": job.account_id }),
            },
        )
        .await;
    }

    tracing::info!(
        agent_id = %auth.agent_id,
        account_id = %auth.account_id,
        count = claimed.len(),
        "Jobs pulled",
    );

    Ok(Json(JobBatchResponse {
        jobs: claimed.into_iter().map(AssignedJob::from).collect(),
    }))
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// POST /agent/events
///
/// Events for jobs not assigned to the reporting agent are rejected. An
/// `ACTION_STARTED` event on an `ASSIGNED` job moves it to `EXECUTING`;
/// every accepted event is appended to the audit log.
pub async fn record_event(
    auth: AuthAgent,
    State(state): State<AppState>,
    Json(input): Json<AgentEvent>,
) -> AppResult<StatusCode> {
    let job = find_owned_job(&state, &auth, &input.job_id).await?;

    let mut transitioned = false;
    if input.event_type == AgentEventType::ActionStarted {
        // CAS: only an ASSIGNED job moves; a lost race just means the job
        // already started.
        transitioned = JobRepo::start_execution(&state.pool, &job.id)
            .await?
            .is_some();
    }

    audit::emit(
        &state.pool,
        CreateAuditEntry {
            domain: "dispatch",
            event_type: input.event_type.as_str().to_string(),
            entity_type: "Job",
            entity_id: job.id.clone(),
            actor_type: ActorType::Agent,
            actor_id: Some(auth.agent_id.clone()),
            payload: serde_json::json!({
                "accountId": job.account_id,
                "message": input.message,
                "reportedAt": input.timestamp,
                "startedExecution": transitioned,
            }),
        },
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Result commit
// ---------------------------------------------------------------------------

/// POST /agent/jobs/{jobId}/result
///
/// Idempotent: a duplicate submission returns the stored result verbatim.
/// The submitting agent must be the assignee, and the job must be in
/// `ASSIGNED` or `EXECUTING`.
pub async fn submit_result(
    auth: AuthAgent,
    State(state): State<AppState>,
    Path(job_id): Path<Id>,
    Json(input): Json<SubmitResult>,
) -> AppResult<impl IntoResponse> {
    let job = find_owned_job(&state, &auth, &job_id).await?;

    let observed_state = input.metadata.as_ref().and_then(|m| m.observed_state);

    let committed = dispatch::commit_result(
        &state.pool,
        &job,
        &auth.agent_id,
        input.status,
        input.failure_reason,
        observed_state,
        ActorType::Agent,
        Some(auth.agent_id.clone()),
    )
    .await?;

    if committed.created {
        tracing::info!(
            job_id = %job.id,
            agent_id = %auth.agent_id,
            status = %committed.result.status,
            "Result committed",
        );
    } else {
        tracing::debug!(job_id = %job.id, "Duplicate result submission, replaying stored result");
    }

    Ok(Json(crate::response::DataResponse {
        data: committed.result,
    }))
}

// ---------------------------------------------------------------------------
// Screenshots
// ---------------------------------------------------------------------------

/// POST /agent/screenshots
///
/// The core never stores image bytes: a URL into external object storage is
/// recorded verbatim, an inline base64 body is recorded by size only.
pub async fn upload_screenshot(
    auth: AuthAgent,
    State(state): State<AppState>,
    Json(input): Json<ScreenshotUpload>,
) -> AppResult<impl IntoResponse> {
    let job = find_owned_job(&state, &auth, &input.job_id).await?;

    if input.image_url.is_none() && input.image_base64.is_none() {
        return Err(AppError::Core(CoreError::Validation(
            "One of imageUrl or imageBase64 is required".into(),
        )));
    }

    let image_bytes = input.image_base64.as_ref().map(|b64| b64.len() * 3 / 4);

    audit::emit(
        &state.pool,
        CreateAuditEntry {
            domain: "dispatch",
            event_type: "screenshot_captured".to_string(),
            entity_type: "Job",
            entity_id: job.id.clone(),
            actor_type: ActorType::Agent,
            actor_id: Some(auth.agent_id.clone()),
            payload: serde_json::json!({
                "accountId": job.account_id,
                "stage": input.stage.as_str(),
                "imageUrl": input.image_url,
                "imageBytes": image_bytes,
            }),
        },
    )
    .await;

    Ok(StatusCode::CREATED)
}
