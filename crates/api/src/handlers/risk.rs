//! Handlers for the `/risk` resource (control plane).

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use outpost_core::error::CoreError;
use outpost_core::types::Id;
use serde::Deserialize;

use outpost_db::models::audit::CreateAuditEntry;
use outpost_db::models::enums::{ActorType, JobType};
use outpost_db::models::risk::{AcknowledgeViolation, CreateRule, RecordViolation};
use outpost_db::repositories::{
    AccountRepo, RateLimitRuleRepo, RiskScoreRepo, ViolationRepo,
};

use crate::audit;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::oracle::RiskOracle;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleListQuery {
    pub action_type: Option<JobType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationListQuery {
    pub account_id: Id,
    #[serde(default)]
    pub unresolved_only: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreQuery {
    pub account_id: Id,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculateScore {
    pub account_id: Id,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify the caller owns the referenced account.
async fn authorize_account(
    pool: &sqlx::PgPool,
    account_id: &Id,
    auth: &AuthUser,
) -> AppResult<()> {
    let account = AccountRepo::find_by_id(pool, account_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Account",
            id: account_id.clone(),
        })?;

    if account.user_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account belongs to another user".into(),
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// POST /api/v1/risk/rules
pub async fn create_rule(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateRule>,
) -> AppResult<impl IntoResponse> {
    if input.max_count <= 0 || input.window_seconds <= 0 {
        return Err(AppError::Core(CoreError::Validation(
            "maxCount and windowSeconds must be positive".into(),
        )));
    }

    let rule = RateLimitRuleRepo::create(&state.pool, &input).await?;

    audit::emit(
        &state.pool,
        CreateAuditEntry {
            domain: "risk",
            event_type: "rule_created".to_string(),
            entity_type: "RateLimitRule",
            entity_id: rule.id.clone(),
            actor_type: ActorType::User,
            actor_id: Some(auth.user_id.clone()),
            payload: serde_json::json!({
                "actionType": rule.action_type,
                "maxCount": rule.max_count,
                "windowSeconds": rule.window_seconds,
            }),
        },
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: rule })))
}

/// GET /api/v1/risk/rules?actionType=...
pub async fn list_rules(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<RuleListQuery>,
) -> AppResult<impl IntoResponse> {
    let rules = RateLimitRuleRepo::list_active(&state.pool, query.action_type).await?;
    Ok(Json(DataResponse { data: rules }))
}

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

/// POST /api/v1/risk/violations
///
/// Records a violation against an account. Validates the referenced
/// account and rule.
pub async fn record_violation(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<RecordViolation>,
) -> AppResult<impl IntoResponse> {
    authorize_account(&state.pool, &input.account_id, &auth).await?;

    RateLimitRuleRepo::find_by_id(&state.pool, &input.rule_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "RateLimitRule",
            id: input.rule_id.clone(),
        })?;

    let violation = ViolationRepo::create(&state.pool, &input).await?;

    audit::emit(
        &state.pool,
        CreateAuditEntry {
            domain: "risk",
            event_type: "violation_recorded".to_string(),
            entity_type: "Violation",
            entity_id: violation.id.clone(),
            actor_type: ActorType::User,
            actor_id: Some(auth.user_id.clone()),
            payload: serde_json::json!({
                "accountId": violation.account_id,
                "severity": violation.severity,
            }),
        },
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: violation })))
}

/// GET /api/v1/risk/violations?accountId=...&unresolvedOnly=...
pub async fn list_violations(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ViolationListQuery>,
) -> AppResult<impl IntoResponse> {
    authorize_account(&state.pool, &query.account_id, &auth).await?;

    let violations =
        ViolationRepo::list_by_account(&state.pool, &query.account_id, query.unresolved_only)
            .await?;
    Ok(Json(DataResponse { data: violations }))
}

/// POST /api/v1/risk/acknowledge
///
/// Marks a violation resolved. Resolved violations stop contributing to
/// the risk score.
pub async fn acknowledge(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<AcknowledgeViolation>,
) -> AppResult<impl IntoResponse> {
    let violation = ViolationRepo::find_by_id(&state.pool, &input.violation_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Violation",
            id: input.violation_id.clone(),
        })?;

    authorize_account(&state.pool, &violation.account_id, &auth).await?;

    let resolved = ViolationRepo::resolve(&state.pool, &violation.id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::InvalidState(
                "Violation is already resolved".into(),
            ))
        })?;

    audit::emit(
        &state.pool,
        CreateAuditEntry {
            domain: "risk",
            event_type: "violation_resolved".to_string(),
            entity_type: "Violation",
            entity_id: resolved.id.clone(),
            actor_type: ActorType::User,
            actor_id: Some(auth.user_id.clone()),
            payload: serde_json::json!({ "accountId": resolved.account_id }),
        },
    )
    .await;

    Ok(Json(DataResponse { data: resolved }))
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

/// GET /api/v1/risk/score?accountId=...
///
/// The latest (authoritative) score on record.
pub async fn get_score(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ScoreQuery>,
) -> AppResult<impl IntoResponse> {
    authorize_account(&state.pool, &query.account_id, &auth).await?;

    let score = RiskScoreRepo::latest(&state.pool, &query.account_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "RiskScore",
            id: query.account_id.clone(),
        })?;

    Ok(Json(DataResponse { data: score }))
}

/// POST /api/v1/risk/score/recalculate
///
/// Recomputes the score from unresolved violations and account health,
/// appends it to the history, and returns it.
pub async fn recalculate_score(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<RecalculateScore>,
) -> AppResult<impl IntoResponse> {
    authorize_account(&state.pool, &input.account_id, &auth).await?;

    let score = RiskOracle::calculate_risk_score(&state.pool, &input.account_id).await?;

    tracing::info!(
        account_id = %input.account_id,
        score = score.score,
        level = %score.level,
        "Risk score recalculated",
    );

    Ok(Json(DataResponse { data: score }))
}
