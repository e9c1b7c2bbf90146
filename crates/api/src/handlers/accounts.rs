//! Handlers for the `/accounts` resource (control plane).
//!
//! The Account Registry is the sole writer of account rows. All endpoints
//! require user authentication and operate on the caller's own account.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use outpost_core::error::CoreError;
use outpost_core::types::Id;

use outpost_db::models::account::{
    Account, CreateAccount, UpdateHealthStatus, UpdateValidationStatus,
};
use outpost_db::models::audit::CreateAuditEntry;
use outpost_db::models::enums::{AccountHealthStatus, AccountValidationStatus, ActorType};
use outpost_db::repositories::{AccountRepo, AgentRepo};

use crate::audit;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch an account and verify the caller owns it.
async fn find_and_authorize(
    pool: &sqlx::PgPool,
    account_id: &Id,
    auth: &AuthUser,
) -> AppResult<Account> {
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

    Ok(account)
}

// ---------------------------------------------------------------------------
// Create / read
// ---------------------------------------------------------------------------

/// POST /api/v1/accounts
///
/// Binds the caller's one automation target. A second account for the same
/// user violates `uq_accounts_user_id` and is rejected with `INVALID_STATE`.
pub async fn create_account(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateAccount>,
) -> AppResult<impl IntoResponse> {
    if input.profile_url.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "profileUrl is required".into(),
        )));
    }

    let account = AccountRepo::create(&state.pool, &auth.user_id, &input).await?;

    audit::emit(
        &state.pool,
        CreateAuditEntry {
            domain: "accounts",
            event_type: "account_created".to_string(),
            entity_type: "Account",
            entity_id: account.id.clone(),
            actor_type: ActorType::User,
            actor_id: Some(auth.user_id.clone()),
            payload: serde_json::json!({ "profileUrl": account.profile_url }),
        },
    )
    .await;

    tracing::info!(account_id = %account.id, user_id = %auth.user_id, "Account created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: account })))
}

/// GET /api/v1/accounts/me
pub async fn get_my_account(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let account = AccountRepo::find_by_user(&state.pool, &auth.user_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Account",
            id: auth.user_id.clone(),
        })?;

    Ok(Json(DataResponse { data: account }))
}

/// GET /api/v1/accounts/{id}
pub async fn get_account(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(account_id): Path<Id>,
) -> AppResult<impl IntoResponse> {
    let account = find_and_authorize(&state.pool, &account_id, &auth).await?;
    Ok(Json(DataResponse { data: account }))
}

/// GET /api/v1/accounts/{id}/agent
///
/// Control-plane projection of the live agent bound to the account.
pub async fn get_account_agent(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(account_id): Path<Id>,
) -> AppResult<impl IntoResponse> {
    let account = find_and_authorize(&state.pool, &account_id, &auth).await?;

    let agent = AgentRepo::find_live_by_account(&state.pool, &account.id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Agent",
            id: account_id.clone(),
        })?;

    Ok(Json(DataResponse { data: agent }))
}

// ---------------------------------------------------------------------------
// Status updates
// ---------------------------------------------------------------------------

/// PUT /api/v1/accounts/{id}/validation-status
///
/// A transition to `EXPIRED` (or `DISCONNECTED`) is a boundary event: it is
/// audited, and the Risk Oracle picks the state up on its next read. The
/// registry itself blocks nothing.
pub async fn update_validation_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(account_id): Path<Id>,
    Json(input): Json<UpdateValidationStatus>,
) -> AppResult<impl IntoResponse> {
    let account = find_and_authorize(&state.pool, &account_id, &auth).await?;

    let updated = AccountRepo::update_validation_status(
        &state.pool,
        &account.id,
        input.validation_status,
    )
    .await?
    .ok_or_else(|| CoreError::NotFound {
        entity: "Account",
        id: account_id.clone(),
    })?;

    if matches!(
        input.validation_status,
        AccountValidationStatus::Expired | AccountValidationStatus::Disconnected
    ) {
        audit::emit(
            &state.pool,
            CreateAuditEntry {
                domain: "accounts",
                event_type: "validation_status_changed".to_string(),
                entity_type: "Account",
                entity_id: updated.id.clone(),
                actor_type: ActorType::User,
                actor_id: Some(auth.user_id.clone()),
                payload: serde_json::json!({ "validationStatus": input.validation_status }),
            },
        )
        .await;
    }

    Ok(Json(DataResponse { data: updated }))
}

/// PUT /api/v1/accounts/{id}/health-status
pub async fn update_health_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(account_id): Path<Id>,
    Json(input): Json<UpdateHealthStatus>,
) -> AppResult<impl IntoResponse> {
    let account = find_and_authorize(&state.pool, &account_id, &auth).await?;

    let updated =
        AccountRepo::update_health_status(&state.pool, &account.id, input.health_status)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                entity: "Account",
                id: account_id.clone(),
            })?;

    if input.health_status == AccountHealthStatus::Suspended {
        audit::emit(
            &state.pool,
            CreateAuditEntry {
                domain: "accounts",
                event_type: "account_suspended".to_string(),
                entity_type: "Account",
                entity_id: updated.id.clone(),
                actor_type: ActorType::User,
                actor_id: Some(auth.user_id.clone()),
                payload: serde_json::json!({ "healthStatus": input.health_status }),
            },
        )
        .await;
    }

    Ok(Json(DataResponse { data: updated }))
}

/// POST /api/v1/accounts/{id}/session-valid
///
/// Records an externally-observed valid session.
pub async fn mark_session_valid(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(account_id): Path<Id>,
) -> AppResult<impl IntoResponse> {
    let account = find_and_authorize(&state.pool, &account_id, &auth).await?;

    let updated = AccountRepo::mark_session_valid(&state.pool, &account.id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Account",
            id: account_id.clone(),
        })?;

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// Pause / resume
// ---------------------------------------------------------------------------

/// POST /api/v1/accounts/{id}/pause
///
/// Sets the explicit user pause; the oracle reports `USER_PAUSED` until
/// resumed.
pub async fn pause(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(account_id): Path<Id>,
) -> AppResult<impl IntoResponse> {
    set_paused(auth, state, account_id, true).await
}

/// POST /api/v1/accounts/{id}/resume
pub async fn resume(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(account_id): Path<Id>,
) -> AppResult<impl IntoResponse> {
    set_paused(auth, state, account_id, false).await
}

async fn set_paused(
    auth: AuthUser,
    state: AppState,
    account_id: Id,
    paused: bool,
) -> AppResult<Json<DataResponse<Account>>> {
    let account = find_and_authorize(&state.pool, &account_id, &auth).await?;

    let updated = AccountRepo::set_user_paused(&state.pool, &account.id, paused)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Account",
            id: account_id.clone(),
        })?;

    audit::emit(
        &state.pool,
        CreateAuditEntry {
            domain: "accounts",
            event_type: if paused { "account_paused" } else { "account_resumed" }.to_string(),
            entity_type: "Account",
            entity_id: updated.id.clone(),
            actor_type: ActorType::User,
            actor_id: Some(auth.user_id.clone()),
            payload: serde_json::json!({ "userPaused": paused }),
        },
    )
    .await;

    Ok(Json(DataResponse { data: updated }))
}
