//! Handlers for the `/audit` resource (control plane, read-only).

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;

use outpost_db::models::audit::AuditQuery;
use outpost_db::repositories::AuditRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/audit
///
/// Filtered, paginated projection over the append-only audit log.
pub async fn query_audit(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<AuditQuery>,
) -> AppResult<impl IntoResponse> {
    let entries = AuditRepo::query(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: entries }))
}
