//! Liveness/readiness check.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::state::AppState;

/// GET /health
///
/// Verifies database connectivity. Public -- no authentication.
pub async fn health(State(state): State<AppState>) -> AppResult<Json<Value>> {
    outpost_db::health_check(&state.pool).await?;
    Ok(Json(json!({ "status": "ok" })))
}
