//! Agent authenticator: resolves an opaque agent bearer token to its
//! `(agent, account)` binding.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use outpost_core::error::CoreError;
use outpost_core::types::Id;
use outpost_db::repositories::AgentTokenRepo;

use crate::auth::agent_token::hash_agent_token;
use crate::error::AppError;
use crate::middleware::auth::bearer_token;
use crate::state::AppState;

/// Authenticated agent extracted from an opaque Bearer token.
///
/// Tokens are single-scope: they authorize only operations on their bound
/// account. Handlers must still compare the requested account against
/// `account_id` and reject mismatches with `FORBIDDEN`.
#[derive(Debug, Clone)]
pub struct AuthAgent {
    pub agent_id: Id,
    pub account_id: Id,
}

impl FromRequestParts<AppState> for AuthAgent {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let hash = hash_agent_token(token);
        let record = AgentTokenRepo::find_valid_by_hash(&state.pool, &hash)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Invalid, expired, or revoked agent token".into(),
                ))
            })?;

        Ok(AuthAgent {
            agent_id: record.agent_id,
            account_id: record.account_id,
        })
    }
}
