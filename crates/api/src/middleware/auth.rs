//! User authenticator: resolves an externally-issued bearer token to an
//! internal user.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use outpost_core::error::CoreError;
use outpost_core::types::Id;
use outpost_db::repositories::UserRepo;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// The identity provider owns authentication; this extractor validates the
/// token and resolves (provisioning on first sight) the internal user row.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal id.
    pub user_id: Id,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        let user = UserRepo::find_or_create_by_email(&state.pool, &claims.email).await?;

        Ok(AuthUser {
            user_id: user.id,
            email: user.email,
        })
    }
}

/// Pull the bearer token out of the `Authorization` header.
pub(crate) fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing Authorization header".into(),
            ))
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>".into(),
        ))
    })
}
