//! Repository for the `agent_tokens` table.
//!
//! Token plaintext never reaches this layer; callers hash first. Rotation
//! revokes every live token for the agent and issues the replacement in one
//! transaction, so at most one token is valid per agent at any instant.

use chrono::{DateTime, Utc};
use outpost_core::types::{new_id, Id};
use sqlx::PgPool;

use crate::models::agent_token::AgentToken;

const COLUMNS: &str = "\
    id, agent_id, account_id, token_hash, expires_at, revoked_at, created_at";

/// Provides issuance, validation, and revocation for agent tokens.
pub struct AgentTokenRepo;

impl AgentTokenRepo {
    /// Atomically revoke all live tokens for an agent and issue a new one.
    pub async fn rotate(
        pool: &PgPool,
        agent_id: &Id,
        account_id: &Id,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<AgentToken, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE agent_tokens SET revoked_at = NOW() WHERE agent_id = $1 AND revoked_at IS NULL")
            .bind(agent_id)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO agent_tokens (id, agent_id, account_id, token_hash, expires_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        );
        let token = sqlx::query_as::<_, AgentToken>(&query)
            .bind(new_id())
            .bind(agent_id)
            .bind(account_id)
            .bind(token_hash)
            .bind(expires_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(token)
    }

    /// Look up a live token by its hash. Revoked and expired tokens are
    /// not returned.
    pub async fn find_valid_by_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<AgentToken>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM agent_tokens \
             WHERE token_hash = $1 AND revoked_at IS NULL AND expires_at > NOW()"
        );
        sqlx::query_as::<_, AgentToken>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Revoke a token by its hash. Returns `true` if a live token was revoked.
    pub async fn revoke_by_hash(pool: &PgPool, token_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE agent_tokens SET revoked_at = NOW() \
             WHERE token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(token_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke all live tokens for an agent (deregistration).
    pub async fn revoke_for_agent(pool: &PgPool, agent_id: &Id) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE agent_tokens SET revoked_at = NOW() \
             WHERE agent_id = $1 AND revoked_at IS NULL",
        )
        .bind(agent_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete dead tokens (expired or revoked) older than the cutoff.
    /// Used by the background sweeper; validation never sees these rows.
    pub async fn delete_dead_before(
        pool: &PgPool,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM agent_tokens \
             WHERE (expires_at < $1) OR (revoked_at IS NOT NULL AND revoked_at < $1)",
        )
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
