//! Repository for the `agents` table.
//!
//! At most one non-terminated agent exists per account, enforced by the
//! partial unique index `uq_agents_live_account`.

use outpost_core::types::{new_id, Id};
use sqlx::PgPool;

use crate::models::agent::Agent;
use crate::models::enums::AgentState;

const COLUMNS: &str = "\
    id, account_id, state, agent_version, platform, \
    last_heartbeat_at, registered_at, terminated_at";

/// Provides lifecycle operations for agents.
pub struct AgentRepo;

impl AgentRepo {
    /// Find the live (non-terminated) agent for an account, if any.
    pub async fn find_live_by_account(
        pool: &PgPool,
        account_id: &Id,
    ) -> Result<Option<Agent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM agents WHERE account_id = $1 AND terminated_at IS NULL"
        );
        sqlx::query_as::<_, Agent>(&query)
            .bind(account_id)
            .fetch_optional(pool)
            .await
    }

    /// Create the agent row for an account, or reuse the existing live row.
    ///
    /// Either way the agent ends up in `REGISTERED` state with the reported
    /// version and platform. A concurrent first registration loses the race
    /// on `uq_agents_live_account` and surfaces as a unique violation.
    pub async fn register(
        pool: &PgPool,
        account_id: &Id,
        agent_version: &str,
        platform: &str,
    ) -> Result<Agent, sqlx::Error> {
        if let Some(existing) = Self::find_live_by_account(pool, account_id).await? {
            let query = format!(
                "UPDATE agents SET state = $2, agent_version = $3, platform = $4 \
                 WHERE id = $1 RETURNING {COLUMNS}"
            );
            return sqlx::query_as::<_, Agent>(&query)
                .bind(&existing.id)
                .bind(AgentState::Registered)
                .bind(agent_version)
                .bind(platform)
                .fetch_one(pool)
                .await;
        }

        let query = format!(
            "INSERT INTO agents (id, account_id, state, agent_version, platform) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Agent>(&query)
            .bind(new_id())
            .bind(account_id)
            .bind(AgentState::Registered)
            .bind(agent_version)
            .bind(platform)
            .fetch_one(pool)
            .await
    }

    /// Record a heartbeat: stamps `last_heartbeat_at` and stores the state
    /// derived from the agent's self-reported status.
    pub async fn heartbeat(
        pool: &PgPool,
        id: &Id,
        state: AgentState,
    ) -> Result<Option<Agent>, sqlx::Error> {
        let query = format!(
            "UPDATE agents SET last_heartbeat_at = NOW(), state = $2 \
             WHERE id = $1 AND terminated_at IS NULL RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Agent>(&query)
            .bind(id)
            .bind(state)
            .fetch_optional(pool)
            .await
    }

    /// Terminate an agent. Returns the updated row, or `None` if the agent
    /// was already terminated or unknown.
    pub async fn terminate(pool: &PgPool, id: &Id) -> Result<Option<Agent>, sqlx::Error> {
        let query = format!(
            "UPDATE agents SET terminated_at = NOW(), state = $2 \
             WHERE id = $1 AND terminated_at IS NULL RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Agent>(&query)
            .bind(id)
            .bind(AgentState::Terminated)
            .fetch_optional(pool)
            .await
    }
}
