//! Integration tests for the agent and token repositories.
//!
//! Covers the one-live-agent invariant, token rotation atomicity, and
//! validation of expired/revoked tokens.

use chrono::{Duration, Utc};
use sqlx::PgPool;

use outpost_db::models::enums::AgentState;
use outpost_db::repositories::{AgentRepo, AgentTokenRepo};

mod common;
use common::{seed_account, seed_agent};

// ---------------------------------------------------------------------------
// Agent lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn register_creates_then_reuses_the_live_row(pool: PgPool) {
    let (_user, account) = seed_account(&pool, "reuse").await;

    let first = AgentRepo::register(&pool, &account.id, "1.0.0", "linux-x64")
        .await
        .expect("registration should succeed");
    assert_eq!(first.state, AgentState::Registered);

    // Re-registration reuses the row and refreshes version/platform.
    let second = AgentRepo::register(&pool, &account.id, "1.1.0", "macos-arm64")
        .await
        .expect("re-registration should succeed");
    assert_eq!(second.id, first.id);
    assert_eq!(second.agent_version, "1.1.0");
    assert_eq!(second.platform, "macos-arm64");
}

#[sqlx::test(migrations = "./migrations")]
async fn terminated_agent_frees_the_account_binding(pool: PgPool) {
    let (_user, account) = seed_account(&pool, "freeslot").await;

    let first = seed_agent(&pool, &account.id).await;
    AgentRepo::terminate(&pool, &first.id)
        .await
        .expect("terminate should succeed")
        .expect("agent should have been live");

    assert!(AgentRepo::find_live_by_account(&pool, &account.id)
        .await
        .expect("query should succeed")
        .is_none());

    // A fresh registration creates a new row.
    let second = seed_agent(&pool, &account.id).await;
    assert_ne!(second.id, first.id);
    assert!(second.terminated_at.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn heartbeat_stamps_liveness_and_state(pool: PgPool) {
    let (_user, account) = seed_account(&pool, "hb").await;
    let agent = seed_agent(&pool, &account.id).await;
    assert!(agent.last_heartbeat_at.is_none());

    let beat = AgentRepo::heartbeat(&pool, &agent.id, AgentState::Active)
        .await
        .expect("heartbeat should succeed")
        .expect("agent should be live");
    assert_eq!(beat.state, AgentState::Active);
    assert!(beat.last_heartbeat_at.is_some());

    // Terminated agents do not heartbeat.
    AgentRepo::terminate(&pool, &agent.id)
        .await
        .expect("terminate should succeed");
    assert!(AgentRepo::heartbeat(&pool, &agent.id, AgentState::Idle)
        .await
        .expect("query should succeed")
        .is_none());
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn rotation_revokes_the_predecessor_atomically(pool: PgPool) {
    let (_user, account) = seed_account(&pool, "rotate").await;
    let agent = seed_agent(&pool, &account.id).await;

    let expires = Utc::now() + Duration::hours(1);
    let first = AgentTokenRepo::rotate(&pool, &agent.id, &account.id, "hash-one", expires)
        .await
        .expect("rotation should succeed");

    assert!(AgentTokenRepo::find_valid_by_hash(&pool, "hash-one")
        .await
        .expect("query should succeed")
        .is_some());

    let second = AgentTokenRepo::rotate(&pool, &agent.id, &account.id, "hash-two", expires)
        .await
        .expect("rotation should succeed");
    assert_ne!(second.id, first.id);

    // Old token is dead, new one lives.
    assert!(AgentTokenRepo::find_valid_by_hash(&pool, "hash-one")
        .await
        .expect("query should succeed")
        .is_none());
    assert!(AgentTokenRepo::find_valid_by_hash(&pool, "hash-two")
        .await
        .expect("query should succeed")
        .is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn expired_tokens_fail_validation(pool: PgPool) {
    let (_user, account) = seed_account(&pool, "expiry").await;
    let agent = seed_agent(&pool, &account.id).await;

    let expired = Utc::now() - Duration::minutes(1);
    AgentTokenRepo::rotate(&pool, &agent.id, &account.id, "hash-expired", expired)
        .await
        .expect("rotation should succeed");

    assert!(AgentTokenRepo::find_valid_by_hash(&pool, "hash-expired")
        .await
        .expect("query should succeed")
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn revoke_by_hash_kills_the_token(pool: PgPool) {
    let (_user, account) = seed_account(&pool, "revoke").await;
    let agent = seed_agent(&pool, &account.id).await;

    let expires = Utc::now() + Duration::hours(1);
    AgentTokenRepo::rotate(&pool, &agent.id, &account.id, "hash-revoke", expires)
        .await
        .expect("rotation should succeed");

    assert!(AgentTokenRepo::revoke_by_hash(&pool, "hash-revoke")
        .await
        .expect("revoke should succeed"));
    assert!(AgentTokenRepo::find_valid_by_hash(&pool, "hash-revoke")
        .await
        .expect("query should succeed")
        .is_none());

    // Second revoke is a no-op.
    assert!(!AgentTokenRepo::revoke_by_hash(&pool, "hash-revoke")
        .await
        .expect("revoke should succeed"));
}

#[sqlx::test(migrations = "./migrations")]
async fn sweeper_only_deletes_dead_tokens(pool: PgPool) {
    let (_user, account) = seed_account(&pool, "sweep").await;
    let agent = seed_agent(&pool, &account.id).await;

    // One live token, one long-expired token.
    AgentTokenRepo::rotate(
        &pool,
        &agent.id,
        &account.id,
        "hash-old",
        Utc::now() - Duration::days(2),
    )
    .await
    .expect("rotation should succeed");
    AgentTokenRepo::rotate(
        &pool,
        &agent.id,
        &account.id,
        "hash-live",
        Utc::now() + Duration::hours(1),
    )
    .await
    .expect("rotation should succeed");

    let deleted = AgentTokenRepo::delete_dead_before(&pool, Utc::now() - Duration::hours(24))
        .await
        .expect("sweep should succeed");
    assert_eq!(deleted, 1);

    assert!(AgentTokenRepo::find_valid_by_hash(&pool, "hash-live")
        .await
        .expect("query should succeed")
        .is_some());
}
