//! HTTP-level integration tests for the agent lifecycle: registration
//! bootstrap, token rotation, scope enforcement, and deregistration.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_auth, post_json, post_json_auth, register_agent, seed_user_account};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Registration bootstrap
// ---------------------------------------------------------------------------

/// Registration validates the (userId, accountId) binding.
#[sqlx::test(migrations = "../db/migrations")]
async fn register_rejects_bad_bindings(pool: PgPool) {
    let (user_a, _account_a, _token) = seed_user_account(&pool, "bind-a").await;
    let (_user_b, account_b, _token) = seed_user_account(&pool, "bind-b").await;
    let app = common::build_test_app(pool.clone());

    // Unknown account.
    let response = post_json(
        app.clone(),
        "/agent/register",
        serde_json::json!({
            "userId": user_a.id,
            "accountId": "no-such-account",
            "agentVersion": "1.0.0",
            "platform": "linux-x64",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["errorCode"], "RESOURCE_NOT_FOUND");

    // Account bound to a different user.
    let response = post_json(
        app.clone(),
        "/agent/register",
        serde_json::json!({
            "userId": user_a.id,
            "accountId": account_b.id,
            "agentVersion": "1.0.0",
            "platform": "linux-x64",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Registration returns the token once, with the poll policy constant.
#[sqlx::test(migrations = "../db/migrations")]
async fn register_returns_token_and_poll_interval(pool: PgPool) {
    let (user, account, _token) = seed_user_account(&pool, "fresh").await;
    let app = common::build_test_app(pool.clone());

    let response = post_json(
        app.clone(),
        "/agent/register",
        serde_json::json!({
            "userId": user.id,
            "accountId": account.id,
            "agentVersion": "1.0.0",
            "platform": "linux-x64",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["pollIntervalSeconds"], 15);
    // 32 bytes hex-encoded.
    assert_eq!(json["agentToken"].as_str().unwrap().len(), 64);
}

// ---------------------------------------------------------------------------
// Token rotation
// ---------------------------------------------------------------------------

/// Re-registration rotates the token: the old one fails authentication,
/// the new one works.
#[sqlx::test(migrations = "../db/migrations")]
async fn reregistration_rotates_the_token(pool: PgPool) {
    let (user, account, _token) = seed_user_account(&pool, "rotate").await;
    let app = common::build_test_app(pool.clone());

    let old_token = register_agent(app.clone(), &user.id, &account.id).await;
    let new_token = register_agent(app.clone(), &user.id, &account.id).await;
    assert_ne!(old_token, new_token);

    let heartbeat = serde_json::json!({ "accountId": account.id, "status": "IDLE" });

    let response = post_json_auth(app.clone(), "/agent/heartbeat", heartbeat.clone(), &old_token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["errorCode"], "UNAUTHORIZED");

    let response = post_json_auth(app.clone(), "/agent/heartbeat", heartbeat, &new_token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Scope enforcement
// ---------------------------------------------------------------------------

/// An agent token never authorizes operations on another account.
#[sqlx::test(migrations = "../db/migrations")]
async fn token_scope_is_single_account(pool: PgPool) {
    let (user_a, account_a, _ta) = seed_user_account(&pool, "scope-a").await;
    let (_user_b, account_b, _tb) = seed_user_account(&pool, "scope-b").await;
    let app = common::build_test_app(pool.clone());

    let token_a = register_agent(app.clone(), &user_a.id, &account_a.id).await;

    let response = post_json_auth(
        app.clone(),
        "/agent/heartbeat",
        serde_json::json!({ "accountId": account_b.id, "status": "IDLE" }),
        &token_a,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(
        app.clone(),
        &format!("/agent/jobs?accountId={}", account_b.id),
        &token_a,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(
        app.clone(),
        &format!("/agent/control-state?accountId={}", account_b.id),
        &token_a,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Missing or malformed credentials are rejected at the wire layer.
#[sqlx::test(migrations = "../db/migrations")]
async fn agent_endpoints_require_a_token(pool: PgPool) {
    let (_user, account, _token) = seed_user_account(&pool, "anon").await;
    let app = common::build_test_app(pool.clone());

    let response = common::get(
        app.clone(),
        &format!("/agent/jobs?accountId={}", account.id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A user JWT is not an agent token.
    let response = get_auth(
        app.clone(),
        &format!("/agent/jobs?accountId={}", account.id),
        &common::user_token("anon@test.example"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Deregistration
// ---------------------------------------------------------------------------

/// Deregistering terminates the agent and revokes its token; the account
/// slot frees up for a fresh registration.
#[sqlx::test(migrations = "../db/migrations")]
async fn deregister_revokes_and_frees_the_slot(pool: PgPool) {
    let (user, account, user_token) = seed_user_account(&pool, "exit").await;
    let app = common::build_test_app(pool.clone());

    let agent_token = register_agent(app.clone(), &user.id, &account.id).await;

    let response = post_auth(app.clone(), "/agent/deregister", &agent_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Token is dead.
    let response = post_json_auth(
        app.clone(),
        "/agent/heartbeat",
        serde_json::json!({ "accountId": account.id, "status": "IDLE" }),
        &agent_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // No live agent projection.
    let response = get_auth(
        app.clone(),
        &format!("/api/v1/accounts/{}/agent", account.id),
        &user_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The 1:1 slot is free again.
    let new_token = register_agent(app.clone(), &user.id, &account.id).await;
    let response = post_json_auth(
        app.clone(),
        "/agent/heartbeat",
        serde_json::json!({ "accountId": account.id, "status": "EXECUTING" }),
        &new_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The projection reports the replacement as ACTIVE.
    let response = get_auth(
        app.clone(),
        &format!("/api/v1/accounts/{}/agent", account.id),
        &user_token,
    )
    .await;
    let agent = body_json(response).await;
    assert_eq!(agent["data"]["state"], "ACTIVE");
}
