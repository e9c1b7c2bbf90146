//! HTTP-level integration tests for the dispatch pipeline: job creation,
//! pull/assign, agent events, and the idempotent result commit.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json_auth, register_agent, seed_user_account};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a job via the control plane and return its id.
async fn create_job(
    app: axum::Router,
    user_token: &str,
    account_id: &str,
    priority: i32,
) -> String {
    let response = post_json_auth(
        app,
        "/api/v1/jobs",
        serde_json::json!({
            "accountId": account_id,
            "type": "VISIT_PROFILE",
            "parameters": { "profileUrl": "https://example.com/in/jane", "leadId": "lead-1" },
            "priority": priority,
        }),
        user_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["id"].as_str().expect("job id").to_string()
}

// ---------------------------------------------------------------------------
// Happy path (end to end)
// ---------------------------------------------------------------------------

/// Register -> heartbeat allowed -> pull assigns -> ACTION_STARTED moves to
/// EXECUTING -> SUCCESS result completes -> duplicate replay is identical.
#[sqlx::test(migrations = "../db/migrations")]
async fn happy_path(pool: PgPool) {
    let (user, account, user_token) = seed_user_account(&pool, "happy").await;
    let app = common::build_test_app(pool.clone());

    let agent_token = register_agent(app.clone(), &user.id, &account.id).await;

    let job_id = create_job(app.clone(), &user_token, &account.id, 1).await;

    // Heartbeat: allowed.
    let response = post_json_auth(
        app.clone(),
        "/agent/heartbeat",
        serde_json::json!({ "accountId": account.id, "status": "IDLE" }),
        &agent_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let verdict = body_json(response).await;
    assert_eq!(verdict["allowed"], true);
    assert_eq!(verdict["reason"], serde_json::Value::Null);

    // Pull: the job comes back with its payload and the job is ASSIGNED.
    let response = get_auth(
        app.clone(),
        &format!("/agent/jobs?accountId={}", account.id),
        &agent_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let batch = body_json(response).await;
    assert_eq!(batch["jobs"].as_array().unwrap().len(), 1);
    assert_eq!(batch["jobs"][0]["jobId"], job_id.as_str());
    assert_eq!(batch["jobs"][0]["type"], "VISIT_PROFILE");
    assert_eq!(batch["jobs"][0]["leadId"], "lead-1");
    assert_eq!(
        batch["jobs"][0]["payload"]["profileUrl"],
        "https://example.com/in/jane"
    );

    let response = get_auth(app.clone(), &format!("/api/v1/jobs/{job_id}"), &user_token).await;
    let job = body_json(response).await;
    assert_eq!(job["data"]["state"], "ASSIGNED");

    // ACTION_STARTED: job moves to EXECUTING.
    let response = post_json_auth(
        app.clone(),
        "/agent/events",
        serde_json::json!({
            "jobId": job_id,
            "eventType": "ACTION_STARTED",
            "message": "opening profile",
        }),
        &agent_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app.clone(), &format!("/api/v1/jobs/{job_id}"), &user_token).await;
    let job = body_json(response).await;
    assert_eq!(job["data"]["state"], "EXECUTING");

    // Result: SUCCESS completes the job.
    let result_body = serde_json::json!({
        "status": "SUCCESS",
        "metadata": { "observedState": null },
    });
    let response = post_json_auth(
        app.clone(),
        &format!("/agent/jobs/{job_id}/result"),
        result_body.clone(),
        &agent_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_json(response).await;
    assert_eq!(first["data"]["status"], "SUCCESS");
    assert_eq!(first["data"]["jobId"], job_id.as_str());

    let response = get_auth(app.clone(), &format!("/api/v1/jobs/{job_id}"), &user_token).await;
    let job = body_json(response).await;
    assert_eq!(job["data"]["state"], "COMPLETED");

    // Duplicate submission: identical response, still exactly one result.
    let response = post_json_auth(
        app.clone(),
        &format!("/agent/jobs/{job_id}/result"),
        result_body,
        &agent_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let replay = body_json(response).await;
    assert_eq!(replay, first);

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM job_results WHERE job_id = $1")
            .bind(&job_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 1);

    // Audit completeness: the transition trail exists.
    let response = get_auth(
        app.clone(),
        &format!("/api/v1/audit?entityType=Job&entityId={job_id}"),
        &user_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let audit = body_json(response).await;
    let events: Vec<&str> = audit["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["eventType"].as_str().unwrap())
        .collect();
    assert!(events.contains(&"job_created"));
    assert!(events.contains(&"job_assigned"));
    assert!(events.contains(&"ACTION_STARTED"));
    assert!(events.contains(&"job_completed"));
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Higher priority is dispatched first across sequential single-job pulls.
#[sqlx::test(migrations = "../db/migrations")]
async fn priority_ordering_across_pulls(pool: PgPool) {
    let (user, account, user_token) = seed_user_account(&pool, "priority").await;
    let app = common::build_test_app(pool.clone());
    let agent_token = register_agent(app.clone(), &user.id, &account.id).await;

    let lo = create_job(app.clone(), &user_token, &account.id, 1).await;
    let hi = create_job(app.clone(), &user_token, &account.id, 5).await;

    let response = get_auth(
        app.clone(),
        &format!("/agent/jobs?accountId={}", account.id),
        &agent_token,
    )
    .await;
    let batch = body_json(response).await;
    let ids: Vec<&str> = batch["jobs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["jobId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![hi.as_str(), lo.as_str()]);
}

/// A future earliestExecutionTime keeps the job out of the batch.
#[sqlx::test(migrations = "../db/migrations")]
async fn future_jobs_are_withheld(pool: PgPool) {
    let (user, account, user_token) = seed_user_account(&pool, "withheld").await;
    let app = common::build_test_app(pool.clone());
    let agent_token = register_agent(app.clone(), &user.id, &account.id).await;

    let eet = (chrono::Utc::now() + chrono::Duration::hours(1)).to_rfc3339();
    let response = post_json_auth(
        app.clone(),
        "/api/v1/jobs",
        serde_json::json!({
            "accountId": account.id,
            "type": "VISIT_PROFILE",
            "parameters": { "profileUrl": "https://example.com/in/later" },
            "earliestExecutionTime": eet,
        }),
        &user_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(
        app.clone(),
        &format!("/agent/jobs?accountId={}", account.id),
        &agent_token,
    )
    .await;
    let batch = body_json(response).await;
    assert!(batch["jobs"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Ownership and state rejections
// ---------------------------------------------------------------------------

/// A result from an agent other than the assignee is rejected with 403.
#[sqlx::test(migrations = "../db/migrations")]
async fn foreign_agent_cannot_submit_result(pool: PgPool) {
    let (user_a, account_a, token_a) = seed_user_account(&pool, "owner").await;
    let (user_b, account_b, _token_b) = seed_user_account(&pool, "intruder").await;
    let app = common::build_test_app(pool.clone());

    let agent_a = register_agent(app.clone(), &user_a.id, &account_a.id).await;
    let agent_b = register_agent(app.clone(), &user_b.id, &account_b.id).await;

    let job_id = create_job(app.clone(), &token_a, &account_a.id, 0).await;

    // Agent A claims the job.
    let response = get_auth(
        app.clone(),
        &format!("/agent/jobs?accountId={}", account_a.id),
        &agent_a,
    )
    .await;
    assert_eq!(body_json(response).await["jobs"].as_array().unwrap().len(), 1);

    // Agent B (scoped to account B) tries to report on it.
    let response = post_json_auth(
        app.clone(),
        &format!("/agent/jobs/{job_id}/result"),
        serde_json::json!({ "status": "SUCCESS" }),
        &agent_b,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let err = body_json(response).await;
    assert_eq!(err["errorCode"], "FORBIDDEN");
}

/// Events for a job not assigned to the reporting agent are rejected.
#[sqlx::test(migrations = "../db/migrations")]
async fn event_for_unassigned_job_is_rejected(pool: PgPool) {
    let (user, account, user_token) = seed_user_account(&pool, "events").await;
    let app = common::build_test_app(pool.clone());
    let agent_token = register_agent(app.clone(), &user.id, &account.id).await;

    // Job exists but was never pulled: no assignee.
    let job_id = create_job(app.clone(), &user_token, &account.id, 0).await;

    let response = post_json_auth(
        app.clone(),
        "/agent/events",
        serde_json::json!({ "jobId": job_id, "eventType": "INFO", "message": "hello" }),
        &agent_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// A result for a job that was never assigned is rejected, and the job is
/// untouched.
#[sqlx::test(migrations = "../db/migrations")]
async fn result_for_pending_job_is_rejected(pool: PgPool) {
    let (user, account, user_token) = seed_user_account(&pool, "pending").await;
    let app = common::build_test_app(pool.clone());
    let agent_token = register_agent(app.clone(), &user.id, &account.id).await;

    let job_id = create_job(app.clone(), &user_token, &account.id, 0).await;

    let response = post_json_auth(
        app.clone(),
        &format!("/agent/jobs/{job_id}/result"),
        serde_json::json!({ "status": "SUCCESS" }),
        &agent_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app.clone(), &format!("/api/v1/jobs/{job_id}"), &user_token).await;
    assert_eq!(body_json(response).await["data"]["state"], "PENDING");
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Per-type parameter validation happens at creation.
#[sqlx::test(migrations = "../db/migrations")]
async fn job_parameters_are_validated_per_type(pool: PgPool) {
    let (_user, account, user_token) = seed_user_account(&pool, "params").await;
    let app = common::build_test_app(pool.clone());

    // COMMENT_POST without messageText.
    let response = post_json_auth(
        app.clone(),
        "/api/v1/jobs",
        serde_json::json!({
            "accountId": account.id,
            "type": "COMMENT_POST",
            "parameters": { "postUrl": "https://example.com/p/1" },
        }),
        &user_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err = body_json(response).await;
    assert_eq!(err["errorCode"], "INVALID_REQUEST");
}

/// Users cannot create jobs against accounts they do not own.
#[sqlx::test(migrations = "../db/migrations")]
async fn job_creation_respects_account_ownership(pool: PgPool) {
    let (_user_a, account_a, _token_a) = seed_user_account(&pool, "victim").await;
    let (_user_b, _account_b, token_b) = seed_user_account(&pool, "attacker").await;
    let app = common::build_test_app(pool.clone());

    let response = post_json_auth(
        app.clone(),
        "/api/v1/jobs",
        serde_json::json!({
            "accountId": account_a.id,
            "type": "VISIT_PROFILE",
            "parameters": { "profileUrl": "https://example.com/in/x" },
        }),
        &token_b,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
