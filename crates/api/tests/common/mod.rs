// All functions in this module are shared test helpers. Not every test
// binary uses every helper, so we suppress dead_code warnings at the
// module level.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use outpost_api::auth::jwt::{generate_token, JwtConfig};
use outpost_api::config::ServerConfig;
use outpost_api::router::build_app_router;
use outpost_api::state::AppState;
use outpost_db::models::account::{Account, CreateAccount};
use outpost_db::models::user::User;
use outpost_db::repositories::{AccountRepo, UserRepo};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        agent_token_ttl_hours: 1,
        default_job_timeout_secs: 300,
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests-minimum-length".to_string(),
        },
    }
}

/// Build the full application router with all middleware layers.
///
/// Delegates to [`build_app_router`] so integration tests exercise the same
/// middleware stack (CORS, request ID, timeout, tracing, panic recovery)
/// that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Create a user, their account, and a valid user bearer token.
pub async fn seed_user_account(pool: &PgPool, tag: &str) -> (User, Account, String) {
    let email = format!("{tag}@test.example");
    let user = UserRepo::find_or_create_by_email(pool, &email)
        .await
        .expect("user creation should succeed");

    let account = AccountRepo::create(
        pool,
        &user.id,
        &CreateAccount {
            profile_url: format!("https://example.com/in/{tag}"),
            display_name: format!("Test {tag}"),
            metadata: None,
        },
    )
    .await
    .expect("account creation should succeed");

    let token = user_token(&email);
    (user, account, token)
}

/// Mint a user bearer token for an email, signed with the test secret.
pub fn user_token(email: &str) -> String {
    generate_token(&format!("idp|{email}"), email, &test_config().jwt)
        .expect("token generation should succeed")
}

/// Register an agent through the API and return its bearer token.
pub async fn register_agent(app: Router, user_id: &str, account_id: &str) -> String {
    let response = post_json(
        app,
        "/agent/register",
        serde_json::json!({
            "userId": user_id,
            "accountId": account_id,
            "agentVersion": "1.0.0-test",
            "platform": "linux-x64",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    json["agentToken"]
        .as_str()
        .expect("response must contain agentToken")
        .to_string()
}

// ---------------------------------------------------------------------------
// Shared HTTP test helpers
// ---------------------------------------------------------------------------

/// Collect the response body into a `serde_json::Value`.
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Send a JSON request with the given method and optional bearer token.
pub async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    bearer: Option<&str>,
) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// GET without authentication.
pub async fn get(app: Router, uri: &str) -> axum::response::Response {
    send_json(app, Method::GET, uri, None, None).await
}

/// GET with a bearer token.
pub async fn get_auth(app: Router, uri: &str, bearer: &str) -> axum::response::Response {
    send_json(app, Method::GET, uri, None, Some(bearer)).await
}

/// POST JSON without authentication.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
) -> axum::response::Response {
    send_json(app, Method::POST, uri, Some(body), None).await
}

/// POST JSON with a bearer token.
pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    bearer: &str,
) -> axum::response::Response {
    send_json(app, Method::POST, uri, Some(body), Some(bearer)).await
}

/// POST with an empty body and a bearer token.
pub async fn post_auth(app: Router, uri: &str, bearer: &str) -> axum::response::Response {
    send_json(app, Method::POST, uri, None, Some(bearer)).await
}

/// PUT JSON with a bearer token.
pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    bearer: &str,
) -> axum::response::Response {
    send_json(app, Method::PUT, uri, Some(body), Some(bearer)).await
}
