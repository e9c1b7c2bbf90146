// Shared seed helpers for repository integration tests. Not every test
// binary uses every helper, so dead_code warnings are suppressed.
#![allow(dead_code)]

use sqlx::PgPool;

use outpost_db::models::account::{Account, CreateAccount};
use outpost_db::models::agent::Agent;
use outpost_db::models::user::User;
use outpost_db::repositories::{AccountRepo, AgentRepo, UserRepo};

/// Create a user plus their account. `tag` keeps emails unique per test.
pub async fn seed_account(pool: &PgPool, tag: &str) -> (User, Account) {
    let user = UserRepo::find_or_create_by_email(pool, &format!("{tag}@test.example"))
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

    (user, account)
}

/// Register a live agent for an account.
pub async fn seed_agent(pool: &PgPool, account_id: &str) -> Agent {
    AgentRepo::register(pool, &account_id.to_string(), "1.0.0-test", "linux-x64")
        .await
        .expect("agent registration should succeed")
}
