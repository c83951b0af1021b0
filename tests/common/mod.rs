//! Common test utilities.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use chrono::Utc;

use foundernet::server::{self, AppState};
use foundernet::store::file::{FileEventStore, FileMessageStore, FileUserStore};
use foundernet::store::{Credential, FundingStage, Industry, User, UserStore};

/// Create a test `AppState` backed by file stores in a temp directory.
pub async fn test_app_state() -> AppState {
    use tempfile::TempDir;

    let tmp = TempDir::new().unwrap();

    // Leak the TempDir so it doesn't get cleaned up during the test.
    let tmp = Box::leak(Box::new(tmp));

    let users = Arc::new(FileUserStore::open(tmp.path().join("users")).await.unwrap());
    let events = Arc::new(
        FileEventStore::open(tmp.path().join("events"))
            .await
            .unwrap(),
    );
    let messages = Arc::new(
        FileMessageStore::open(tmp.path().join("messages"))
            .await
            .unwrap(),
    );

    AppState::new(users, events, messages)
}

/// Create a test app with empty stores.
pub async fn test_app() -> Router {
    let state = test_app_state().await;
    server::build_app(state, 300)
}

/// Insert a user with a known bearer token and return the record.
pub async fn seed_user(state: &AppState, name: &str, token: &str) -> User {
    let now = Utc::now();
    let user = User {
        id: User::new_id(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        startup_name: format!("{name} Labs"),
        industry: Industry::SaaS,
        funding_stage: FundingStage::Seed,
        location: "San Francisco, CA".to_string(),
        bio: "Serial founder focused on developer tooling, previously shipped two \
              infrastructure products at scale."
            .to_string(),
        profile_image: None,
        is_active: true,
        last_seen: now,
        created_at: now,
        updated_at: now,
        credential: Credential {
            token: token.to_string(),
            expires_at: None,
        },
    };
    state.users.create(user.clone()).await.unwrap();
    user
}
