//! Common test utilities and mock implementations.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use follow_api::config::Config;
use follow_api::entity::SubscriptionItem;
use follow_api::repository::Repository;
use follow_api::server::state::AppState;
use follow_api::service::Services;
use follow_api::upstream::Mailer;
use follow_api::upstream::SessionApi;
use follow_api::upstream::UserData;
use follow_api::upstream::error::UpstreamError;
use mockall::mock;
use uuid::Uuid;

/// Sets up a temporary test database.
pub async fn setup_db() -> (Arc<Repository>, PathBuf) {
    let uuid = Uuid::new_v4();
    let db_path = std::env::temp_dir().join(format!("follow-api-test-{}.db", uuid));
    let db_url = format!("sqlite://{}", db_path.to_str().unwrap());

    let db = Repository::new(&db_url, db_path.to_str().unwrap())
        .await
        .expect("Failed to create database");

    db.run_migrations().await.expect("Failed to run migrations");

    (Arc::new(db), db_path)
}

/// Cleans up the test database file.
pub async fn teardown_db(db_path: PathBuf) {
    for suffix in ["", "-wal", "-shm"] {
        let path = PathBuf::from(format!("{}{}", db_path.display(), suffix));
        if path.exists() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Parses `freq,name,id` descriptors, panicking on malformed input.
#[allow(dead_code)]
pub fn items(descriptors: &[&str]) -> Vec<SubscriptionItem> {
    descriptors
        .iter()
        .map(|d| d.parse().expect("Invalid descriptor"))
        .collect()
}

// MOCK UPSTREAMS

mock! {
    pub SessionApi {}

    #[async_trait]
    impl SessionApi for SessionApi {
        async fn get_user_data(&self, session_id: &str) -> Result<UserData, UpstreamError>;
    }
}

mock! {
    pub Mailer {}

    #[async_trait]
    impl Mailer for Mailer {
        async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), UpstreamError>;
    }
}

/// Session API mock resolving every session to `user_id`.
#[allow(dead_code)]
pub fn session_api_for(user_id: &'static str) -> MockSessionApi {
    let mut api = MockSessionApi::new();
    api.expect_get_user_data().returning(move |_| {
        Ok(UserData {
            uuid: user_id.to_string(),
        })
    });
    api
}

/// Mailer mock that accepts every message.
#[allow(dead_code)]
pub fn accepting_mailer() -> MockMailer {
    let mut mailer = MockMailer::new();
    mailer.expect_send().returning(|_, _, _| Ok(()));
    mailer
}

/// Builds the full application state on top of `db` with the given upstreams.
#[allow(dead_code)]
pub fn app_state(
    db: Arc<Repository>,
    session_api: MockSessionApi,
    mailer: MockMailer,
) -> AppState {
    let config = Arc::new(Config::new());
    let services = Services::new(db, Arc::new(session_api), Arc::new(mailer), &config)
        .expect("Failed to create services");
    AppState::new(config, Arc::new(services))
}
