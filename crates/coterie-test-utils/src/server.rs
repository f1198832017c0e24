use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use coterie_core::config::{CoterieConfig, DatabaseConfig, JwtConfig};
use coterie_core::types::{Account, ActivationInput, CreateAccountInput, RegistrationMethod};
use coterie_core::{AccountStore, ModerationStore};
use coterie_server::{AppState, Notifier, build_router};
use coterie_storage_sqlite::{SqliteAccountStore, SqliteBrandStore, SqliteProfileStore};

use crate::notifier::RecordingNotifier;
use crate::stores::{TestStores, create_test_stores};

pub const TEST_ACCESS_SECRET: &str = "test-access-secret-at-least-32-chars-long";
pub const TEST_REFRESH_SECRET: &str = "test-refresh-secret-at-least-32-chars-long";
pub const TEST_PASSWORD: &str = "hunter2-test-password";

pub fn create_test_config() -> CoterieConfig {
    CoterieConfig {
        hostname: "test.coterie.local".to_string(),
        port: 0,
        public_url: "https://test.coterie.local".to_string(),
        site_name: "Coterie Test".to_string(),
        jwt: JwtConfig {
            access_secret: TEST_ACCESS_SECRET.to_string(),
            refresh_secret: TEST_REFRESH_SECRET.to_string(),
        },
        database: DatabaseConfig {
            url: String::new(), // not used; stores are pre-connected
        },
        smtp: None,
        tls: None,
    }
}

pub fn create_test_app_state(
    stores: &TestStores,
    notifier: Option<Arc<dyn Notifier>>,
) -> AppState<SqliteAccountStore, SqliteProfileStore, SqliteBrandStore> {
    AppState {
        account_store: Arc::new(stores.account_store.clone()),
        profile_store: Arc::new(stores.profile_store.clone()),
        brand_store: Arc::new(stores.brand_store.clone()),
        moderation_store: Arc::new(stores.moderation_store.clone()) as Arc<dyn ModerationStore>,
        config: Arc::new(create_test_config()),
        notifier,
    }
}

/// Router + stores + a recording notifier so tests can assert on email
/// dispatches.
pub async fn create_test_router_and_stores() -> (Router, TestStores, Arc<RecordingNotifier>) {
    let stores = create_test_stores().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let state = create_test_app_state(&stores, Some(notifier.clone() as Arc<dyn Notifier>));
    let router = build_router(state);
    (router, stores, notifier)
}

/// Seed an active member directly through the store layer and return the
/// account row. Password is TEST_PASSWORD.
pub async fn create_active_member(
    stores: &TestStores,
    email: &str,
    first_name: &str,
    last_name: &str,
    moderator: bool,
) -> Account {
    let input = CreateAccountInput {
        id: uuid::Uuid::new_v4().to_string(),
        email: email.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        activation_token: coterie_crypto::generate_activation_token(),
        registration_method: RegistrationMethod::Invited,
        application_comments: String::new(),
        applied_at: None,
    };
    let account = stores
        .account_store
        .create_account(&input)
        .await
        .expect("failed to seed account");

    let activation = ActivationInput {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        password_hash: coterie_crypto::hash_password(TEST_PASSWORD).unwrap(),
    };
    let activated = stores
        .account_store
        .activate_account(&account.id, &activation)
        .await
        .expect("failed to activate seeded account");
    assert!(activated, "seeded account should activate exactly once");

    if moderator {
        stores
            .account_store
            .set_moderator(&account.id, true)
            .await
            .expect("failed to set moderator flag");
    }

    stores
        .account_store
        .get_account_by_id(&account.id)
        .await
        .unwrap()
        .expect("seeded account should exist")
}

/// Log a seeded member in via the API and return (access_jwt, refresh_jwt).
pub async fn login_via_api(router: &Router, email: &str) -> (String, String) {
    let (status, body) = send_request(
        router,
        "POST",
        "/api/session",
        None,
        Some(serde_json::json!({
            "email": email,
            "password": TEST_PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, 200, "login failed: {body}");

    let access_jwt = body["accessJwt"].as_str().unwrap().to_string();
    let refresh_jwt = body["refreshJwt"].as_str().unwrap().to_string();
    (access_jwt, refresh_jwt)
}

/// Send a request through the router and return (status, body_json).
pub async fn send_request(
    router: &Router,
    method: &str,
    uri: &str,
    auth_token: Option<&str>,
    body: Option<Value>,
) -> (u16, Value) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);

    if let Some(token) = auth_token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }

    let req_body = match body {
        Some(b) => Body::from(serde_json::to_vec(&b).unwrap()),
        None => Body::empty(),
    };

    let req = builder.body(req_body).unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status().as_u16();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).to_string(),
        ))
    };

    (status, json)
}
