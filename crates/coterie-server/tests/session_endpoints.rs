use coterie_core::AccountStore;
use coterie_test_utils::*;
use serde_json::json;

// ── createSession ───────────────────────────────────────────────────────

#[tokio::test]
async fn login_success_returns_tokens() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;
    create_active_member(&stores, "alice@test.com", "Alice", "Adams", false).await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/session",
        None,
        Some(json!({ "email": "alice@test.com", "password": TEST_PASSWORD })),
    )
    .await;
    assert_api_ok(status, &body);
    assert!(body["accessJwt"].as_str().is_some());
    assert!(body["refreshJwt"].as_str().is_some());
    assert_eq!(body["firstName"], "Alice");
    assert_eq!(body["isModerator"], false);
}

#[tokio::test]
async fn login_wrong_password_rejected() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;
    create_active_member(&stores, "bob@test.com", "Bob", "Brown", false).await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/session",
        None,
        Some(json!({ "email": "bob@test.com", "password": "wrong-password" })),
    )
    .await;
    assert_api_error(status, &body, 401, "InvalidPassword");
}

#[tokio::test]
async fn login_unknown_email_rejected() {
    let (router, _stores, _notifier) = create_test_router_and_stores().await;
    let (status, body) = send_request(
        &router,
        "POST",
        "/api/session",
        None,
        Some(json!({ "email": "nobody@test.com", "password": TEST_PASSWORD })),
    )
    .await;
    assert_api_error(status, &body, 400, "AccountNotFound");
}

#[tokio::test]
async fn login_inactive_account_rejected() {
    let (router, _stores, _notifier) = create_test_router_and_stores().await;

    // Request an invitation but never activate it.
    send_request(
        &router,
        "POST",
        "/api/account/request-invitation",
        None,
        Some(json!({
            "email": "pending@test.com",
            "firstName": "Pending",
            "lastName": "Member",
        })),
    )
    .await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/session",
        None,
        Some(json!({ "email": "pending@test.com", "password": TEST_PASSWORD })),
    )
    .await;
    assert_api_error(status, &body, 400, "AccountInactive");
}

#[tokio::test]
async fn login_closed_account_rejected() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;
    let account = create_active_member(&stores, "gone@test.com", "Gone", "Member", false).await;
    stores.account_store.close_account(&account.id).await.unwrap();

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/session",
        None,
        Some(json!({ "email": "gone@test.com", "password": TEST_PASSWORD })),
    )
    .await;
    assert_api_error(status, &body, 400, "AccountClosed");
}

// ── getSession ──────────────────────────────────────────────────────────

#[tokio::test]
async fn get_session_requires_auth() {
    let (router, _stores, _notifier) = create_test_router_and_stores().await;
    let (status, body) = send_request(&router, "GET", "/api/session", None, None).await;
    assert_api_error(status, &body, 401, "AuthenticationRequired");
}

#[tokio::test]
async fn get_session_returns_account_summary() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;
    let account = create_active_member(&stores, "carol@test.com", "Carol", "Clark", false).await;
    let (access_jwt, _) = login_via_api(&router, "carol@test.com").await;

    let (status, body) = send_request(&router, "GET", "/api/session", Some(&access_jwt), None).await;
    assert_api_ok(status, &body);
    assert_eq!(body["accountId"], account.id.as_str());
    assert_eq!(body["email"], "carol@test.com");
}

// ── refreshSession ──────────────────────────────────────────────────────

#[tokio::test]
async fn refresh_rotates_the_session() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;
    create_active_member(&stores, "dave@test.com", "Dave", "Dunn", false).await;
    let (_, refresh_jwt) = login_via_api(&router, "dave@test.com").await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/session/refresh",
        Some(&refresh_jwt),
        None,
    )
    .await;
    assert_api_ok(status, &body);
    assert!(body["accessJwt"].as_str().is_some());
    assert!(body["refreshJwt"].as_str().is_some());

    // The old refresh token died with the rotation.
    let (status, body) = send_request(
        &router,
        "POST",
        "/api/session/refresh",
        Some(&refresh_jwt),
        None,
    )
    .await;
    assert_api_error(status, &body, 401, "AuthenticationRequired");
}

#[tokio::test]
async fn refresh_with_garbage_token_rejected() {
    let (router, _stores, _notifier) = create_test_router_and_stores().await;
    let (status, body) = send_request(
        &router,
        "POST",
        "/api/session/refresh",
        Some("not-a-jwt"),
        None,
    )
    .await;
    assert_api_error(status, &body, 401, "InvalidToken");
}

// ── deleteSession ───────────────────────────────────────────────────────

#[tokio::test]
async fn logout_revokes_refresh_tokens() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;
    create_active_member(&stores, "erin@test.com", "Erin", "Evans", false).await;
    let (access_jwt, refresh_jwt) = login_via_api(&router, "erin@test.com").await;

    let (status, _body) = send_request(
        &router,
        "POST",
        "/api/session/logout",
        Some(&access_jwt),
        None,
    )
    .await;
    assert_eq!(status, 200);

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/session/refresh",
        Some(&refresh_jwt),
        None,
    )
    .await;
    assert_api_error(status, &body, 401, "AuthenticationRequired");
}
