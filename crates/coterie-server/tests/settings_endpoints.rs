use coterie_core::AccountStore;
use coterie_test_utils::*;
use serde_json::json;

// ── getSettings / updateSettings ────────────────────────────────────────

#[tokio::test]
async fn settings_require_auth() {
    let (router, _stores, _notifier) = create_test_router_and_stores().await;

    let (status, body) = send_request(&router, "GET", "/api/account/settings", None, None).await;
    assert_api_error(status, &body, 401, "AuthenticationRequired");

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/account/settings",
        None,
        Some(json!({ "email": "x@test.com" })),
    )
    .await;
    assert_api_error(status, &body, 401, "AuthenticationRequired");

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/account/close",
        None,
        Some(json!({ "password": TEST_PASSWORD })),
    )
    .await;
    assert_api_error(status, &body, 401, "AuthenticationRequired");
}

#[tokio::test]
async fn get_settings_returns_current_email() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;
    create_active_member(&stores, "settings@test.com", "Set", "Tings", false).await;
    let (jwt, _) = login_via_api(&router, "settings@test.com").await;

    let (status, body) =
        send_request(&router, "GET", "/api/account/settings", Some(&jwt), None).await;
    assert_api_ok(status, &body);
    assert_eq!(body["email"], "settings@test.com");
}

#[tokio::test]
async fn update_email_only_keeps_password() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;
    create_active_member(&stores, "old-email@test.com", "Keep", "Pass", false).await;
    let (jwt, _) = login_via_api(&router, "old-email@test.com").await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/account/settings",
        Some(&jwt),
        Some(json!({ "email": "new-email@test.com" })),
    )
    .await;
    assert_api_ok(status, &body);

    let account = stores
        .account_store
        .get_account_by_email("new-email@test.com")
        .await
        .unwrap()
        .expect("email should have changed");
    assert!(!account.password_hash.is_empty());

    // Old password still works against the new email.
    let (status, _body) = send_request(
        &router,
        "POST",
        "/api/session",
        None,
        Some(json!({ "email": "new-email@test.com", "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, 200, "absent password means keep the current one");
}

#[tokio::test]
async fn password_reset_replaces_credential_and_revokes_sessions() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;
    create_active_member(&stores, "reset@test.com", "Re", "Set", false).await;
    let (jwt, refresh_jwt) = login_via_api(&router, "reset@test.com").await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/account/settings",
        Some(&jwt),
        Some(json!({
            "email": "reset@test.com",
            "newPassword": "brand-new-password",
            "confirmPassword": "brand-new-password",
        })),
    )
    .await;
    assert_api_ok(status, &body);

    // Old password is dead, new one works.
    let (status, body) = send_request(
        &router,
        "POST",
        "/api/session",
        None,
        Some(json!({ "email": "reset@test.com", "password": TEST_PASSWORD })),
    )
    .await;
    assert_api_error(status, &body, 401, "InvalidPassword");

    let (status, _body) = send_request(
        &router,
        "POST",
        "/api/session",
        None,
        Some(json!({ "email": "reset@test.com", "password": "brand-new-password" })),
    )
    .await;
    assert_eq!(status, 200);

    // The pre-reset refresh token was revoked.
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
async fn mismatched_password_confirmation_rejected() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;
    create_active_member(&stores, "mismatch@test.com", "Mis", "Match", false).await;
    let (jwt, _) = login_via_api(&router, "mismatch@test.com").await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/account/settings",
        Some(&jwt),
        Some(json!({
            "email": "mismatch@test.com",
            "newPassword": "brand-new-password",
            "confirmPassword": "something-else",
        })),
    )
    .await;
    assert_api_error(status, &body, 400, "ValidationError");
}

#[tokio::test]
async fn invalid_email_rejected() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;
    create_active_member(&stores, "valid@test.com", "Val", "Id", false).await;
    let (jwt, _) = login_via_api(&router, "valid@test.com").await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/account/settings",
        Some(&jwt),
        Some(json!({ "email": "not-an-email" })),
    )
    .await;
    assert_api_error(status, &body, 400, "ValidationError");
}

#[tokio::test]
async fn update_email_to_taken_address_rejected() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;
    create_active_member(&stores, "holder@test.com", "Hold", "Er", false).await;
    create_active_member(&stores, "mover@test.com", "Move", "Er", false).await;
    let (jwt, _) = login_via_api(&router, "mover@test.com").await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/account/settings",
        Some(&jwt),
        Some(json!({ "email": "holder@test.com" })),
    )
    .await;
    assert_api_error(status, &body, 400, "DuplicateEmail");
}

// ── closeAccount ────────────────────────────────────────────────────────

#[tokio::test]
async fn close_account_requires_password_confirmation() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;
    create_active_member(&stores, "stay@test.com", "Stay", "Open", false).await;
    let (jwt, _) = login_via_api(&router, "stay@test.com").await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/account/close",
        Some(&jwt),
        Some(json!({ "password": "wrong-password" })),
    )
    .await;
    assert_api_error(status, &body, 401, "InvalidPassword");

    let account = stores
        .account_store
        .get_account_by_email("stay@test.com")
        .await
        .unwrap()
        .unwrap();
    assert!(account.is_active);
    assert!(!account.is_closed);
}

#[tokio::test]
async fn close_account_soft_deletes_and_ends_sessions() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;
    create_active_member(&stores, "leave@test.com", "Leave", "Now", false).await;
    let (jwt, refresh_jwt) = login_via_api(&router, "leave@test.com").await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/account/close",
        Some(&jwt),
        Some(json!({ "password": TEST_PASSWORD })),
    )
    .await;
    assert_api_ok(status, &body);

    // Soft delete: inactive + closed, but the row is still there by email.
    let account = stores
        .account_store
        .get_account_by_email("leave@test.com")
        .await
        .unwrap()
        .expect("closed account row must be retained");
    assert!(!account.is_active);
    assert!(account.is_closed);

    // Sessions are gone.
    let (status, body) = send_request(
        &router,
        "POST",
        "/api/session/refresh",
        Some(&refresh_jwt),
        None,
    )
    .await;
    assert_api_error(status, &body, 401, "AuthenticationRequired");

    // And a fresh login is refused.
    let (status, body) = send_request(
        &router,
        "POST",
        "/api/session",
        None,
        Some(json!({ "email": "leave@test.com", "password": TEST_PASSWORD })),
    )
    .await;
    assert_api_error(status, &body, 400, "AccountClosed");
}
