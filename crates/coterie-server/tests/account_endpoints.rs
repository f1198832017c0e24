use std::sync::Arc;

use coterie_core::AccountStore;
use coterie_core::types::RegistrationMethod;
use coterie_server::{Notifier, build_router};
use coterie_test_utils::*;
use serde_json::json;

// ── requestInvitation ───────────────────────────────────────────────────

#[tokio::test]
async fn request_invitation_creates_inactive_requested_account() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/account/request-invitation",
        None,
        Some(json!({
            "email": "a@example.com",
            "firstName": "A",
            "lastName": "B",
            "comments": "friend of a member",
        })),
    )
    .await;
    assert_api_ok(status, &body);

    let account = stores
        .account_store
        .get_account_by_email("a@example.com")
        .await
        .unwrap()
        .expect("account should have been created");
    assert!(!account.is_active);
    assert!(!account.token_used);
    assert_eq!(account.registration_method, RegistrationMethod::Requested);
    assert_eq!(account.application_comments, "friend of a member");
    assert!(account.applied_at.is_some());
    assert_eq!(account.activation_token.len(), 32);
}

#[tokio::test]
async fn request_invitation_notifies_each_active_moderator() {
    let (router, stores, notifier) = create_test_router_and_stores().await;

    create_active_member(&stores, "mod1@test.com", "Mod", "One", true).await;
    create_active_member(&stores, "mod2@test.com", "Mod", "Two", true).await;
    // Plain member: must not be notified.
    create_active_member(&stores, "member@test.com", "Plain", "Member", false).await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/account/request-invitation",
        None,
        Some(json!({
            "email": "applicant@example.com",
            "firstName": "App",
            "lastName": "Licant",
        })),
    )
    .await;
    assert_api_ok(status, &body);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2, "one notification per active moderator");
    assert!(sent.iter().all(|e| e.kind == "application-notification"));
    assert!(sent.iter().any(|e| e.to == "mod1@test.com"));
    assert!(sent.iter().any(|e| e.to == "mod2@test.com"));
    assert_eq!(sent[0].detail, "App Licant");
}

#[tokio::test]
async fn request_invitation_with_no_moderators_still_succeeds() {
    let (router, stores, notifier) = create_test_router_and_stores().await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/account/request-invitation",
        None,
        Some(json!({
            "email": "lonely@example.com",
            "firstName": "No",
            "lastName": "Mods",
        })),
    )
    .await;
    assert_api_ok(status, &body);
    assert!(notifier.sent().is_empty());
    assert!(
        stores
            .account_store
            .get_account_by_email("lonely@example.com")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn request_invitation_malformed_input_creates_no_record() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/account/request-invitation",
        None,
        Some(json!({
            "email": "not-an-email",
            "firstName": "",
            "lastName": "B",
        })),
    )
    .await;
    assert_api_error(status, &body, 400, "ValidationError");
    assert!(body["fields"]["email"].is_string());
    assert!(body["fields"]["first_name"].is_string());

    assert!(
        stores
            .account_store
            .get_account_by_email("not-an-email")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn request_invitation_duplicate_email_rejected() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;
    create_active_member(&stores, "taken@example.com", "Already", "Here", false).await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/account/request-invitation",
        None,
        Some(json!({
            "email": "taken@example.com",
            "firstName": "New",
            "lastName": "Applicant",
        })),
    )
    .await;
    assert_api_error(status, &body, 400, "DuplicateEmail");
}

#[tokio::test]
async fn notification_failure_does_not_roll_back_account() {
    let stores = create_test_stores().await;
    let failing = Arc::new(RecordingNotifier::failing());
    let state = create_test_app_state(&stores, Some(failing.clone() as Arc<dyn Notifier>));
    let router = build_router(state);

    create_active_member(&stores, "mod@test.com", "Mod", "One", true).await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/account/request-invitation",
        None,
        Some(json!({
            "email": "applicant@example.com",
            "firstName": "App",
            "lastName": "Licant",
        })),
    )
    .await;
    assert_api_ok(status, &body);

    assert!(
        stores
            .account_store
            .get_account_by_email("applicant@example.com")
            .await
            .unwrap()
            .is_some(),
        "account survives dispatch failure"
    );
}

// ── activation preview ──────────────────────────────────────────────────

#[tokio::test]
async fn activation_preview_unknown_token_is_404() {
    let (router, _stores, _notifier) = create_test_router_and_stores().await;
    let (status, body) = send_request(
        &router,
        "GET",
        "/api/account/activate/no-such-token",
        None,
        None,
    )
    .await;
    assert_api_error(status, &body, 404, "NotFound");
}

#[tokio::test]
async fn activation_preview_shows_invitee() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;
    send_request(
        &router,
        "POST",
        "/api/account/request-invitation",
        None,
        Some(json!({
            "email": "invitee@example.com",
            "firstName": "In",
            "lastName": "Vitee",
        })),
    )
    .await;
    let token = stores
        .account_store
        .get_account_by_email("invitee@example.com")
        .await
        .unwrap()
        .unwrap()
        .activation_token;

    let (status, body) = send_request(
        &router,
        "GET",
        &format!("/api/account/activate/{token}"),
        None,
        None,
    )
    .await;
    assert_api_ok(status, &body);
    assert_eq!(body["tokenUsed"], false);
    assert_eq!(body["email"], "invitee@example.com");
    assert_eq!(body["firstName"], "In");
}

// ── activateAccount ─────────────────────────────────────────────────────

async fn seed_pending(router: &axum::Router, stores: &TestStores, email: &str) -> String {
    send_request(
        router,
        "POST",
        "/api/account/request-invitation",
        None,
        Some(json!({
            "email": email,
            "firstName": "Pending",
            "lastName": "Member",
        })),
    )
    .await;
    stores
        .account_store
        .get_account_by_email(email)
        .await
        .unwrap()
        .unwrap()
        .activation_token
}

#[tokio::test]
async fn activate_promotes_account_and_establishes_session() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;
    let token = seed_pending(&router, &stores, "fresh@example.com").await;

    let (status, body) = send_request(
        &router,
        "POST",
        &format!("/api/account/activate/{token}"),
        None,
        Some(json!({
            "firstName": "Fresh",
            "lastName": "Member",
            "password": "secret123",
            "confirmPassword": "secret123",
        })),
    )
    .await;
    assert_api_ok(status, &body);
    let access_jwt = body["accessJwt"].as_str().unwrap();
    assert!(body["refreshJwt"].as_str().is_some());

    let account = stores
        .account_store
        .get_account_by_email("fresh@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(account.is_active);
    assert!(account.token_used);
    assert!(account.activated_at.is_some());
    assert_eq!(account.first_name, "Fresh");

    // The returned session is immediately usable.
    let (status, body) = send_request(&router, "GET", "/api/session", Some(access_jwt), None).await;
    assert_api_ok(status, &body);
    assert_eq!(body["email"], "fresh@example.com");

    // And the activated credentials allow a normal login.
    let (status, _body) = send_request(
        &router,
        "POST",
        "/api/session",
        None,
        Some(json!({ "email": "fresh@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn activate_used_token_returns_already_used_and_leaves_account_alone() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;
    let token = seed_pending(&router, &stores, "once@example.com").await;

    let form = json!({
        "firstName": "Once",
        "lastName": "Only",
        "password": "secret123",
        "confirmPassword": "secret123",
    });
    let (status, _body) = send_request(
        &router,
        "POST",
        &format!("/api/account/activate/{token}"),
        None,
        Some(form.clone()),
    )
    .await;
    assert_eq!(status, 200);

    let before = stores
        .account_store
        .get_account_by_email("once@example.com")
        .await
        .unwrap()
        .unwrap();

    let (status, body) = send_request(
        &router,
        "POST",
        &format!("/api/account/activate/{token}"),
        None,
        Some(form),
    )
    .await;
    assert_api_error(status, &body, 410, "TokenAlreadyUsed");

    let after = stores
        .account_store
        .get_account_by_email("once@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.password_hash, before.password_hash);
    assert_eq!(after.activated_at, before.activated_at);
    assert!(after.token_used);
}

#[tokio::test]
async fn used_token_rejected_before_form_validation() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;
    let token = seed_pending(&router, &stores, "precedence@example.com").await;

    send_request(
        &router,
        "POST",
        &format!("/api/account/activate/{token}"),
        None,
        Some(json!({
            "firstName": "First",
            "lastName": "Pass",
            "password": "secret123",
            "confirmPassword": "secret123",
        })),
    )
    .await;

    // Garbage form fields: the terminal answer must still be AlreadyUsed,
    // not a validation error.
    let (status, body) = send_request(
        &router,
        "POST",
        &format!("/api/account/activate/{token}"),
        None,
        Some(json!({
            "firstName": "",
            "lastName": "",
            "password": "x",
            "confirmPassword": "y",
        })),
    )
    .await;
    assert_api_error(status, &body, 410, "TokenAlreadyUsed");
}

#[tokio::test]
async fn activate_invalid_form_leaves_account_inactive() {
    let (router, stores, _notifier) = create_test_router_and_stores().await;
    let token = seed_pending(&router, &stores, "invalid@example.com").await;

    let (status, body) = send_request(
        &router,
        "POST",
        &format!("/api/account/activate/{token}"),
        None,
        Some(json!({
            "firstName": "Short",
            "lastName": "Password",
            "password": "short",
            "confirmPassword": "short",
        })),
    )
    .await;
    assert_api_error(status, &body, 400, "ValidationError");

    let account = stores
        .account_store
        .get_account_by_email("invalid@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(!account.is_active);
    assert!(!account.token_used, "failed validation must not burn the token");
}

#[tokio::test]
async fn activate_unknown_token_is_404() {
    let (router, _stores, _notifier) = create_test_router_and_stores().await;
    let (status, body) = send_request(
        &router,
        "POST",
        "/api/account/activate/bogus-token",
        None,
        Some(json!({
            "firstName": "A",
            "lastName": "B",
            "password": "secret123",
            "confirmPassword": "secret123",
        })),
    )
    .await;
    assert_api_error(status, &body, 404, "NotFound");
}
