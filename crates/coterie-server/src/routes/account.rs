use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::forms;
use crate::routes::session::issue_session;
use crate::state::AppState;
use coterie_core::CoterieError;
use coterie_core::traits::*;
use coterie_core::types::{ActivationInput, CreateAccountInput, RegistrationMethod};

/// Build the row for a new inactive account with a fresh activation token.
pub(crate) fn inactive_account_input(
    email: &str,
    first_name: &str,
    last_name: &str,
    method: RegistrationMethod,
    comments: &str,
) -> CreateAccountInput {
    CreateAccountInput {
        id: uuid::Uuid::new_v4().to_string(),
        email: email.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        activation_token: coterie_crypto::generate_activation_token(),
        registration_method: method,
        application_comments: comments.to_string(),
        applied_at: match method {
            RegistrationMethod::Requested => Some(chrono::Utc::now()),
            _ => None,
        },
    }
}

// ---------------------------------------------------------------------------
// 1. requestInvitation
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInvitationRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub comments: String,
}

pub async fn request_invitation<A, P, B>(
    State(state): State<AppState<A, P, B>>,
    Json(body): Json<RequestInvitationRequest>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    // (a) Validate before anything is persisted.
    let errors =
        forms::validate_request_invitation(&body.email, &body.first_name, &body.last_name);
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    // (b) Create the inactive account; duplicate emails surface here.
    let input = inactive_account_input(
        body.email.trim(),
        body.first_name.trim(),
        body.last_name.trim(),
        RegistrationMethod::Requested,
        &body.comments,
    );
    let account = state.account_store.create_account(&input).await?;

    // (c) Alert every active moderator. Dispatch is best-effort per
    //     recipient; a failed send is logged and must not block the rest.
    let moderators = state.account_store.list_moderators().await?;
    if let Some(ref notifier) = state.notifier {
        let applicant = format!("{} {}", account.first_name, account.last_name);
        for moderator in &moderators {
            if let Err(e) = notifier
                .send_application_notification(&moderator.email, &applicant)
                .await
            {
                tracing::warn!(
                    moderator = %moderator.email,
                    "failed to send application notification: {e}"
                );
            }
        }
    } else if !moderators.is_empty() {
        tracing::warn!("SMTP not configured; skipping moderator notifications");
    }

    Ok(Json(json!({})))
}

// ---------------------------------------------------------------------------
// 2. activation preview
// ---------------------------------------------------------------------------

pub async fn activation_preview<A, P, B>(
    State(state): State<AppState<A, P, B>>,
    Path(token): Path<String>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    let account = state
        .account_store
        .get_account_by_token(&token)
        .await?
        .ok_or_else(|| {
            CoterieError::NotFound("no account holds this activation token".to_string())
        })?;

    if account.token_used {
        // Terminal state, not an error: the page tells the visitor the
        // link has already been spent.
        return Ok(Json(json!({ "tokenUsed": true })));
    }

    Ok(Json(json!({
        "tokenUsed": false,
        "email": account.email,
        "firstName": account.first_name,
        "lastName": account.last_name,
    })))
}

// ---------------------------------------------------------------------------
// 3. activateAccount
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateAccountRequest {
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub confirm_password: String,
}

pub async fn activate_account<A, P, B>(
    State(state): State<AppState<A, P, B>>,
    Path(token): Path<String>,
    Json(body): Json<ActivateAccountRequest>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    let account = state
        .account_store
        .get_account_by_token(&token)
        .await?
        .ok_or_else(|| {
            CoterieError::NotFound("no account holds this activation token".to_string())
        })?;

    // Consumed tokens are rejected before the form is even looked at.
    if account.token_used {
        return Err(CoterieError::TokenAlreadyUsed.into());
    }

    let errors = forms::validate_activation(
        &body.first_name,
        &body.last_name,
        &body.password,
        &body.confirm_password,
    );
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let password_hash = coterie_crypto::hash_password(&body.password)?;
    let input = ActivationInput {
        first_name: body.first_name.trim().to_string(),
        last_name: body.last_name.trim().to_string(),
        password_hash,
    };

    // Conditional update: a concurrent activation of the same token loses
    // the race here and gets the same terminal answer as a reused link.
    let activated = state
        .account_store
        .activate_account(&account.id, &input)
        .await?;
    if !activated {
        return Err(CoterieError::TokenAlreadyUsed.into());
    }

    // Log the now-active account straight in.
    let (access_jwt, refresh_jwt) = issue_session(&state, &account.id).await?;

    Ok(Json(json!({
        "accountId": account.id,
        "email": account.email,
        "accessJwt": access_jwt,
        "refreshJwt": refresh_jwt,
    })))
}
