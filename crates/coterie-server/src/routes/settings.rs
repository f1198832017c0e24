use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::forms;
use crate::state::AppState;
use coterie_core::CoterieError;
use coterie_core::traits::*;

// ---------------------------------------------------------------------------
// 1. getSettings
// ---------------------------------------------------------------------------

pub async fn get_settings<A, P, B>(
    State(state): State<AppState<A, P, B>>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    let account = state.current_account(&user).await?;

    Ok(Json(json!({
        "email": account.email,
        "firstName": account.first_name,
        "lastName": account.last_name,
    })))
}

// ---------------------------------------------------------------------------
// 2. updateSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub email: String,
    /// Absent means keep the current password.
    #[serde(default)]
    pub new_password: Option<String>,
    #[serde(default)]
    pub confirm_password: Option<String>,
}

pub async fn update_settings<A, P, B>(
    State(state): State<AppState<A, P, B>>,
    user: AuthenticatedUser,
    Json(body): Json<UpdateSettingsRequest>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    let account = state.current_account(&user).await?;

    let errors = forms::validate_account_settings(
        &body.email,
        body.new_password.as_deref(),
        body.confirm_password.as_deref(),
    );
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    state
        .account_store
        .update_email(&account.id, body.email.trim())
        .await?;

    if let Some(ref new_password) = body.new_password {
        let password_hash = coterie_crypto::hash_password(new_password)?;
        state
            .account_store
            .update_password(&account.id, &password_hash)
            .await?;
        // Credential changed: revoke every outstanding refresh session.
        state
            .account_store
            .delete_sessions_for_account(&account.id)
            .await?;
    }

    Ok(Json(json!({})))
}

// ---------------------------------------------------------------------------
// 3. closeAccount
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CloseAccountRequest {
    /// Current password, re-entered to confirm the closure.
    pub password: String,
}

pub async fn close_account<A, P, B>(
    State(state): State<AppState<A, P, B>>,
    user: AuthenticatedUser,
    Json(body): Json<CloseAccountRequest>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    let account = state.current_account(&user).await?;

    let valid = coterie_crypto::verify_password(&body.password, &account.password_hash)?;
    if !valid {
        return Err(CoterieError::InvalidPassword.into());
    }

    // Soft delete, then end every session. The row stays for the record.
    state.account_store.close_account(&account.id).await?;
    state
        .account_store
        .delete_sessions_for_account(&account.id)
        .await?;

    Ok(Json(json!({})))
}
