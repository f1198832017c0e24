use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::{AuthenticatedUser, JwtRefreshSecret};
use crate::error::ApiError;
use crate::state::AppState;
use coterie_core::CoterieError;
use coterie_core::traits::*;
use coterie_core::types::SessionRecord;

/// Mint an access + refresh token pair and persist the refresh record.
pub(crate) async fn issue_session<A, P, B>(
    state: &AppState<A, P, B>,
    account_id: &str,
) -> Result<(String, String), ApiError>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    let access_jwt =
        coterie_crypto::create_access_token(account_id, &state.config.jwt.access_secret)?;
    let refresh_jti = uuid::Uuid::new_v4().to_string();
    let refresh_jwt = coterie_crypto::create_refresh_token(
        account_id,
        &refresh_jti,
        &state.config.jwt.refresh_secret,
    )?;

    let record = SessionRecord {
        id: refresh_jti,
        account_id: account_id.to_string(),
        expires_at: chrono::Utc::now() + chrono::Duration::days(90),
    };
    state.account_store.create_session(&record).await?;

    Ok((access_jwt, refresh_jwt))
}

// ---------------------------------------------------------------------------
// 1. createSession (login)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub email: String,
    pub password: String,
}

pub async fn create_session<A, P, B>(
    State(state): State<AppState<A, P, B>>,
    Json(body): Json<CreateSessionRequest>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    let account = state
        .account_store
        .get_account_by_email(&body.email)
        .await?
        .ok_or(CoterieError::AccountNotFound)?;

    if account.is_closed {
        return Err(CoterieError::AccountClosed.into());
    }
    if !account.is_active {
        return Err(CoterieError::AccountInactive.into());
    }

    let valid = coterie_crypto::verify_password(&body.password, &account.password_hash)?;
    if !valid {
        return Err(CoterieError::InvalidPassword.into());
    }

    let (access_jwt, refresh_jwt) = issue_session(&state, &account.id).await?;

    Ok(Json(json!({
        "accountId": account.id,
        "email": account.email,
        "firstName": account.first_name,
        "lastName": account.last_name,
        "isModerator": account.is_moderator,
        "accessJwt": access_jwt,
        "refreshJwt": refresh_jwt,
    })))
}

// ---------------------------------------------------------------------------
// 2. getSession
// ---------------------------------------------------------------------------

pub async fn get_session<A, P, B>(
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
        "accountId": account.id,
        "email": account.email,
        "firstName": account.first_name,
        "lastName": account.last_name,
        "isModerator": account.is_moderator,
    })))
}

// ---------------------------------------------------------------------------
// 3. refreshSession
// ---------------------------------------------------------------------------

pub async fn refresh_session<A, P, B>(
    State(state): State<AppState<A, P, B>>,
    headers: HeaderMap,
    axum::Extension(refresh_secret): axum::Extension<JwtRefreshSecret>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    // Read Authorization header manually (refresh token, not access token).
    let auth_header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::UNAUTHORIZED,
                "AuthenticationRequired",
                "Missing authorization header",
            )
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::new(
            StatusCode::UNAUTHORIZED,
            "AuthenticationRequired",
            "Invalid authorization format",
        )
    })?;

    let claims = coterie_crypto::validate_refresh_token(token, &refresh_secret.0).map_err(|e| {
        let err_msg = e.to_string();
        if err_msg.contains("ExpiredSignature") {
            ApiError::new(
                StatusCode::UNAUTHORIZED,
                "ExpiredToken",
                "Refresh token has expired",
            )
        } else {
            ApiError::new(
                StatusCode::UNAUTHORIZED,
                "InvalidToken",
                "Invalid refresh token",
            )
        }
    })?;

    // The jti must still be live; logout and closure revoke it.
    state
        .account_store
        .get_session(&claims.jti)
        .await?
        .ok_or_else(|| CoterieError::Auth("session not found".to_string()))?;

    let account = state
        .account_store
        .get_account_by_id(&claims.sub)
        .await?
        .ok_or(CoterieError::AccountNotFound)?;
    if account.is_closed {
        return Err(CoterieError::AccountClosed.into());
    }

    // Rotate: the old refresh record dies with this request.
    state.account_store.delete_session(&claims.jti).await?;
    let (access_jwt, refresh_jwt) = issue_session(&state, &account.id).await?;

    Ok(Json(json!({
        "accountId": account.id,
        "accessJwt": access_jwt,
        "refreshJwt": refresh_jwt,
    })))
}

// ---------------------------------------------------------------------------
// 4. deleteSession (logout)
// ---------------------------------------------------------------------------

pub async fn delete_session<A, P, B>(
    State(state): State<AppState<A, P, B>>,
    user: AuthenticatedUser,
) -> Result<StatusCode, ApiError>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    state
        .account_store
        .delete_sessions_for_account(&user.account_id)
        .await?;

    Ok(StatusCode::OK)
}
