use axum::Extension;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;

use crate::error::ApiError;

/// A newtype wrapper around the JWT access secret, added as an Axum Extension.
#[derive(Clone)]
pub struct JwtSecret(pub String);

/// A newtype wrapper around the JWT refresh secret, added as an Axum Extension.
#[derive(Clone)]
pub struct JwtRefreshSecret(pub String);

/// Represents an authenticated user extracted from a valid JWT bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub account_id: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(jwt_secret) = Extension::<JwtSecret>::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalError",
                    "JWT secret not configured",
                )
            })?;

        let auth_header = parts
            .headers
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

        let claims = coterie_crypto::validate_access_token(token, &jwt_secret.0).map_err(|e| {
            let err_msg = e.to_string();
            if err_msg.contains("ExpiredSignature") {
                ApiError::new(StatusCode::UNAUTHORIZED, "ExpiredToken", "Token has expired")
            } else {
                ApiError::new(StatusCode::UNAUTHORIZED, "InvalidToken", "Invalid token")
            }
        })?;

        Ok(AuthenticatedUser {
            account_id: claims.sub,
        })
    }
}
