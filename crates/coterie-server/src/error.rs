use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use coterie_core::CoterieError;
use serde_json::json;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error_name: String,
    pub message: String,
    /// Per-field messages for validation failures.
    pub fields: Option<BTreeMap<String, String>>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        error_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            error_name: error_name.into(),
            message: message.into(),
            fields: None,
        }
    }

    pub fn validation(fields: BTreeMap<String, String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error_name: "ValidationError".to_string(),
            message: "one or more submitted fields were invalid".to_string(),
            fields: Some(fields),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.error_name,
            "message": self.message,
        });
        if let Some(fields) = self.fields {
            body["fields"] = json!(fields);
        }
        (self.status, axum::Json(body)).into_response()
    }
}

impl From<CoterieError> for ApiError {
    fn from(err: CoterieError) -> Self {
        match &err {
            CoterieError::Storage(_) | CoterieError::Crypto(_) | CoterieError::InternalError(_) => {
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalServerError",
                    err.to_string(),
                )
            }
            CoterieError::Auth(_) => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "AuthenticationRequired",
                err.to_string(),
            ),
            CoterieError::NotFound(_) => {
                ApiError::new(StatusCode::NOT_FOUND, "NotFound", err.to_string())
            }
            CoterieError::AccountNotFound => ApiError::new(
                StatusCode::BAD_REQUEST,
                "AccountNotFound",
                err.to_string(),
            ),
            CoterieError::DuplicateEmail => ApiError::new(
                StatusCode::BAD_REQUEST,
                "DuplicateEmail",
                err.to_string(),
            ),
            CoterieError::TokenAlreadyUsed => ApiError::new(
                StatusCode::GONE,
                "TokenAlreadyUsed",
                err.to_string(),
            ),
            CoterieError::InvalidPassword => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "InvalidPassword",
                err.to_string(),
            ),
            CoterieError::AccountClosed => ApiError::new(
                StatusCode::BAD_REQUEST,
                "AccountClosed",
                err.to_string(),
            ),
            CoterieError::AccountInactive => ApiError::new(
                StatusCode::BAD_REQUEST,
                "AccountInactive",
                err.to_string(),
            ),
            CoterieError::SessionExpired => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "ExpiredToken",
                err.to_string(),
            ),
            CoterieError::Forbidden(_) => ApiError::new(
                StatusCode::FORBIDDEN,
                "PermissionDenied",
                err.to_string(),
            ),
        }
    }
}
