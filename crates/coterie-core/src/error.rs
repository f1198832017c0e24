use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoterieError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("auth error: {0}")]
    Auth(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("account not found")]
    AccountNotFound,

    #[error("an account with this email address already exists")]
    DuplicateEmail,

    #[error("activation token has already been used")]
    TokenAlreadyUsed,

    #[error("invalid password")]
    InvalidPassword,

    #[error("account is closed")]
    AccountClosed,

    #[error("account is not active")]
    AccountInactive,

    #[error("session expired")]
    SessionExpired,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

pub type CoterieResult<T> = Result<T, CoterieError>;
