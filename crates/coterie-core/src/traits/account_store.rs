use async_trait::async_trait;

use crate::error::CoterieResult;
use crate::types::{Account, ActivationInput, CreateAccountInput, ProfileUpdate, SessionRecord};

#[async_trait]
pub trait AccountStore: Send + Sync + 'static {
    /// Insert a new inactive account. Fails with `DuplicateEmail` when the
    /// email already has a row.
    async fn create_account(&self, input: &CreateAccountInput) -> CoterieResult<Account>;
    async fn get_account_by_id(&self, id: &str) -> CoterieResult<Option<Account>>;
    async fn get_account_by_email(&self, email: &str) -> CoterieResult<Option<Account>>;
    async fn get_account_by_token(&self, token: &str) -> CoterieResult<Option<Account>>;

    /// Promote an inactive account to active, consuming its token. The name
    /// fields, password hash, active flag, activation timestamp and the
    /// token-used flag commit as one conditional update; returns `false`
    /// when the token was already consumed (no row mutated).
    async fn activate_account(&self, id: &str, input: &ActivationInput) -> CoterieResult<bool>;

    async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> CoterieResult<()>;
    async fn update_email(&self, id: &str, email: &str) -> CoterieResult<()>;
    async fn update_password(&self, id: &str, password_hash: &str) -> CoterieResult<()>;

    /// Soft delete: active=false, closed=true. The row is retained.
    async fn close_account(&self, id: &str) -> CoterieResult<()>;

    /// Grant or revoke the moderator flag (operator tooling, not routed).
    async fn set_moderator(&self, id: &str, is_moderator: bool) -> CoterieResult<()>;

    /// Active accounts carrying the moderator flag.
    async fn list_moderators(&self) -> CoterieResult<Vec<Account>>;

    /// Inactive `requested` accounts whose token is still unused and which
    /// have not been closed, oldest application first.
    async fn list_pending_applications(&self) -> CoterieResult<Vec<Account>>;

    // Session records (refresh tokens)
    async fn create_session(&self, session: &SessionRecord) -> CoterieResult<()>;
    async fn get_session(&self, id: &str) -> CoterieResult<Option<SessionRecord>>;
    async fn delete_session(&self, id: &str) -> CoterieResult<()>;
    async fn delete_sessions_for_account(&self, account_id: &str) -> CoterieResult<u64>;
}
