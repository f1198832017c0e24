use std::sync::Arc;

use coterie_core::config::CoterieConfig;
use coterie_core::traits::*;
use coterie_core::types::Account;
use coterie_core::CoterieError;

use crate::auth::AuthenticatedUser;
use crate::email::Notifier;
use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState<A, P, B>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    pub account_store: Arc<A>,
    pub profile_store: Arc<P>,
    pub brand_store: Arc<B>,
    pub moderation_store: Arc<dyn ModerationStore>,
    pub config: Arc<CoterieConfig>,
    /// Notification dispatcher (None when SMTP is not configured).
    pub notifier: Option<Arc<dyn Notifier>>,
}

impl<A, P, B> AppState<A, P, B>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    /// Resolve the session's account, rejecting closed or inactive rows.
    pub async fn current_account(&self, user: &AuthenticatedUser) -> Result<Account, ApiError> {
        let account = self
            .account_store
            .get_account_by_id(&user.account_id)
            .await?
            .ok_or(CoterieError::AccountNotFound)?;
        if account.is_closed {
            return Err(CoterieError::AccountClosed.into());
        }
        if !account.is_active {
            return Err(CoterieError::AccountInactive.into());
        }
        Ok(account)
    }

    /// As `current_account`, but additionally requires the moderator flag.
    pub async fn current_moderator(&self, user: &AuthenticatedUser) -> Result<Account, ApiError> {
        let account = self.current_account(user).await?;
        if !account.is_moderator {
            return Err(
                CoterieError::Forbidden("moderator access required".to_string()).into(),
            );
        }
        Ok(account)
    }
}
