use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeZone, Utc};
use sqlx::{Row, SqlitePool};

use coterie_core::{
    Account, AccountStore, ActivationInput, CoterieError, CoterieResult, CreateAccountInput,
    ProfileUpdate, RegistrationMethod, SessionRecord,
};

#[derive(Clone)]
pub struct SqliteAccountStore {
    pool: SqlitePool,
}

/// Parse a SQLite datetime text string into a chrono DateTime<Utc>.
///
/// SQLite stores datetimes as TEXT in the format produced by
/// `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')`, which yields strings like
/// `2025-01-01T00:00:00.000Z`.
pub(crate) fn parse_datetime(s: &str) -> Result<chrono::DateTime<Utc>, CoterieError> {
    // Try RFC 3339 first (handles the trailing Z)
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    // Fallback: parse as NaiveDateTime with milliseconds
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    // Fallback: parse without fractional seconds
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    Err(CoterieError::Storage(format!(
        "failed to parse datetime: {s}"
    )))
}

/// Parse an optional SQLite datetime text string.
pub(crate) fn parse_datetime_opt(
    s: Option<&str>,
) -> Result<Option<chrono::DateTime<Utc>>, CoterieError> {
    match s {
        Some(s) => Ok(Some(parse_datetime(s)?)),
        None => Ok(None),
    }
}

pub(crate) fn storage_err(e: impl std::fmt::Display) -> CoterieError {
    CoterieError::Storage(e.to_string())
}

/// Map an insert error, surfacing unique-constraint hits on the email
/// column as DuplicateEmail.
fn create_err(e: sqlx::Error) -> CoterieError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => CoterieError::DuplicateEmail,
        _ => storage_err(e),
    }
}

/// Map a sqlx Row from the account table to an Account.
fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Result<Account, CoterieError> {
    let id: String = row.try_get("id").map_err(storage_err)?;
    let email: String = row.try_get("email").map_err(storage_err)?;
    let first_name: String = row.try_get("first_name").map_err(storage_err)?;
    let last_name: String = row.try_get("last_name").map_err(storage_err)?;
    let password_hash: String = row.try_get("password_hash").map_err(storage_err)?;
    let activation_token: String = row.try_get("activation_token").map_err(storage_err)?;
    let token_used: i64 = row.try_get("token_used").map_err(storage_err)?;
    let is_active: i64 = row.try_get("is_active").map_err(storage_err)?;
    let is_closed: i64 = row.try_get("is_closed").map_err(storage_err)?;
    let is_moderator: i64 = row.try_get("is_moderator").map_err(storage_err)?;
    let registration_method: String = row.try_get("registration_method").map_err(storage_err)?;
    let application_comments: String = row.try_get("application_comments").map_err(storage_err)?;
    let bio: String = row.try_get("bio").map_err(storage_err)?;
    let roles_json: String = row.try_get("roles").map_err(storage_err)?;
    let applied_at: Option<String> = row.try_get("applied_at").map_err(storage_err)?;
    let activated_at: Option<String> = row.try_get("activated_at").map_err(storage_err)?;
    let created_at: String = row.try_get("created_at").map_err(storage_err)?;

    let registration_method = RegistrationMethod::parse(&registration_method).ok_or_else(|| {
        CoterieError::Storage(format!(
            "unknown registration method: {registration_method}"
        ))
    })?;
    let roles: Vec<String> = serde_json::from_str(&roles_json)
        .map_err(|e| CoterieError::Storage(format!("failed to parse roles: {e}")))?;

    Ok(Account {
        id,
        email,
        first_name,
        last_name,
        password_hash,
        activation_token,
        token_used: token_used != 0,
        is_active: is_active != 0,
        is_closed: is_closed != 0,
        is_moderator: is_moderator != 0,
        registration_method,
        application_comments,
        bio,
        roles,
        applied_at: parse_datetime_opt(applied_at.as_deref())?,
        activated_at: parse_datetime_opt(activated_at.as_deref())?,
        created_at: parse_datetime(&created_at)?,
    })
}

const ACCOUNT_SELECT: &str = r#"
    SELECT
        id,
        email,
        first_name,
        last_name,
        password_hash,
        activation_token,
        token_used,
        is_active,
        is_closed,
        is_moderator,
        registration_method,
        application_comments,
        bio,
        roles,
        applied_at,
        activated_at,
        created_at
    FROM account
"#;

impl SqliteAccountStore {
    pub async fn connect(url: &str) -> CoterieResult<Self> {
        let pool = SqlitePool::connect(url).await.map_err(storage_err)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(storage_err)?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Helper: fetch an Account with a WHERE clause appended to the base SELECT.
    async fn get_account_where(
        &self,
        where_clause: &str,
        bind_value: &str,
    ) -> CoterieResult<Option<Account>> {
        let sql = format!("{ACCOUNT_SELECT} WHERE {where_clause}");
        let row = sqlx::query(&sql)
            .bind(bind_value)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        match row {
            Some(ref r) => Ok(Some(row_to_account(r)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn create_account(&self, input: &CreateAccountInput) -> CoterieResult<Account> {
        sqlx::query(
            "INSERT INTO account (id, email, first_name, last_name, activation_token, \
             registration_method, application_comments, applied_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.id)
        .bind(&input.email)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.activation_token)
        .bind(input.registration_method.as_str())
        .bind(&input.application_comments)
        .bind(
            input
                .applied_at
                .map(|t| t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
        )
        .execute(&self.pool)
        .await
        .map_err(create_err)?;

        // Query back the full Account
        self.get_account_by_id(&input.id).await?.ok_or_else(|| {
            CoterieError::Storage("failed to retrieve account after creation".to_string())
        })
    }

    async fn get_account_by_id(&self, id: &str) -> CoterieResult<Option<Account>> {
        self.get_account_where("id = ?", id).await
    }

    async fn get_account_by_email(&self, email: &str) -> CoterieResult<Option<Account>> {
        self.get_account_where("email = ?", email).await
    }

    async fn get_account_by_token(&self, token: &str) -> CoterieResult<Option<Account>> {
        self.get_account_where("activation_token = ?", token).await
    }

    async fn activate_account(&self, id: &str, input: &ActivationInput) -> CoterieResult<bool> {
        // Name, credential, flags and timestamp commit together, and only
        // if the token is still unconsumed. A concurrent activation loses
        // the race here and observes rows_affected == 0.
        let result = sqlx::query(
            "UPDATE account SET \
                 first_name = ?, \
                 last_name = ?, \
                 password_hash = ?, \
                 is_active = 1, \
                 activated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'), \
                 token_used = 1 \
             WHERE id = ? AND token_used = 0",
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.password_hash)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> CoterieResult<()> {
        let roles_json = serde_json::to_string(&update.roles)
            .map_err(|e| CoterieError::Storage(format!("failed to encode roles: {e}")))?;
        sqlx::query(
            "UPDATE account SET first_name = ?, last_name = ?, bio = ?, roles = ? WHERE id = ?",
        )
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.bio)
        .bind(&roles_json)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn update_email(&self, id: &str, email: &str) -> CoterieResult<()> {
        sqlx::query("UPDATE account SET email = ? WHERE id = ?")
            .bind(email)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(create_err)?;
        Ok(())
    }

    async fn update_password(&self, id: &str, password_hash: &str) -> CoterieResult<()> {
        sqlx::query("UPDATE account SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn close_account(&self, id: &str) -> CoterieResult<()> {
        sqlx::query("UPDATE account SET is_active = 0, is_closed = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn set_moderator(&self, id: &str, is_moderator: bool) -> CoterieResult<()> {
        sqlx::query("UPDATE account SET is_moderator = ? WHERE id = ?")
            .bind(is_moderator)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn list_moderators(&self) -> CoterieResult<Vec<Account>> {
        let sql = format!("{ACCOUNT_SELECT} WHERE is_moderator = 1 AND is_active = 1");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        rows.iter().map(row_to_account).collect()
    }

    async fn list_pending_applications(&self) -> CoterieResult<Vec<Account>> {
        let sql = format!(
            "{ACCOUNT_SELECT} WHERE registration_method = 'requested' \
             AND is_active = 0 AND is_closed = 0 AND token_used = 0 \
             ORDER BY applied_at ASC"
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        rows.iter().map(row_to_account).collect()
    }

    async fn create_session(&self, session: &SessionRecord) -> CoterieResult<()> {
        sqlx::query("INSERT INTO session_token (id, account_id, expires_at) VALUES (?, ?, ?)")
            .bind(&session.id)
            .bind(&session.account_id)
            .bind(
                session
                    .expires_at
                    .format("%Y-%m-%dT%H:%M:%S%.3fZ")
                    .to_string(),
            )
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn get_session(&self, id: &str) -> CoterieResult<Option<SessionRecord>> {
        let row = sqlx::query("SELECT id, account_id, expires_at FROM session_token WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        match row {
            Some(ref r) => {
                let id: String = r.try_get("id").map_err(storage_err)?;
                let account_id: String = r.try_get("account_id").map_err(storage_err)?;
                let expires_at: String = r.try_get("expires_at").map_err(storage_err)?;

                Ok(Some(SessionRecord {
                    id,
                    account_id,
                    expires_at: parse_datetime(&expires_at)?,
                }))
            }
            None => Ok(None),
        }
    }

    async fn delete_session(&self, id: &str) -> CoterieResult<()> {
        sqlx::query("DELETE FROM session_token WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn delete_sessions_for_account(&self, account_id: &str) -> CoterieResult<u64> {
        let result = sqlx::query("DELETE FROM session_token WHERE account_id = ?")
            .bind(account_id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(result.rows_affected())
    }
}
