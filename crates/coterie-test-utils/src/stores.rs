use tempfile::TempDir;

use coterie_storage_sqlite::{
    SqliteAccountStore, SqliteBrandStore, SqliteModerationStore, SqliteProfileStore,
};

pub struct TestStores {
    pub account_store: SqliteAccountStore,
    pub profile_store: SqliteProfileStore,
    pub brand_store: SqliteBrandStore,
    pub moderation_store: SqliteModerationStore,
    /// Hold the TempDir to keep it alive for the test's duration.
    pub _tempdir: TempDir,
}

/// Create a fresh set of test stores backed by a tempdir.
///
/// All stores share the same file-backed SQLite database; the account
/// store connection runs the migrations.
pub async fn create_test_stores() -> TestStores {
    let tempdir = TempDir::new().expect("failed to create tempdir");
    let db_path = tempdir.path().join("test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let account_store = SqliteAccountStore::connect(&db_url)
        .await
        .expect("failed to connect account store");
    let profile_store = SqliteProfileStore::from_pool(account_store.pool().clone());
    let brand_store = SqliteBrandStore::from_pool(account_store.pool().clone());
    let moderation_store = SqliteModerationStore::from_pool(account_store.pool().clone());

    TestStores {
        account_store,
        profile_store,
        brand_store,
        moderation_store,
        _tempdir: tempdir,
    }
}
