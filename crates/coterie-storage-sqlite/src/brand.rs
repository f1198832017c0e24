use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use coterie_core::{BrandStore, CoterieResult, LinkBrand};

use crate::account::storage_err;

#[derive(Clone)]
pub struct SqliteBrandStore {
    pool: SqlitePool,
}

impl SqliteBrandStore {
    pub async fn connect(url: &str) -> CoterieResult<Self> {
        let pool = SqlitePool::connect(url).await.map_err(storage_err)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_brand(row: &sqlx::sqlite::SqliteRow) -> CoterieResult<LinkBrand> {
    Ok(LinkBrand {
        domain: row.try_get("domain").map_err(storage_err)?,
        name: row.try_get("name").map_err(storage_err)?,
        icon: row.try_get("icon").map_err(storage_err)?,
    })
}

#[async_trait]
impl BrandStore for SqliteBrandStore {
    async fn get_brand_by_domain(&self, domain: &str) -> CoterieResult<Option<LinkBrand>> {
        // Exact, case-sensitive match on the stored domain.
        let row = sqlx::query("SELECT domain, name, icon FROM link_brand WHERE domain = ?")
            .bind(domain)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        match row {
            Some(ref r) => Ok(Some(row_to_brand(r)?)),
            None => Ok(None),
        }
    }

    async fn create_brand(&self, brand: &LinkBrand) -> CoterieResult<()> {
        sqlx::query("INSERT INTO link_brand (domain, name, icon) VALUES (?, ?, ?)")
            .bind(&brand.domain)
            .bind(&brand.name)
            .bind(&brand.icon)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn list_brands(&self) -> CoterieResult<Vec<LinkBrand>> {
        let rows = sqlx::query("SELECT domain, name, icon FROM link_brand ORDER BY domain ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        rows.iter().map(row_to_brand).collect()
    }
}
