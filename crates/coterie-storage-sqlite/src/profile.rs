use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use coterie_core::{
    CoterieResult, LinkAssignment, PairedRecordStore, ProfileStore, SkillAssignment,
};

use crate::account::storage_err;

#[derive(Clone)]
pub struct SqliteProfileStore {
    pool: SqlitePool,
}

impl SqliteProfileStore {
    /// Attach to an already-migrated database (see SqliteAccountStore::connect).
    pub async fn connect(url: &str) -> CoterieResult<Self> {
        let pool = SqlitePool::connect(url).await.map_err(storage_err)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PairedRecordStore<SkillAssignment> for SqliteProfileStore {
    async fn delete_all_for_owner(&self, account_id: &str) -> CoterieResult<()> {
        sqlx::query("DELETE FROM skill_assignment WHERE account_id = ?")
            .bind(account_id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn bulk_insert(&self, records: &[SkillAssignment]) -> CoterieResult<()> {
        for record in records {
            sqlx::query(
                "INSERT INTO skill_assignment (account_id, skill, proficiency) VALUES (?, ?, ?)",
            )
            .bind(&record.account_id)
            .bind(&record.skill)
            .bind(&record.proficiency)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        }
        Ok(())
    }

    async fn replace_all_for_owner(
        &self,
        account_id: &str,
        records: &[SkillAssignment],
    ) -> CoterieResult<()> {
        // Delete and insert commit together so a crash cannot leave the
        // account with no skills at all.
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        sqlx::query("DELETE FROM skill_assignment WHERE account_id = ?")
            .bind(account_id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        for record in records {
            sqlx::query(
                "INSERT INTO skill_assignment (account_id, skill, proficiency) VALUES (?, ?, ?)",
            )
            .bind(&record.account_id)
            .bind(&record.skill)
            .bind(&record.proficiency)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;
        }

        tx.commit().await.map_err(storage_err)?;
        Ok(())
    }
}

#[async_trait]
impl PairedRecordStore<LinkAssignment> for SqliteProfileStore {
    async fn delete_all_for_owner(&self, account_id: &str) -> CoterieResult<()> {
        sqlx::query("DELETE FROM link_assignment WHERE account_id = ?")
            .bind(account_id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn bulk_insert(&self, records: &[LinkAssignment]) -> CoterieResult<()> {
        for record in records {
            sqlx::query(
                "INSERT INTO link_assignment (id, account_id, anchor, url, brand_domain) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&record.id)
            .bind(&record.account_id)
            .bind(&record.anchor)
            .bind(&record.url)
            .bind(&record.brand_domain)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        }
        Ok(())
    }

    async fn replace_all_for_owner(
        &self,
        account_id: &str,
        records: &[LinkAssignment],
    ) -> CoterieResult<()> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        sqlx::query("DELETE FROM link_assignment WHERE account_id = ?")
            .bind(account_id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        for record in records {
            sqlx::query(
                "INSERT INTO link_assignment (id, account_id, anchor, url, brand_domain) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&record.id)
            .bind(&record.account_id)
            .bind(&record.anchor)
            .bind(&record.url)
            .bind(&record.brand_domain)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;
        }

        tx.commit().await.map_err(storage_err)?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn list_skills(&self, account_id: &str) -> CoterieResult<Vec<SkillAssignment>> {
        let rows = sqlx::query(
            "SELECT account_id, skill, proficiency FROM skill_assignment \
             WHERE account_id = ? ORDER BY skill ASC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.iter()
            .map(|r| {
                Ok(SkillAssignment {
                    account_id: r.try_get("account_id").map_err(storage_err)?,
                    skill: r.try_get("skill").map_err(storage_err)?,
                    proficiency: r.try_get("proficiency").map_err(storage_err)?,
                })
            })
            .collect()
    }

    async fn list_links(&self, account_id: &str) -> CoterieResult<Vec<LinkAssignment>> {
        let rows = sqlx::query(
            "SELECT id, account_id, anchor, url, brand_domain FROM link_assignment \
             WHERE account_id = ? ORDER BY anchor ASC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.iter()
            .map(|r| {
                Ok(LinkAssignment {
                    id: r.try_get("id").map_err(storage_err)?,
                    account_id: r.try_get("account_id").map_err(storage_err)?,
                    anchor: r.try_get("anchor").map_err(storage_err)?,
                    url: r.try_get("url").map_err(storage_err)?,
                    brand_domain: r.try_get("brand_domain").map_err(storage_err)?,
                })
            })
            .collect()
    }

    async fn set_link_brand(&self, link_id: &str, brand_domain: &str) -> CoterieResult<()> {
        sqlx::query("UPDATE link_assignment SET brand_domain = ? WHERE id = ?")
            .bind(brand_domain)
            .bind(link_id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }
}
