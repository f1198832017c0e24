use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use coterie_core::{AbuseReport, CoterieResult, ModerationLogEntry, ModerationStore};

use crate::account::{parse_datetime, parse_datetime_opt, storage_err};

#[derive(Clone)]
pub struct SqliteModerationStore {
    pool: SqlitePool,
}

impl SqliteModerationStore {
    pub async fn connect(url: &str) -> CoterieResult<Self> {
        let pool = SqlitePool::connect(url).await.map_err(storage_err)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_report(row: &sqlx::sqlite::SqliteRow) -> CoterieResult<AbuseReport> {
    let logged_at: String = row.try_get("logged_at").map_err(storage_err)?;
    let resolved_at: Option<String> = row.try_get("resolved_at").map_err(storage_err)?;
    Ok(AbuseReport {
        id: row.try_get("id").map_err(storage_err)?,
        reporter_id: row.try_get("reporter_id").map_err(storage_err)?,
        subject_id: row.try_get("subject_id").map_err(storage_err)?,
        comments: row.try_get("comments").map_err(storage_err)?,
        logged_at: parse_datetime(&logged_at)?,
        resolution: row.try_get("resolution").map_err(storage_err)?,
        resolved_by: row.try_get("resolved_by").map_err(storage_err)?,
        resolved_at: parse_datetime_opt(resolved_at.as_deref())?,
    })
}

const REPORT_SELECT: &str = "SELECT id, reporter_id, subject_id, comments, logged_at, \
     resolution, resolved_by, resolved_at FROM abuse_report";

#[async_trait]
impl ModerationStore for SqliteModerationStore {
    async fn create_abuse_report(&self, report: &AbuseReport) -> CoterieResult<()> {
        sqlx::query(
            "INSERT INTO abuse_report (id, reporter_id, subject_id, comments) VALUES (?, ?, ?, ?)",
        )
        .bind(&report.id)
        .bind(&report.reporter_id)
        .bind(&report.subject_id)
        .bind(&report.comments)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn get_abuse_report(&self, id: &str) -> CoterieResult<Option<AbuseReport>> {
        let sql = format!("{REPORT_SELECT} WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        match row {
            Some(ref r) => Ok(Some(row_to_report(r)?)),
            None => Ok(None),
        }
    }

    async fn list_open_abuse_reports(&self) -> CoterieResult<Vec<AbuseReport>> {
        let sql = format!("{REPORT_SELECT} WHERE resolution IS NULL ORDER BY logged_at ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        rows.iter().map(row_to_report).collect()
    }

    async fn resolve_abuse_report(
        &self,
        id: &str,
        resolution: &str,
        resolved_by: &str,
    ) -> CoterieResult<()> {
        sqlx::query(
            "UPDATE abuse_report SET resolution = ?, resolved_by = ?, \
             resolved_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?",
        )
        .bind(resolution)
        .bind(resolved_by)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn log_action(&self, entry: &ModerationLogEntry) -> CoterieResult<()> {
        sqlx::query(
            "INSERT INTO moderation_log (id, moderator_id, target_id, action, comment) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.moderator_id)
        .bind(&entry.target_id)
        .bind(&entry.action)
        .bind(&entry.comment)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn list_log(&self, limit: usize) -> CoterieResult<Vec<ModerationLogEntry>> {
        let rows = sqlx::query(
            "SELECT id, moderator_id, target_id, action, comment, logged_at \
             FROM moderation_log ORDER BY logged_at DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.iter()
            .map(|r| {
                let logged_at: String = r.try_get("logged_at").map_err(storage_err)?;
                Ok(ModerationLogEntry {
                    id: r.try_get("id").map_err(storage_err)?,
                    moderator_id: r.try_get("moderator_id").map_err(storage_err)?,
                    target_id: r.try_get("target_id").map_err(storage_err)?,
                    action: r.try_get("action").map_err(storage_err)?,
                    comment: r.try_get("comment").map_err(storage_err)?,
                    logged_at: parse_datetime(&logged_at)?,
                })
            })
            .collect()
    }
}
