use async_trait::async_trait;

use crate::error::CoterieResult;
use crate::types::{AbuseReport, ModerationLogEntry};

#[async_trait]
pub trait ModerationStore: Send + Sync + 'static {
    async fn create_abuse_report(&self, report: &AbuseReport) -> CoterieResult<()>;
    async fn get_abuse_report(&self, id: &str) -> CoterieResult<Option<AbuseReport>>;
    /// Reports with no resolution yet, oldest first.
    async fn list_open_abuse_reports(&self) -> CoterieResult<Vec<AbuseReport>>;
    async fn resolve_abuse_report(
        &self,
        id: &str,
        resolution: &str,
        resolved_by: &str,
    ) -> CoterieResult<()>;

    async fn log_action(&self, entry: &ModerationLogEntry) -> CoterieResult<()>;
    async fn list_log(&self, limit: usize) -> CoterieResult<Vec<ModerationLogEntry>>;
}
