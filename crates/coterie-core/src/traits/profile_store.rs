use async_trait::async_trait;

use crate::error::CoterieResult;
use crate::types::{LinkAssignment, SkillAssignment};

/// Capability set for the full-replace persistence pattern shared by
/// skills and links: wipe the owner's old rows, insert the new set.
///
/// The default `replace_all_for_owner` runs the two steps as separate
/// operations; implementations are expected to override it to commit both
/// in one transaction so a crash cannot leave the owner with no rows.
#[async_trait]
pub trait PairedRecordStore<R: Send + Sync>: Send + Sync {
    async fn delete_all_for_owner(&self, account_id: &str) -> CoterieResult<()>;
    async fn bulk_insert(&self, records: &[R]) -> CoterieResult<()>;

    async fn replace_all_for_owner(
        &self,
        account_id: &str,
        records: &[R],
    ) -> CoterieResult<()> {
        self.delete_all_for_owner(account_id).await?;
        self.bulk_insert(records).await
    }
}

#[async_trait]
pub trait ProfileStore:
    PairedRecordStore<SkillAssignment> + PairedRecordStore<LinkAssignment> + 'static
{
    async fn list_skills(&self, account_id: &str) -> CoterieResult<Vec<SkillAssignment>>;
    async fn list_links(&self, account_id: &str) -> CoterieResult<Vec<LinkAssignment>>;

    /// Persist a brand annotation on one link row.
    async fn set_link_brand(&self, link_id: &str, brand_domain: &str) -> CoterieResult<()>;
}
