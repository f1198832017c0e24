use async_trait::async_trait;

use crate::error::CoterieResult;
use crate::types::LinkBrand;

/// Read-mostly catalog of recognised link brands, keyed by exact domain.
#[async_trait]
pub trait BrandStore: Send + Sync + 'static {
    async fn get_brand_by_domain(&self, domain: &str) -> CoterieResult<Option<LinkBrand>>;
    async fn create_brand(&self, brand: &LinkBrand) -> CoterieResult<()>;
    async fn list_brands(&self) -> CoterieResult<Vec<LinkBrand>>;
}
