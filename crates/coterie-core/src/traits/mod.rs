pub mod account_store;
pub mod brand_store;
pub mod moderation_store;
pub mod profile_store;

pub use account_store::AccountStore;
pub use brand_store::BrandStore;
pub use moderation_store::ModerationStore;
pub use profile_store::{PairedRecordStore, ProfileStore};
