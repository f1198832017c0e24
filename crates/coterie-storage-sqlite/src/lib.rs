pub mod account;
pub mod brand;
pub mod moderation;
pub mod profile;

pub use account::SqliteAccountStore;
pub use brand::SqliteBrandStore;
pub use moderation::SqliteModerationStore;
pub use profile::SqliteProfileStore;
