pub mod error;
pub mod memory;
pub mod pattern;
pub mod sqlite;
pub mod store;

pub use error::CacheError;
pub use memory::HotCache;
pub use sqlite::SnapshotStore;
pub use store::{CacheInfo, CacheStats, ResultCache, TtlStatus};
