// Response caching module

pub mod keys;
pub mod manager;
pub mod models;

pub use keys::derive_key;
pub use manager::{DomainCaches, TtlCache};
pub use models::{CacheConfig, CacheEntry, CacheStats};
