//! Set-valued cache infrastructure for the like engine.
//!
//! [`RedisCacheStore`] is the production store. [`MemoryCacheStore`] keeps the
//! same semantics in process memory for single-instance setups and tests.

mod cache_store;
pub mod like_keys;
mod memory_cache_store;
mod redis_cache_store;

pub use cache_store::CacheStore;
pub use memory_cache_store::{MemoryCacheStore, MemoryCacheStoreParameters};
pub use redis_cache_store::{RedisCacheStore, RedisCacheStoreParameters, SCAN_BATCH_SIZE};
