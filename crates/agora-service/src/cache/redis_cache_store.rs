//! Redis-backed cache store.

use super::CacheStore;
use agora_core::{AgoraError, AgoraResult};
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Pool};
use shaku::Component;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Keys requested per `SCAN` round trip.
pub const SCAN_BATCH_SIZE: usize = 500;

/// Redis-backed set store.
#[derive(Component)]
#[shaku(interface = CacheStore)]
pub struct RedisCacheStore {
    /// Redis connection pool.
    pool: Arc<Pool>,
}

impl RedisCacheStore {
    /// Create a new Redis cache store.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool }
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> AgoraResult<deadpool_redis::Connection> {
        self.pool.get().await.map_err(AgoraError::from)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn add_to_set(&self, key: &str, member: &str) -> AgoraResult<bool> {
        let mut conn = self.get_conn().await?;
        let added: i64 = conn.sadd(key, member).await.map_err(|e| {
            AgoraError::Cache(format!("Failed to add to set '{}': {}", key, e))
        })?;
        Ok(added > 0)
    }

    async fn add_all_to_set(&self, key: &str, members: &[String]) -> AgoraResult<u64> {
        if members.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn().await?;
        let added: u64 = conn.sadd(key, members).await.map_err(|e| {
            AgoraError::Cache(format!("Failed to add to set '{}': {}", key, e))
        })?;

        debug!("Added {} of {} members to '{}'", added, members.len(), key);
        Ok(added)
    }

    async fn remove_from_set(&self, key: &str, member: &str) -> AgoraResult<bool> {
        let mut conn = self.get_conn().await?;
        let removed: i64 = conn.srem(key, member).await.map_err(|e| {
            AgoraError::Cache(format!("Failed to remove from set '{}': {}", key, e))
        })?;
        Ok(removed > 0)
    }

    async fn set_contains(&self, key: &str, member: &str) -> AgoraResult<bool> {
        let mut conn = self.get_conn().await?;
        let contains: bool = conn.sismember(key, member).await.map_err(|e| {
            AgoraError::Cache(format!("Failed to check set '{}': {}", key, e))
        })?;
        Ok(contains)
    }

    async fn set_members(&self, key: &str) -> AgoraResult<HashSet<String>> {
        let mut conn = self.get_conn().await?;
        let members: HashSet<String> = conn.smembers(key).await.map_err(|e| {
            AgoraError::Cache(format!("Failed to read set '{}': {}", key, e))
        })?;
        Ok(members)
    }

    async fn set_size(&self, key: &str) -> AgoraResult<u64> {
        let mut conn = self.get_conn().await?;
        let size: u64 = conn.scard(key).await.map_err(|e| {
            AgoraError::Cache(format!("Failed to size set '{}': {}", key, e))
        })?;
        Ok(size)
    }

    async fn keys_matching(&self, pattern: &str) -> AgoraResult<HashSet<String>> {
        let mut conn = self.get_conn().await?;
        let mut keys = HashSet::new();
        let mut cursor: u64 = 0;

        // SCAN may return a key more than once; the set absorbs duplicates.
        loop {
            let (next, batch): (u64, Vec<String>) = deadpool_redis::redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH_SIZE)
                .query_async(&mut conn)
                .await
                .map_err(|e| AgoraError::Cache(format!("Failed to scan keys: {}", e)))?;

            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!("Found {} keys matching pattern '{}'", keys.len(), pattern);
        Ok(keys)
    }
}

impl std::fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deadpool_redis::{Config, Runtime};

    #[tokio::test]
    async fn test_unreachable_redis_surfaces_cache_error() {
        let pool = Config::from_url("redis://127.0.0.1:1")
            .builder()
            .unwrap()
            .max_size(1)
            .runtime(Runtime::Tokio1)
            .build()
            .unwrap();
        let store = RedisCacheStore::new(Arc::new(pool));

        let err = store.set_size("post:like:1").await.unwrap_err();
        assert!(matches!(err, AgoraError::Cache(_)));
        assert!(err.is_retriable());
    }
}
