//! Cache store trait for set-valued keys.

use agora_core::{AgoraResult, Interface};
use async_trait::async_trait;
use std::collections::HashSet;

/// A shared key/value store whose values are sets of strings.
///
/// Every operation is atomic per call. A set that loses its last member
/// ceases to exist: it reads back as empty and is no longer reported by
/// [`CacheStore::keys_matching`].
#[async_trait]
pub trait CacheStore: Interface + Send + Sync {
    /// Adds a member to a set, creating the set if needed.
    ///
    /// Returns `true` if the member was not present before.
    async fn add_to_set(&self, key: &str, member: &str) -> AgoraResult<bool>;

    /// Adds several members in one call.
    ///
    /// Returns the number of members that were newly added.
    async fn add_all_to_set(&self, key: &str, members: &[String]) -> AgoraResult<u64>;

    /// Removes a member from a set.
    ///
    /// Returns `true` if the member was present.
    async fn remove_from_set(&self, key: &str, member: &str) -> AgoraResult<bool>;

    /// Checks set membership. A missing key holds nothing.
    async fn set_contains(&self, key: &str, member: &str) -> AgoraResult<bool>;

    /// Returns every member of a set. A missing key yields an empty set.
    async fn set_members(&self, key: &str) -> AgoraResult<HashSet<String>>;

    /// Returns the cardinality of a set. A missing key yields 0.
    async fn set_size(&self, key: &str) -> AgoraResult<u64>;

    /// Enumerates existing keys matching a glob pattern (`*` and `?`).
    async fn keys_matching(&self, pattern: &str) -> AgoraResult<HashSet<String>>;
}
