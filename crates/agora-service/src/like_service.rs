//! Like service trait definition.

use agora_core::{AgoraResult, ContentId, ContentKind, Interface, UserId};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Outcome counters of one flush pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Like-set keys enumerated across all kinds.
    pub keys_scanned: u64,
    /// Items whose liked-by relation was written.
    pub flushed: u64,
    /// Like-set keys or emptied-marker entries whose id did not parse.
    pub malformed_keys: u64,
    /// Items that no longer exist in the durable store.
    pub missing_content: u64,
    /// Set members dropped because no such user exists.
    pub missing_users: u64,
    /// Items whose flush failed on a store error.
    pub failed: u64,
}

impl FlushReport {
    /// Returns true if every visited item was either written or legitimately skipped.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Like service trait.
///
/// All reads and toggles go to the cache. The first touch of an item copies
/// its durable liked-by relation into the cache; from then on the cache is
/// authoritative until [`LikeService::flush_all`] writes it back.
#[async_trait]
pub trait LikeService: Interface + Send + Sync {
    /// Number of users currently liking an item. Unknown items have 0.
    async fn like_count(&self, kind: ContentKind, id: ContentId) -> AgoraResult<u64>;

    /// Users currently liking an item.
    async fn likers(&self, kind: ContentKind, id: ContentId) -> AgoraResult<BTreeSet<UserId>>;

    /// Whether a user currently likes an item.
    async fn is_liked(&self, kind: ContentKind, id: ContentId, user: UserId) -> AgoraResult<bool>;

    /// Flips a user's like on an item and returns the resulting state.
    ///
    /// Neither the item nor the user is checked for existence here; unknown
    /// ids are dropped at flush time.
    async fn toggle_like(&self, kind: ContentKind, id: ContentId, user: UserId) -> AgoraResult<bool>;

    /// Writes every cached like-set back to the durable store, including
    /// items whose last like was removed since the previous flush.
    ///
    /// Waits for a flush already in progress to finish first.
    async fn flush_all(&self) -> AgoraResult<FlushReport>;

    /// Like [`LikeService::flush_all`], but returns `None` immediately when
    /// another flush is in progress.
    async fn try_flush_all(&self) -> AgoraResult<Option<FlushReport>>;
}
