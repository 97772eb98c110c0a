//! Core traits shared by domain entities.

use crate::{ContentId, ContentKind, UserId};
use std::collections::BTreeSet;

/// Trait for entities with a unique identifier.
pub trait Entity<ID> {
    /// Returns the entity's unique identifier.
    fn id(&self) -> &ID;
}

/// Content that users can like.
///
/// The liked-by relation is the durable side of a like-set: it is read once
/// when the cache is hydrated. Flushes overwrite it through the repositories.
pub trait LikedContent: Entity<ContentId> {
    /// The kind tag of this content.
    fn kind(&self) -> ContentKind;

    /// Users currently recorded as liking this content.
    fn liked_by(&self) -> &BTreeSet<UserId>;

    /// Number of recorded likes.
    fn like_count(&self) -> usize {
        self.liked_by().len()
    }
}
