//! Post entity.

use crate::{ContentId, ContentKind, Entity, LikedContent, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A forum post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier for the post.
    pub id: ContentId,

    /// Author of the post.
    pub author_id: UserId,

    /// Post title.
    pub title: String,

    /// Markdown body.
    pub body: String,

    /// Users who like this post.
    #[serde(default)]
    pub liked_by: BTreeSet<UserId>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Creates a post with no likes.
    #[must_use]
    pub fn new(id: ContentId, author_id: UserId, title: String, body: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            author_id,
            title,
            body,
            liked_by: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity<ContentId> for Post {
    fn id(&self) -> &ContentId {
        &self.id
    }
}

impl LikedContent for Post {
    fn kind(&self) -> ContentKind {
        ContentKind::Post
    }

    fn liked_by(&self) -> &BTreeSet<UserId> {
        &self.liked_by
    }
}
