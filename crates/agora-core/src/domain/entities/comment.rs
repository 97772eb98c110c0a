//! Comment entity.

use crate::{ContentId, ContentKind, Entity, LikedContent, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A comment attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier for the comment.
    pub id: ContentId,

    /// The post this comment belongs to.
    pub post_id: ContentId,

    /// Author of the comment.
    pub author_id: UserId,

    /// Markdown body.
    pub body: String,

    /// Users who like this comment.
    #[serde(default)]
    pub liked_by: BTreeSet<UserId>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a comment with no likes.
    #[must_use]
    pub fn new(id: ContentId, post_id: ContentId, author_id: UserId, body: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            post_id,
            author_id,
            body,
            liked_by: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity<ContentId> for Comment {
    fn id(&self) -> &ContentId {
        &self.id
    }
}

impl LikedContent for Comment {
    fn kind(&self) -> ContentKind {
        ContentKind::Comment
    }

    fn liked_by(&self) -> &BTreeSet<UserId> {
        &self.liked_by
    }
}
