//! Repository trait definitions.

use agora_core::{AgoraResult, Comment, ContentId, Interface, Post, User, UserId};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Post store.
#[async_trait]
pub trait PostRepository: Interface + Send + Sync {
    /// Finds a post, including its liked-by relation.
    async fn find_by_id(&self, id: ContentId) -> AgoraResult<Option<Post>>;

    /// Inserts or updates a post and replaces its liked-by relation.
    async fn save(&self, post: &Post) -> AgoraResult<Post>;

    /// Replaces the liked-by relation of an existing post.
    ///
    /// Returns `false` and writes nothing when the post does not exist.
    async fn replace_liked_by(&self, id: ContentId, users: &BTreeSet<UserId>) -> AgoraResult<bool>;
}

/// Comment store.
#[async_trait]
pub trait CommentRepository: Interface + Send + Sync {
    /// Finds a comment, including its liked-by relation.
    async fn find_by_id(&self, id: ContentId) -> AgoraResult<Option<Comment>>;

    /// Inserts or updates a comment and replaces its liked-by relation.
    async fn save(&self, comment: &Comment) -> AgoraResult<Comment>;

    /// Replaces the liked-by relation of an existing comment.
    ///
    /// Returns `false` and writes nothing when the comment does not exist.
    async fn replace_liked_by(&self, id: ContentId, users: &BTreeSet<UserId>) -> AgoraResult<bool>;
}

/// User directory.
#[async_trait]
pub trait UserRepository: Interface + Send + Sync {
    /// Finds a user by ID.
    async fn find_by_id(&self, id: UserId) -> AgoraResult<Option<User>>;

    /// Inserts or updates a user.
    async fn save(&self, user: &User) -> AgoraResult<User>;
}
