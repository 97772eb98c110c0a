//! Kind-erased content item.

use super::{Comment, Post};
use crate::{ContentId, ContentKind, Entity, LikedContent, UserId};
use std::collections::BTreeSet;

/// Either a post or a comment.
///
/// Lets the like engine treat both kinds uniformly while each repository keeps
/// its own concrete type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItem {
    /// A post.
    Post(Post),
    /// A comment.
    Comment(Comment),
}

impl Entity<ContentId> for ContentItem {
    fn id(&self) -> &ContentId {
        match self {
            Self::Post(post) => post.id(),
            Self::Comment(comment) => comment.id(),
        }
    }
}

impl LikedContent for ContentItem {
    fn kind(&self) -> ContentKind {
        match self {
            Self::Post(_) => ContentKind::Post,
            Self::Comment(_) => ContentKind::Comment,
        }
    }

    fn liked_by(&self) -> &BTreeSet<UserId> {
        match self {
            Self::Post(post) => post.liked_by(),
            Self::Comment(comment) => comment.liked_by(),
        }
    }
}

impl From<Post> for ContentItem {
    fn from(post: Post) -> Self {
        Self::Post(post)
    }
}

impl From<Comment> for ContentItem {
    fn from(comment: Comment) -> Self {
        Self::Comment(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liked_by_delegates() {
        let mut post = Post::new(ContentId::new(1), UserId::new(9), "t".into(), "b".into());
        post.liked_by = [UserId::new(1), UserId::new(2)].into_iter().collect();
        let item = ContentItem::from(post);

        assert_eq!(item.kind(), ContentKind::Post);
        assert_eq!(item.like_count(), 2);
        assert!(item.liked_by().contains(&UserId::new(2)));
    }

    #[test]
    fn test_comment_identity() {
        let comment = Comment::new(ContentId::new(5), ContentId::new(1), UserId::new(2), "hi".into());
        let item = ContentItem::from(comment);
        assert_eq!(item.kind(), ContentKind::Comment);
        assert_eq!(*item.id(), ContentId::new(5));
    }
}
