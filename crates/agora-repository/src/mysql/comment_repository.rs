//! MySQL comment repository implementation.

use super::like_table::LikeTable;
use crate::{traits::CommentRepository, DatabasePoolInterface};
use agora_core::{AgoraResult, Comment, ContentId, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shaku::Component;
use sqlx::FromRow;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// MySQL comment repository implementation.
#[derive(Component, Clone)]
#[shaku(interface = CommentRepository)]
pub struct MySqlCommentRepository {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl MySqlCommentRepository {
    /// Creates a new MySQL comment repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    author_id: i64,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CommentRow {
    fn into_comment(self, liked_by: BTreeSet<UserId>) -> Comment {
        Comment {
            id: ContentId::new(self.id),
            post_id: ContentId::new(self.post_id),
            author_id: UserId::new(self.author_id),
            body: self.body,
            liked_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[async_trait]
impl CommentRepository for MySqlCommentRepository {
    async fn find_by_id(&self, id: ContentId) -> AgoraResult<Option<Comment>> {
        debug!("Finding comment by id: {}", id);

        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, post_id, author_id, body, created_at, updated_at
            FROM comments
            WHERE id = ?
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool.inner())
        .await?;

        match row {
            Some(row) => {
                let liked_by = LikeTable::COMMENTS.load(self.pool.inner(), id).await?;
                Ok(Some(row.into_comment(liked_by)))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, comment: &Comment) -> AgoraResult<Comment> {
        debug!("Saving comment {} with {} likes", comment.id, comment.liked_by.len());

        let mut tx = self.pool.inner().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO comments (id, post_id, author_id, body, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                body = VALUES(body),
                updated_at = VALUES(updated_at)
            "#,
        )
        .bind(comment.id.into_inner())
        .bind(comment.post_id.into_inner())
        .bind(comment.author_id.into_inner())
        .bind(&comment.body)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&mut *tx)
        .await?;

        LikeTable::COMMENTS
            .replace(&mut tx, comment.id, &comment.liked_by)
            .await?;

        tx.commit().await?;
        Ok(comment.clone())
    }

    async fn replace_liked_by(&self, id: ContentId, users: &BTreeSet<UserId>) -> AgoraResult<bool> {
        debug!("Replacing likes of comment {} with {} users", id, users.len());
        LikeTable::COMMENTS
            .replace_existing(self.pool.inner(), id, users)
            .await
    }
}
