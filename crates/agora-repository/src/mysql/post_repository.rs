//! MySQL post repository implementation.

use super::like_table::LikeTable;
use crate::{traits::PostRepository, DatabasePoolInterface};
use agora_core::{AgoraResult, ContentId, Post, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shaku::Component;
use sqlx::FromRow;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// MySQL post repository implementation.
#[derive(Component, Clone)]
#[shaku(interface = PostRepository)]
pub struct MySqlPostRepository {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl MySqlPostRepository {
    /// Creates a new MySQL post repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

/// Database row representation of a post.
#[derive(Debug, FromRow)]
struct PostRow {
    id: i64,
    author_id: i64,
    title: String,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PostRow {
    fn into_post(self, liked_by: BTreeSet<UserId>) -> Post {
        Post {
            id: ContentId::new(self.id),
            author_id: UserId::new(self.author_id),
            title: self.title,
            body: self.body,
            liked_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[async_trait]
impl PostRepository for MySqlPostRepository {
    async fn find_by_id(&self, id: ContentId) -> AgoraResult<Option<Post>> {
        debug!("Finding post by id: {}", id);

        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author_id, title, body, created_at, updated_at
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool.inner())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let liked_by = LikeTable::POSTS.load(self.pool.inner(), id).await?;
        Ok(Some(row.into_post(liked_by)))
    }

    async fn save(&self, post: &Post) -> AgoraResult<Post> {
        debug!("Saving post {} with {} likes", post.id, post.liked_by.len());

        let mut tx = self.pool.inner().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO posts (id, author_id, title, body, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                title = VALUES(title),
                body = VALUES(body),
                updated_at = VALUES(updated_at)
            "#,
        )
        .bind(post.id.into_inner())
        .bind(post.author_id.into_inner())
        .bind(&post.title)
        .bind(&post.body)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&mut *tx)
        .await?;

        LikeTable::POSTS.replace(&mut tx, post.id, &post.liked_by).await?;

        tx.commit().await?;
        Ok(post.clone())
    }

    async fn replace_liked_by(&self, id: ContentId, users: &BTreeSet<UserId>) -> AgoraResult<bool> {
        debug!("Replacing likes of post {} with {} users", id, users.len());
        LikeTable::POSTS
            .replace_existing(self.pool.inner(), id, users)
            .await
    }
}
