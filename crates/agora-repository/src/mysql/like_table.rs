//! Join tables holding the durable liked-by relation.

use agora_core::{AgoraResult, ContentId, UserId};
use sqlx::mysql::{MySql, MySqlPool};
use sqlx::{QueryBuilder, Transaction};
use std::collections::BTreeSet;

/// A `(<owner>_id, user_id)` join table.
pub(crate) struct LikeTable {
    table: &'static str,
    owner_table: &'static str,
    owner_column: &'static str,
}

impl LikeTable {
    pub(crate) const POSTS: Self = Self {
        table: "post_likes",
        owner_table: "posts",
        owner_column: "post_id",
    };

    pub(crate) const COMMENTS: Self = Self {
        table: "comment_likes",
        owner_table: "comments",
        owner_column: "comment_id",
    };

    /// Loads every user liking `owner`.
    pub(crate) async fn load(&self, pool: &MySqlPool, owner: ContentId) -> AgoraResult<BTreeSet<UserId>> {
        let sql = format!(
            "SELECT user_id FROM {} WHERE {} = ?",
            self.table, self.owner_column
        );
        let ids: Vec<i64> = sqlx::query_scalar(&sql)
            .bind(owner.into_inner())
            .fetch_all(pool)
            .await?;

        Ok(ids.into_iter().map(UserId::new).collect())
    }

    /// Replaces the relation of an existing `owner` in its own transaction.
    ///
    /// The owner row is locked first so a concurrent delete either happens
    /// before (nothing is written, returns `false`) or waits for the commit.
    /// The owner row itself is never inserted.
    pub(crate) async fn replace_existing(
        &self,
        pool: &MySqlPool,
        owner: ContentId,
        users: &BTreeSet<UserId>,
    ) -> AgoraResult<bool> {
        let mut tx = pool.begin().await?;

        let lock = format!("SELECT id FROM {} WHERE id = ? FOR UPDATE", self.owner_table);
        let exists: Option<i64> = sqlx::query_scalar(&lock)
            .bind(owner.into_inner())
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            tx.rollback().await?;
            return Ok(false);
        }

        self.replace(&mut tx, owner, users).await?;
        tx.commit().await?;
        Ok(true)
    }

    /// Replaces the relation of `owner` with `users` inside `tx`.
    pub(crate) async fn replace(
        &self,
        tx: &mut Transaction<'_, MySql>,
        owner: ContentId,
        users: &BTreeSet<UserId>,
    ) -> AgoraResult<()> {
        let delete = format!("DELETE FROM {} WHERE {} = ?", self.table, self.owner_column);
        sqlx::query(&delete)
            .bind(owner.into_inner())
            .execute(&mut **tx)
            .await?;

        if users.is_empty() {
            return Ok(());
        }

        let mut insert = QueryBuilder::<MySql>::new(format!(
            "INSERT INTO {} ({}, user_id) ",
            self.table, self.owner_column
        ));
        insert.push_values(users, |mut row, user| {
            row.push_bind(owner.into_inner()).push_bind(user.into_inner());
        });
        insert.build().execute(&mut **tx).await?;

        Ok(())
    }
}
