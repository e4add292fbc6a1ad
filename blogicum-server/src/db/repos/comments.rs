//! Comment repository
//!
//! Comments are always addressed through their post: a comment ID that
//! belongs to another post is "not found".

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use blogicum_core::{ensure_author, Body};

use super::DbError;

/// Comment joined with its author's username
#[derive(Debug, Clone, FromRow)]
pub struct CommentView {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Comment repository
pub struct CommentRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CommentRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a comment to a post.
    pub async fn create(
        &self,
        post_id: i64,
        author_id: i64,
        text: Body,
    ) -> Result<CommentView, DbError> {
        let comment: CommentView = sqlx::query_as(
            r#"
            WITH c AS (
                INSERT INTO comments (post_id, author_id, text)
                VALUES ($1, $2, $3)
                RETURNING id, post_id, author_id, text, created_at
            )
            SELECT c.id, c.post_id, c.author_id, u.username AS author_username,
                   c.text, c.created_at
            FROM c
            JOIN users u ON u.id = c.author_id
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(text.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::InvalidReference { field: "post_id" } => DbError::not_found("post", post_id),
            other => other,
        })?;

        tracing::info!(comment_id = comment.id, post_id, author_id, "Comment created");
        Ok(comment)
    }

    /// All comments on a post, oldest first.
    pub async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentView>, DbError> {
        let rows = sqlx::query_as(
            r#"
            SELECT c.id, c.post_id, c.author_id, u.username AS author_username,
                   c.text, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Replace a comment's text. Only its author may do this.
    pub async fn update(
        &self,
        post_id: i64,
        comment_id: i64,
        user_id: i64,
        text: Body,
    ) -> Result<CommentView, DbError> {
        let mut tx = self.pool.begin().await?;
        lock_owned_by(&mut tx, post_id, comment_id, user_id).await?;

        let comment: CommentView = sqlx::query_as(
            r#"
            WITH c AS (
                UPDATE comments SET text = $2
                WHERE id = $1
                RETURNING id, post_id, author_id, text, created_at
            )
            SELECT c.id, c.post_id, c.author_id, u.username AS author_username,
                   c.text, c.created_at
            FROM c
            JOIN users u ON u.id = c.author_id
            "#,
        )
        .bind(comment_id)
        .bind(text.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(comment)
    }

    /// Delete a comment. Only its author may do this.
    pub async fn delete(&self, post_id: i64, comment_id: i64, user_id: i64) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;
        lock_owned_by(&mut tx, post_id, comment_id, user_id).await?;

        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(comment_id, post_id, "Comment deleted");
        Ok(())
    }
}

/// Lock the comment row, check it sits under `post_id` and that `user_id` wrote it.
async fn lock_owned_by(
    tx: &mut Transaction<'_, Postgres>,
    post_id: i64,
    comment_id: i64,
    user_id: i64,
) -> Result<(), DbError> {
    let owner: Option<(i64,)> = sqlx::query_as(
        "SELECT author_id FROM comments WHERE id = $1 AND post_id = $2 FOR UPDATE",
    )
    .bind(comment_id)
    .bind(post_id)
    .fetch_optional(&mut **tx)
    .await?;

    let (owner_id,) = owner.ok_or_else(|| DbError::not_found("comment", comment_id))?;
    ensure_author("comment", owner_id, user_id)?;
    Ok(())
}
