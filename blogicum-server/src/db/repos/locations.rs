//! Location repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use blogicum_core::Title;

use super::DbError;

/// Location record from database
#[derive(Debug, Clone, FromRow)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// Location repository
pub struct LocationRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> LocationRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: Title, is_published: bool) -> Result<Location, DbError> {
        let location = sqlx::query_as(
            r#"
            INSERT INTO locations (name, is_published)
            VALUES ($1, $2)
            RETURNING id, name, is_published, created_at
            "#,
        )
        .bind(name.as_str())
        .bind(is_published)
        .fetch_one(self.pool)
        .await?;
        Ok(location)
    }

    pub async fn list_all(&self) -> Result<Vec<Location>, DbError> {
        let rows = sqlx::query_as(
            "SELECT id, name, is_published, created_at FROM locations ORDER BY name, id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_published(&self) -> Result<Vec<Location>, DbError> {
        let rows = sqlx::query_as(
            r#"
            SELECT id, name, is_published, created_at
            FROM locations
            WHERE is_published
            ORDER BY name, id
            "#,
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn set_published(&self, id: i64, is_published: bool) -> Result<Location, DbError> {
        sqlx::query_as(
            r#"
            UPDATE locations SET is_published = $2
            WHERE id = $1
            RETURNING id, name, is_published, created_at
            "#,
        )
        .bind(id)
        .bind(is_published)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("location", id))
    }
}
