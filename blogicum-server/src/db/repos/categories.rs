//! Category repository
//!
//! Categories are managed by staff (CLI); readers only ever see
//! published ones.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use blogicum_core::{Body, CategorySlug, Title};

use super::DbError;

/// Category record from database
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// A validated category ready to be inserted
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub title: Title,
    pub description: Body,
    pub slug: CategorySlug,
    pub is_published: bool,
}

const CATEGORY_COLUMNS: &str = "id, title, description, slug, is_published, created_at";

/// Category repository
pub struct CategoryRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a category. A taken slug is `DbError::Conflict`.
    pub async fn create(&self, new: NewCategory) -> Result<Category, DbError> {
        let category = sqlx::query_as(&format!(
            r#"
            INSERT INTO categories (title, description, slug, is_published)
            VALUES ($1, $2, $3, $4)
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(new.title.as_str())
        .bind(new.description.as_str())
        .bind(new.slug.as_str())
        .bind(new.is_published)
        .fetch_one(self.pool)
        .await?;
        Ok(category)
    }

    /// All categories, published or not, by title.
    pub async fn list_all(&self) -> Result<Vec<Category>, DbError> {
        let rows = sqlx::query_as(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY title, id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Published categories, by title.
    pub async fn list_published(&self) -> Result<Vec<Category>, DbError> {
        let rows = sqlx::query_as(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE is_published ORDER BY title, id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// A published category by slug. Hidden categories are "not found".
    pub async fn get_published(&self, slug: &str) -> Result<Category, DbError> {
        sqlx::query_as(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1 AND is_published"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("category", slug))
    }

    /// Publish or hide a category.
    pub async fn set_published(&self, slug: &str, is_published: bool) -> Result<Category, DbError> {
        sqlx::query_as(&format!(
            "UPDATE categories SET is_published = $2 WHERE slug = $1 RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(slug)
        .bind(is_published)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("category", slug))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, migrate};

    #[tokio::test]
    #[ignore = "requires database"]
    async fn hidden_category_is_not_found() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.unwrap();
        migrate(&pool).await.unwrap();

        let slug = format!("hidden-{}", Utc::now().timestamp_micros());
        let repo = CategoryRepo::new(&pool);
        repo.create(NewCategory {
            title: Title::new("Hidden").unwrap(),
            description: Body::new("description", "Not yet").unwrap(),
            slug: CategorySlug::new(&slug).unwrap(),
            is_published: false,
        })
        .await
        .unwrap();

        assert!(matches!(
            repo.get_published(&slug).await.unwrap_err(),
            DbError::NotFound { resource: "category", .. }
        ));

        repo.set_published(&slug, true).await.unwrap();
        assert_eq!(repo.get_published(&slug).await.unwrap().slug, slug);
    }
}
