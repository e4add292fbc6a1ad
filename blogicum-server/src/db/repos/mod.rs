//! Repository implementations for database access
//!
//! Each repository borrows the pool and follows these patterns:
//! - JOINs for list operations (no N+1)
//! - Unique and foreign-key violations come back as typed errors
//! - Ownership checks happen inside a transaction with the row locked

pub mod users;
pub mod sessions;
pub mod categories;
pub mod locations;
pub mod posts;
pub mod comments;

pub use users::{Credentials, NewUser, ProfileChanges, User, UserRepo};
pub use sessions::SessionRepo;
pub use categories::{Category, CategoryRepo, NewCategory};
pub use locations::{Location, LocationRepo};
pub use posts::{PostInput, PostRepo, PostView};
pub use comments::{CommentRepo, CommentView};

use blogicum_core::NotAuthor;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("{field} is already taken")]
    Conflict { field: &'static str },

    #[error("{field} refers to a missing record")]
    InvalidReference { field: &'static str },

    #[error(transparent)]
    NotAuthor(#[from] NotAuthor),
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        let classified = e.as_database_error().and_then(|db| {
            if db.is_unique_violation() {
                Some(Self::Conflict {
                    field: unique_field(db.constraint()),
                })
            } else if db.is_foreign_key_violation() {
                Some(Self::InvalidReference {
                    field: reference_field(db.constraint()),
                })
            } else {
                None
            }
        });
        classified.unwrap_or(Self::Sqlx(e))
    }
}

/// Map a unique constraint name to the field users know it by.
fn unique_field(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_username_key") => "username",
        Some("categories_slug_key") => "slug",
        _ => "value",
    }
}

/// Map a foreign-key constraint name to the request field that caused it.
fn reference_field(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("posts_category_id_fkey") => "category_id",
        Some("posts_location_id_fkey") => "location_id",
        Some("comments_post_id_fkey") => "post_id",
        Some(c) if c.ends_with("author_id_fkey") || c.ends_with("user_id_fkey") => "user",
        _ => "reference",
    }
}
