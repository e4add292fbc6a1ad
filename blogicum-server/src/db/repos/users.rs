//! User repository
//!
//! Accounts are created through registration or the CLI. Username
//! uniqueness is enforced by the database.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use blogicum_core::{Email, PersonName, Username};

use super::DbError;

/// User record (never carries the password hash)
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
}

/// What login needs to check a password
#[derive(Debug, Clone, FromRow)]
pub struct Credentials {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// A validated account ready to be inserted
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub email: Email,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub password_hash: String,
    pub is_staff: bool,
}

/// Profile edits; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<Username>,
    pub email: Option<Email>,
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
}

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, is_staff, date_joined";

/// User repository
pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a user. A taken username is `DbError::Conflict`.
    pub async fn create(&self, new: NewUser) -> Result<User, DbError> {
        let user: User = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (username, email, first_name, last_name, password_hash, is_staff)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new.username.as_str())
        .bind(new.email.as_str())
        .bind(new.first_name.as_str())
        .bind(new.last_name.as_str())
        .bind(&new.password_hash)
        .bind(new.is_staff)
        .fetch_one(self.pool)
        .await?;

        tracing::info!(user_id = user.id, username = %user.username, "User created");
        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: i64) -> Result<User, DbError> {
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", id))
    }

    /// Get a user by username.
    pub async fn get_by_username(&self, username: &str) -> Result<User, DbError> {
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
            .bind(username)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", username))
    }

    /// Look up the password hash for a username, if the account exists.
    pub async fn credentials(&self, username: &str) -> Result<Option<Credentials>, DbError> {
        let creds = sqlx::query_as(
            "SELECT id, username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;
        Ok(creds)
    }

    /// Look up the password hash for a user ID.
    pub async fn credentials_by_id(&self, id: i64) -> Result<Credentials, DbError> {
        sqlx::query_as("SELECT id, username, password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", id))
    }

    /// Apply profile edits in a single statement.
    pub async fn update_profile(&self, id: i64, changes: ProfileChanges) -> Result<User, DbError> {
        sqlx::query_as(&format!(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                email = COALESCE($3, email),
                first_name = COALESCE($4, first_name),
                last_name = COALESCE($5, last_name)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.username.as_ref().map(Username::as_str))
        .bind(changes.email.as_ref().map(Email::as_str))
        .bind(changes.first_name.as_ref().map(PersonName::as_str))
        .bind(changes.last_name.as_ref().map(PersonName::as_str))
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("user", id))
    }

    /// Replace a user's password hash.
    pub async fn set_password(&self, id: i64, password_hash: &str) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("user", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // Integration tests - run with DATABASE_URL set
    // cargo test -p blogicum-server -- --ignored

    use super::*;
    use crate::db::{create_pool, migrate};

    async fn pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        migrate(&pool).await.expect("migrations failed");
        pool
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: Username::new(username).unwrap(),
            email: Email::default(),
            first_name: PersonName::default(),
            last_name: PersonName::default(),
            password_hash: "not-a-real-hash".into(),
            is_staff: false,
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_username_conflicts() {
        let pool = pool().await;
        let repo = UserRepo::new(&pool);
        let username = format!("dup-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default());

        repo.create(new_user(&username)).await.unwrap();
        let err = repo.create(new_user(&username)).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { field: "username" }));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn partial_profile_update_keeps_other_fields() {
        let pool = pool().await;
        let repo = UserRepo::new(&pool);
        let username = format!("edit-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default());
        let user = repo.create(new_user(&username)).await.unwrap();

        let updated = repo
            .update_profile(
                user.id,
                ProfileChanges {
                    first_name: Some(PersonName::new("first_name", "Lev").unwrap()),
                    ..ProfileChanges::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.first_name, "Lev");
        assert_eq!(updated.username, username);
    }
}
