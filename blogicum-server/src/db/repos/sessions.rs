//! Session repository
//!
//! Login sessions keyed by the SHA-256 digest of the bearer token.
//! Expired sessions are ignored on lookup and purged in the background.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use sqlx::PgPool;

use super::{DbError, User};

/// Last cleanup timestamp for throttling
static LAST_CLEANUP: Lazy<AtomicI64> = Lazy::new(|| AtomicI64::new(0));

/// Minimum interval between cleanup spawns (60 seconds)
const CLEANUP_INTERVAL_SECS: i64 = 60;

/// Session repository
pub struct SessionRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> SessionRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a new session for `user_id`.
    pub async fn create(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token_hash, user_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(token_hash)
        .bind(user_id)
        .bind(expires_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Resolve a live session to its user.
    pub async fn find_user(&self, token_hash: &str) -> Result<Option<User>, DbError> {
        self.spawn_cleanup();

        let user = sqlx::query_as(
            r#"
            SELECT u.id, u.username, u.email, u.first_name, u.last_name,
                   u.is_staff, u.date_joined
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token_hash = $1
            AND s.expires_at > NOW()
            "#,
        )
        .bind(token_hash)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Delete one session (idempotent).
    pub async fn delete(&self, token_hash: &str) -> Result<(), DbError> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Delete every session of `user_id` except `keep`.
    pub async fn delete_others(&self, user_id: i64, keep: &str) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND token_hash <> $2")
            .bind(user_id)
            .bind(keep)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Clean up expired sessions (non-blocking spawn).
    ///
    /// Throttled to run at most once per CLEANUP_INTERVAL_SECS.
    fn spawn_cleanup(&self) {
        let now = Utc::now().timestamp();
        let last = LAST_CLEANUP.load(Ordering::Relaxed);

        if now - last < CLEANUP_INTERVAL_SECS {
            return;
        }

        // Claim this cleanup slot; another request may have beaten us to it
        if LAST_CLEANUP
            .compare_exchange(last, now, Ordering::SeqCst, Ordering::Relaxed)
            .is_err()
        {
            return;
        }

        let pool = self.pool.clone();
        tokio::spawn(async move {
            match cleanup_expired(&pool).await {
                Ok(0) => {}
                Ok(n) => tracing::debug!(purged = n, "Expired sessions removed"),
                Err(e) => tracing::warn!("Session cleanup failed: {}", e),
            }
        });
    }
}

/// Delete expired sessions.
pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at < NOW()")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
