//! Command implementations for the blogicum CLI

pub mod category;
pub mod location;
pub mod migrate;
pub mod serve;
pub mod user;

// Re-export dispatcher functions for flat access from main.rs
pub use category::run_category;
pub use location::run_location;
pub use migrate::run_migrate;
pub use serve::run_serve;
pub use user::run_user;

use anyhow::{Context, Result};
use sqlx::PgPool;

use blogicum_core::BlogConfig;
use blogicum_server::db::create_pool_with_options;

/// Open a pool sized by the config.
pub(crate) async fn connect(config: &BlogConfig) -> Result<PgPool> {
    let url = config.database_url()?;
    create_pool_with_options(url, config.max_connections)
        .await
        .context("Failed to create database pool")
}

/// Render a published flag for listings.
pub(crate) fn visibility_label(is_published: bool) -> &'static str {
    if is_published {
        "published"
    } else {
        "hidden"
    }
}
