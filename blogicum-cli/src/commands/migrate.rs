//! Migration command

use anyhow::{Context, Result};

use blogicum_core::BlogConfig;
use blogicum_server::db::{migrate, MIGRATOR};

use super::connect;

/// Apply every pending migration.
pub async fn run_migrate(config: &BlogConfig) -> Result<()> {
    let pool = connect(config).await?;
    migrate(&pool).await.context("Failed to apply migrations")?;
    println!("Schema is up to date ({} migrations known)", MIGRATOR.iter().count());
    Ok(())
}
