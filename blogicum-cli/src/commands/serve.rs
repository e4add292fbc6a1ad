//! HTTP server command
//!
//! Applies pending migrations, then runs the API until Ctrl+C/SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;

use blogicum_core::BlogConfig;
use blogicum_server::db::migrate;
use blogicum_server::http::{run_server, ServerConfig};

use super::connect;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default from config: 127.0.0.1:8000)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Skip applying pending migrations on startup
    #[arg(long)]
    pub no_migrate: bool,
}

impl ServeArgs {
    /// Layer the flags over the loaded config.
    fn apply(&self, config: &mut BlogConfig) {
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(url) = &self.database_url {
            config.database_url = Some(url.clone());
        }
        if self.cors_permissive {
            config.cors_permissive = true;
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, mut config: BlogConfig) -> Result<()> {
    args.apply(&mut config);

    let pool = connect(&config).await?;
    if args.no_migrate {
        tracing::warn!("Skipping migrations (--no-migrate)");
    } else {
        migrate(&pool).await.context("Failed to apply migrations")?;
    }

    tracing::info!("Starting blogicum server on {}", config.bind_addr);

    // Run server (blocks until shutdown)
    run_server(pool, ServerConfig::from(&config))
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = ServeArgs::parse_from([
            "serve",
            "--bind",
            "0.0.0.0:9000",
            "--database-url",
            "postgres://flag/blog",
            "--cors-permissive",
        ]);
        let mut config = BlogConfig {
            database_url: Some("postgres://file/blog".into()),
            ..BlogConfig::default()
        };
        args.apply(&mut config);

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.database_url.as_deref(), Some("postgres://flag/blog"));
        assert!(config.cors_permissive);
    }

    #[test]
    fn absent_flags_keep_config() {
        let args = ServeArgs {
            bind: None,
            cors_permissive: false,
            database_url: None,
            no_migrate: false,
        };
        let expected = BlogConfig {
            cors_permissive: true,
            ..BlogConfig::default()
        };
        let mut config = expected.clone();
        args.apply(&mut config);

        assert_eq!(config, expected);
    }
}
