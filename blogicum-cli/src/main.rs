//! blogicum CLI - run and administer the blog
//!
//! - `serve`: migrate, then run the HTTP API
//! - `migrate`: apply pending database migrations
//! - `category`, `location`: manage the catalog readers browse by
//! - `user`: create accounts, including staff

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use blogicum_core::{load_dotenv, BlogConfig};

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "blogicum",
    author,
    version,
    about = "Multi-user blog: HTTP API server and admin tools",
    long_about = "Run the blogicum HTTP API and manage the categories, locations and \
                  accounts behind it. Settings come from ~/.blogicum/config.toml, .env \
                  files, BLOGICUM_* environment variables and flags, in that order."
)]
struct Cli {
    /// Config file (default: $BLOGICUM_CONFIG or ~/.blogicum/config.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Apply pending database migrations
    Migrate,
    /// Manage post categories (add, list, publish, hide)
    Category(commands::category::CategoryArgs),
    /// Manage post locations (add, list, publish, hide)
    Location(commands::location::LocationArgs),
    /// Manage user accounts
    User(commands::user::UserArgs),
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing().ok();
    let cli = Cli::parse();

    for path in load_dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }
    let config = BlogConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config).await?,
        Commands::Migrate => commands::run_migrate(&config).await?,
        Commands::Category(args) => commands::run_category(args, &config).await?,
        Commands::Location(args) => commands::run_location(args, &config).await?,
        Commands::User(args) => commands::run_user(args, &config).await?,
    }

    Ok(())
}
