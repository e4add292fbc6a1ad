//! Location administration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use blogicum_core::{BlogConfig, Title};
use blogicum_server::db::LocationRepo;

use super::{connect, visibility_label};

#[derive(Parser, Debug)]
#[command(about = "Manage post locations")]
pub struct LocationArgs {
    #[command(subcommand)]
    pub command: LocationCommand,
}

#[derive(Subcommand, Debug)]
pub enum LocationCommand {
    /// Create a location
    Add {
        /// Place name
        #[arg(long)]
        name: String,
        /// Create it unpublished
        #[arg(long)]
        hidden: bool,
    },
    /// List all locations, published or not
    List,
    /// Publish a location
    Publish {
        /// Location ID
        id: i64,
    },
    /// Hide a location from posts that reference it
    Hide {
        /// Location ID
        id: i64,
    },
}

pub async fn run_location(args: LocationArgs, config: &BlogConfig) -> Result<()> {
    let pool = connect(config).await?;
    let repo = LocationRepo::new(&pool);

    match args.command {
        LocationCommand::Add { name, hidden } => {
            let name = Title::for_field("name", &name)?;
            let location = repo
                .create(name, !hidden)
                .await
                .context("Failed to create location")?;
            println!(
                "Created location #{} '{}' ({})",
                location.id,
                location.name,
                visibility_label(location.is_published)
            );
        }
        LocationCommand::List => {
            let locations = repo.list_all().await?;
            if locations.is_empty() {
                println!("No locations yet. Add one with `blogicum location add`.");
            }
            for l in locations {
                println!(
                    "{:>6} {:<9} {}",
                    l.id,
                    visibility_label(l.is_published),
                    l.name
                );
            }
        }
        LocationCommand::Publish { id } => {
            let location = repo.set_published(id, true).await?;
            println!("Published location #{} '{}'", location.id, location.name);
        }
        LocationCommand::Hide { id } => {
            let location = repo.set_published(id, false).await?;
            println!("Hid location #{} '{}'", location.id, location.name);
        }
    }

    Ok(())
}
