//! Category administration
//!
//! Readers only see published categories, and a post is public only while
//! its category is published. Hiding a category hides its posts.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use blogicum_core::{BlogConfig, Body, CategorySlug, Title};
use blogicum_server::db::{CategoryRepo, NewCategory};

use super::{connect, visibility_label};

#[derive(Parser, Debug)]
#[command(about = "Manage post categories")]
pub struct CategoryArgs {
    #[command(subcommand)]
    pub command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    /// Create a category
    Add {
        /// URL identifier: letters, digits, hyphen and underscore
        #[arg(long)]
        slug: String,
        /// Display title
        #[arg(long)]
        title: String,
        /// Description shown on the category page
        #[arg(long)]
        description: String,
        /// Create it unpublished
        #[arg(long)]
        hidden: bool,
    },
    /// List all categories, published or not
    List,
    /// Publish a category
    Publish {
        /// Category slug
        slug: String,
    },
    /// Hide a category and, with it, its posts
    Hide {
        /// Category slug
        slug: String,
    },
}

pub async fn run_category(args: CategoryArgs, config: &BlogConfig) -> Result<()> {
    let pool = connect(config).await?;
    let repo = CategoryRepo::new(&pool);

    match args.command {
        CategoryCommand::Add {
            slug,
            title,
            description,
            hidden,
        } => {
            let new = NewCategory {
                title: Title::new(&title)?,
                description: Body::new("description", &description)?,
                slug: CategorySlug::new(&slug)?,
                is_published: !hidden,
            };
            let category = repo.create(new).await.context("Failed to create category")?;
            println!(
                "Created category '{}' ({}, {})",
                category.slug,
                category.title,
                visibility_label(category.is_published)
            );
        }
        CategoryCommand::List => {
            let categories = repo.list_all().await?;
            if categories.is_empty() {
                println!("No categories yet. Add one with `blogicum category add`.");
            }
            for c in categories {
                println!(
                    "{:<24} {:<9} {}",
                    c.slug,
                    visibility_label(c.is_published),
                    c.title
                );
            }
        }
        CategoryCommand::Publish { slug } => {
            let category = repo.set_published(&slug, true).await?;
            println!("Published category '{}'", category.slug);
        }
        CategoryCommand::Hide { slug } => {
            let category = repo.set_published(&slug, false).await?;
            println!("Hid category '{}'", category.slug);
        }
    }

    Ok(())
}
