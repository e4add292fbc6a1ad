//! Account administration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use blogicum_core::{BlogConfig, Email, Password, PersonName, Username};
use blogicum_server::auth::hash_password_blocking;
use blogicum_server::db::{NewUser, UserRepo};

use super::connect;

#[derive(Parser, Debug)]
#[command(about = "Manage user accounts")]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Create an account
    Create {
        /// Login name: letters, digits and @/./+/-/_
        #[arg(long)]
        username: String,
        /// Password (at least 8 characters, not all digits)
        #[arg(long, env = "BLOGICUM_NEW_PASSWORD", hide_env_values = true)]
        password: String,
        /// Contact email
        #[arg(long, default_value = "")]
        email: String,
        /// Mark the account as staff
        #[arg(long)]
        staff: bool,
    },
}

pub async fn run_user(args: UserArgs, config: &BlogConfig) -> Result<()> {
    match args.command {
        UserCommand::Create {
            username,
            password,
            email,
            staff,
        } => {
            let username = Username::new(&username)?;
            let password = Password::new(&password, username.as_str())?;
            let email = Email::new(&email)?;
            let password_hash = hash_password_blocking(password).await?;

            let pool = connect(config).await?;
            let user = UserRepo::new(&pool)
                .create(NewUser {
                    username,
                    email,
                    first_name: PersonName::default(),
                    last_name: PersonName::default(),
                    password_hash,
                    is_staff: staff,
                })
                .await
                .context("Failed to create user")?;

            println!(
                "Created {} '{}' (id {})",
                if user.is_staff { "staff user" } else { "user" },
                user.username,
                user.id
            );
        }
    }

    Ok(())
}
