//! Shopfront CLI - admin and catalog management tools.
//!
//! # Usage
//!
//! ```bash
//! # Hash a password for the `admins` table (reads stdin when omitted)
//! shopfront-cli admin hash-password
//!
//! # Print the hosted catalog
//! shopfront-cli catalog list
//! ```
//!
//! # Commands
//!
//! - `admin hash-password` - Produce an Argon2 hash for an `admins` row
//! - `catalog list` - List the `items` table through the storefront repository

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;

mod commands;

#[derive(Parser)]
#[command(name = "shopfront-cli")]
#[command(author, version, about = "Shopfront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage admin credentials
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Inspect the hosted catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Print an Argon2 hash to store in the `admins.password` column
    HashPassword {
        /// Password to hash; read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List every item in the `items` table
    List,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Admin { action } => match action {
            AdminAction::HashPassword { password } => {
                let password = match password {
                    Some(password) => SecretString::from(password),
                    None => commands::admin::read_password_from_stdin()?,
                };
                commands::admin::hash_password(&password)?;
            }
        },
        Commands::Catalog { action } => match action {
            CatalogAction::List => commands::catalog::list().await?,
        },
    }
    Ok(())
}
