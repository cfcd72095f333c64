//! Minimart CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! mm-cli migrate
//!
//! # Grant or revoke catalog administration
//! mm-cli admin promote -u alice
//! mm-cli admin demote -u alice
//!
//! # Load products from a YAML file
//! mm-cli seed products crates/cli/seed/products.yaml
//! ```
//!
//! All commands read `MINIMART_DATABASE_URL` (or `DATABASE_URL`), honoring a
//! `.env` file.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use minimart_core::UserLevel;

mod commands;

#[derive(Parser)]
#[command(name = "mm-cli")]
#[command(author, version, about = "Minimart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage administrator accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Grant admin level to an existing user
    Promote {
        /// Username to promote
        #[arg(short, long)]
        username: String,
    },
    /// Return an admin to customer level
    Demote {
        /// Username to demote
        #[arg(short, long)]
        username: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert products listed in a YAML file
    Products {
        /// Path to the YAML file
        file: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Promote { username } => {
                commands::admin::set_level(&username, UserLevel::Admin).await?;
            }
            AdminAction::Demote { username } => {
                commands::admin::set_level(&username, UserLevel::Customer).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => commands::seed::products(&file).await?,
        },
    }
    Ok(())
}
