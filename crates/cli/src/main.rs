//! Marigold CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! mg-cli migrate
//!
//! # Seed the catalog with sample products
//! mg-cli seed
//!
//! # List product drafts that never finished creation
//! mg-cli products sweep-drafts --older-than-hours 24
//!
//! # ...and delete them
//! mg-cli products sweep-drafts --older-than-hours 24 --delete
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mg-cli")]
#[command(author, version, about = "Marigold CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog with sample products
    Seed,
    /// Product maintenance
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Find (and optionally delete) drafts that never finished creation
    SweepDrafts {
        /// Only consider drafts older than this many hours
        #[arg(long, default_value_t = 24)]
        older_than_hours: i64,

        /// Delete the stalled drafts instead of just listing them
        #[arg(long)]
        delete: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
        Commands::Seed => commands::seed::run().await?,
        Commands::Products { action } => match action {
            ProductAction::SweepDrafts {
                older_than_hours,
                delete,
            } => commands::products::sweep_drafts(older_than_hours, delete).await?,
        },
    }
    Ok(())
}
