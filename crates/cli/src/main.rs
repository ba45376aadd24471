//! Clementine CLI - Database migrations and deployment tooling.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! clementine-cli migrate
//!
//! # Reconcile the admin account (roles, user, password, membership)
//! clementine-cli bootstrap
//! ```
//!
//! # Commands
//!
//! - `migrate` - Apply database migrations
//! - `bootstrap` - Idempotent admin-account reconciliation, run at
//!   deployment time rather than server startup

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "clementine-cli")]
#[command(author, version, about = "Clementine CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Reconcile the seeded admin account to its configured state
    Bootstrap,
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
        Commands::Bootstrap => commands::bootstrap::run().await?,
    }
    Ok(())
}
