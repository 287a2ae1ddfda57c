//! `BileMo` CLI - Database migrations and fixtures.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! bilemo-cli migrate
//!
//! # Load demo customers, users and phones, printing each customer's token
//! bilemo-cli seed
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed database with demo data

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bilemo-cli")]
#[command(author, version, about = "BileMo API CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with demo data
    Seed {
        /// Number of customers to create
        #[arg(long, default_value_t = 3)]
        customers: usize,

        /// Number of phones to create
        #[arg(long, default_value_t = 31)]
        phones: usize,
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
        Commands::Seed { customers, phones } => {
            commands::seed::run(customers, phones).await?;
        }
    }
    Ok(())
}
