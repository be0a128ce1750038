//! Pet Buddy CLI - Operator tools for the document store.
//!
//! # Usage
//!
//! ```bash
//! # Grant the admin role to an existing user
//! pb-cli admin promote -e owner@example.com
//!
//! # Clear the admin role
//! pb-cli admin demote -e owner@example.com
//!
//! # Create secondary indexes
//! pb-cli indexes create
//!
//! # Check store connectivity
//! pb-cli ping
//! ```
//!
//! Reads the same store variables as the server (`MONGODB_URI` or
//! `DB_USER` / `DB_PASS`, plus `DB_NAME`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pb-cli")]
#[command(author, version, about = "Pet Buddy operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage admin roles
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Manage secondary indexes
    Indexes {
        #[command(subcommand)]
        action: IndexAction,
    },
    /// Verify the store is reachable
    Ping,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Grant the admin role to an existing user
    Promote {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
    /// Clear the admin role of an existing user
    Demote {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum IndexAction {
    /// Create the secondary indexes used by listings and dashboards
    Create,
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
    let db = commands::open_store().await?;
    match cli.command {
        Commands::Admin { action } => match action {
            AdminAction::Promote { email } => commands::admin::promote(&db, &email).await?,
            AdminAction::Demote { email } => commands::admin::demote(&db, &email).await?,
        },
        Commands::Indexes {
            action: IndexAction::Create,
        } => commands::indexes::create(&db).await?,
        Commands::Ping => commands::ping(&db).await?,
    }
    Ok(())
}
