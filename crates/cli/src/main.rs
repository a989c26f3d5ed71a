//! TechMart CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! tm-cli migrate
//!
//! # Insert the sample catalog
//! tm-cli seed
//!
//! # Create an admin user
//! tm-cli admin create -e admin@example.com -n "Admin Name" -p 'long password'
//! ```
//!
//! All commands read `DATABASE_URL` (a `.env` file is honoured).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tm-cli")]
#[command(author, version, about = "TechMart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert the sample product catalog
    Seed {
        /// Add missing sample products even if the catalog is not empty
        #[arg(long)]
        force: bool,
    },
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin password
        #[arg(short, long)]
        password: String,
    },
    /// Grant admin rights to an existing user
    Promote {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
    /// Revoke admin rights
    Demote {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
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
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed { force } => commands::seed::run(force).await,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => commands::admin::create(&email, &name, &password).await,
            AdminAction::Promote { email } => commands::admin::toggle(&email, true).await,
            AdminAction::Demote { email } => commands::admin::toggle(&email, false).await,
        },
    }
}
