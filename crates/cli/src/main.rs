//! Crowe Logic CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! cl-cli migrate
//!
//! # Load the built-in sample catalog (or a YAML file) into PostgreSQL
//! cl-cli seed catalog
//! cl-cli seed catalog --file catalog.yaml
//!
//! # Refresh long-form product descriptions by SKU
//! cl-cli seed descriptions
//!
//! # Create admin user (password read from CL_ADMIN_PASSWORD)
//! cl-cli admin create -u alice
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Load catalog data
//! - `admin create` - Create admin users

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cl-cli")]
#[command(author, version, about = "Crowe Logic CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load catalog data into the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert ingredients, products, batches and documents; existing SKUs
    /// and batch codes are skipped
    Catalog {
        /// Catalog YAML file (defaults to the built-in sample catalog)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Overwrite product descriptions by SKU
    Descriptions {
        /// Catalog YAML file (defaults to the built-in sample catalog)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Environment variable holding the password
        #[arg(long, default_value = "CL_ADMIN_PASSWORD")]
        password_env: String,
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
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file } => commands::seed::catalog(file.as_deref()).await?,
            SeedTarget::Descriptions { file } => {
                commands::seed::descriptions(file.as_deref()).await?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::Create {
                username,
                password_env,
            } => {
                commands::admin::create_user(&username, &password_env).await?;
            }
        },
    }
    Ok(())
}
