//! Pepsa CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! pepsa-cli migrate
//!
//! # Create a demo customer account
//! pepsa-cli seed customer -e demo@example.com -n "Demo Customer" -p +2348012345678
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed customer` - Create a customer account for local development

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pepsa-cli")]
#[command(author, version, about = "Pepsa CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Seed the database with development data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Create a customer account
    Customer {
        /// Customer email address
        #[arg(short, long)]
        email: String,

        /// Customer display name
        #[arg(short, long)]
        name: String,

        /// Full phone number including dialling code
        #[arg(short, long)]
        phone: String,

        /// Password (defaults to a development password)
        #[arg(long, default_value = "pepsa-dev")]
        password: String,
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
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Customer {
                email,
                name,
                phone,
                password,
            } => {
                commands::seed::customer(&email, &name, &phone, &password).await?;
            }
        },
    }
    Ok(())
}
