//! Food App CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! food-cli migrate
//!
//! # Create the first admin account
//! food-cli user create-admin -u admin -p 'S3cure-pass' -n "Shop Admin" --phone 0901234567
//!
//! # Insert categories, payment methods and promotion types
//! food-cli seed reference-data --file crates/cli/data/reference-data.yaml
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create-admin` - Create an Admin account
//! - `seed reference-data` - Insert missing reference rows from YAML

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "food-cli")]
#[command(author, version, about = "Food App CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new Admin user
    CreateAdmin {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Plain-text password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Phone number
        #[arg(long)]
        phone: String,

        /// Email address
        #[arg(short, long)]
        email: Option<String>,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Categories, payment methods and promotion types
    ReferenceData {
        /// Path to the YAML file
        #[arg(short, long, default_value = "crates/cli/data/reference-data.yaml")]
        file: String,
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
        Commands::User { action } => match action {
            UserAction::CreateAdmin {
                username,
                password,
                name,
                phone,
                email,
            } => {
                let account = commands::user::AdminAccount {
                    username: &username,
                    password: &password,
                    name: &name,
                    phone: &phone,
                    email: email.as_deref(),
                };
                commands::user::create_admin(&account).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::ReferenceData { file } => commands::seed::reference_data(&file).await?,
        },
    }
    Ok(())
}
