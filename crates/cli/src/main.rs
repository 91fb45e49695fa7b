//! Stock Home CLI - database migrations, accounts and demo data.
//!
//! # Usage
//!
//! ```bash
//! # Apply schema migrations and create the session table
//! sh-cli migrate
//!
//! # Create an account (the password is read from STOCK_HOME_USER_PASSWORD if omitted)
//! sh-cli user create -e rani@email.com -n "Rani" --verified
//!
//! # Mark an email as confirmed
//! sh-cli user confirm -e rani@email.com
//!
//! # Load demo users, houses, stock and shopping entries
//! sh-cli seed demos/seed.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `STOCK_HOME_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sh-cli")]
#[command(author, version, about = "Stock Home CLI tools")]
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
    /// Seed the database with demo data from a YAML file
    Seed {
        /// Path to the seed file
        #[arg(default_value = "demos/seed.yaml")]
        file: String,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new account
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Password (defaults to `STOCK_HOME_USER_PASSWORD`)
        #[arg(short, long)]
        password: Option<String>,

        /// Mark the email as confirmed right away
        #[arg(long)]
        verified: bool,
    },
    /// Mark an account's email as confirmed
    Confirm {
        /// Email address
        #[arg(short, long)]
        email: String,
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
            UserAction::Create {
                email,
                name,
                password,
                verified,
            } => {
                commands::user::create(&email, &name, password, verified).await?;
            }
            UserAction::Confirm { email } => commands::user::confirm(&email).await?,
        },
        Commands::Seed { file } => commands::seed::run(&file).await?,
    }
    Ok(())
}
