//! Punchlist CLI - Database migrations and account management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! punchlist-cli migrate
//!
//! # Create a user
//! punchlist-cli user create -u alice -p "correct horse battery"
//!
//! # Set (or reset) a user's password
//! punchlist-cli user set-password -u alice -p "new password here"
//!
//! # Remove expired sessions
//! punchlist-cli sessions purge
//! ```
//!
//! The database URL comes from `PUNCHLIST_DATABASE_URL` (or `.env`), the
//! same as the server.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "punchlist-cli")]
#[command(author, version, about = "Punchlist CLI tools")]
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
    /// Manage sessions
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new local-password user
    Create {
        /// Username (3-30 chars, letters/digits/underscore)
        #[arg(short, long)]
        username: String,

        /// Password (8-128 chars)
        #[arg(short, long)]
        password: String,

        /// Optional display name
        #[arg(short, long)]
        display_name: Option<String>,
    },
    /// Set (or reset) a user's password
    SetPassword {
        /// Username
        #[arg(short, long)]
        username: String,

        /// New password (8-128 chars)
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Delete expired sessions
    Purge,
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
                username,
                password,
                display_name,
            } => {
                commands::user::create(&username, &password, display_name.as_deref()).await?;
            }
            UserAction::SetPassword { username, password } => {
                commands::user::set_password(&username, &password).await?;
            }
        },
        Commands::Sessions { action } => match action {
            SessionAction::Purge => commands::sessions::purge().await?,
        },
    }
    Ok(())
}
