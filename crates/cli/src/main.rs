//! Salon Shop CLI - database migrations and maintenance jobs.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! salon-cli migrate
//!
//! # List appointments due a reminder without sending anything
//! salon-cli reminders send --dry-run
//!
//! # Send appointment reminders (same job as the cron endpoint)
//! salon-cli reminders send
//!
//! # Load shipping zones, services, stylists and FAQs from YAML
//! salon-cli seed catalog seed/catalog.yaml
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "salon-cli")]
#[command(author, version, about = "Salon Shop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Appointment reminder job
    Reminders {
        #[command(subcommand)]
        action: RemindersAction,
    },
    /// Load reference data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum RemindersAction {
    /// Send reminders for appointments inside the lookahead window
    Send {
        /// List due appointments without sending or stamping anything
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Shipping zones, services, stylists and FAQs from a YAML file
    Catalog {
        /// Path to the YAML file
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
        Commands::Reminders { action } => match action {
            RemindersAction::Send { dry_run } => commands::reminders::send(dry_run).await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file } => commands::seed::catalog(&file).await?,
        },
    }
    Ok(())
}
