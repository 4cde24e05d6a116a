//! # Outreach Tracker CLI (`tracker`)
//!
//! ## Usage
//!
//! ```bash
//! tracker --config ./config/tracker.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tracker init` | Create the SQLite database and run schema migrations |
//! | `tracker serve` | Start the HTTP API server |
//! | `tracker stats` | Print the statistics report |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use outreach_tracker::{config, migrate, server, stats};
use tracker_core::filter::EntryFilter;

/// Outreach Tracker CLI.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/tracker.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "tracker",
    about = "Outreach Tracker: record club outreach to companies and report on it",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/tracker.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the `entries` table with its
    /// indexes. Safe to run repeatedly.
    Init,

    /// Start the HTTP API server on `[server].bind`.
    Serve,

    /// Print the statistics report.
    Stats {
        /// Only entries of this club.
        #[arg(long)]
        club: Option<String>,

        /// Only entries of this member (exact name).
        #[arg(long)]
        member: Option<String>,

        /// Earliest entry date (YYYY-MM-DD, inclusive).
        #[arg(long)]
        start_date: Option<String>,

        /// Latest entry date (YYYY-MM-DD, inclusive).
        #[arg(long)]
        end_date: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Stats {
            club,
            member,
            start_date,
            end_date,
        } => {
            let filter = EntryFilter::new(club, member, start_date, end_date);
            stats::run_stats(&cfg, filter).await?;
        }
    }

    Ok(())
}
