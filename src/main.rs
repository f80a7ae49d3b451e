use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};

use cybernews::aggregator::Aggregator;
use cybernews::config::Config;
use cybernews::storage::Database;

/// Default config location: ~/.config/cybernews/config.toml
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("cybernews")
        .join("config.toml"))
}

#[derive(Parser, Debug)]
#[command(name = "cybernews", about = "Security news feed aggregator")]
struct Args {
    /// Path to the config file (default: ~/.config/cybernews/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the database path from the config file
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seed configured sources and the category taxonomy (idempotent)
    Init,
    /// Fetch all active feeds and ingest new articles
    Refresh,
    /// Delete articles fetched more than N days ago
    Prune {
        #[arg(long, default_value_t = 30)]
        days: i64,
    },
    /// List configured sources and their fetch state
    Sources {
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let mut config = Config::load(&config_path)?;
    if let Some(db_path) = &args.db {
        config.db_path = db_path.to_string_lossy().to_string();
    }

    let db = Database::open(&config.db_path)
        .await
        .with_context(|| format!("Failed to open database at {}", config.db_path))?;
    let aggregator = Aggregator::new(db.clone(), config)?;

    match args.command {
        Command::Init => {
            aggregator.initialize_sources().await?;
            println!("Sources and categories initialized.");
        }
        Command::Refresh => {
            // Seeding is idempotent, so every refresh run is self-contained
            aggregator.initialize_sources().await?;
            let inserted = aggregator.refresh().await?;
            println!("Ingested {} new articles", inserted);
        }
        Command::Prune { days } => {
            let deleted = aggregator.prune_older_than(days).await?;
            println!("Deleted {} articles older than {} days", deleted, days);
        }
        Command::Sources { json } => {
            let sources = db.all_sources().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sources)?);
            } else {
                for source in sources {
                    let last_fetched = source
                        .last_fetched
                        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
                        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "never".to_string());
                    let state = if source.active { "active" } else { "inactive" };
                    println!(
                        "[{}] {} ({}) last fetched: {}",
                        state, source.name, source.feed_url, last_fetched
                    );
                }
            }
        }
    }

    Ok(())
}
