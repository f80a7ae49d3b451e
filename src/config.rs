//! Configuration file parser for ~/.config/cybernews/config.toml.
//!
//! The config file is optional — a missing file yields `Config::default()`,
//! which carries the built-in list of security news feeds. Unknown keys are
//! silently ignored by serde, though we log a warning when the file contains
//! potential typos.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// One configured feed origin: display name, feed URL, and a topical hint.
///
/// The list is static for the process lifetime; sources are seeded from it
/// by `Aggregator::initialize_sources`. The hint is informational only —
/// article categories come from keyword classification, not from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedDefinition {
    pub name: String,
    pub feed_url: String,
    #[serde(default = "default_category_hint")]
    pub category_hint: String,
}

fn default_category_hint() -> String {
    "general".to_string()
}

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite database file.
    pub db_path: String,

    /// Per-request fetch timeout in seconds.
    pub fetch_timeout_secs: u64,

    /// Maximum number of feeds fetched concurrently during a refresh.
    pub max_concurrent_fetches: usize,

    /// Maximum accepted feed document size in bytes.
    pub max_feed_bytes: usize,

    /// Configured feed origins, seeded into storage at initialization.
    pub feeds: Vec<FeedDefinition>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "cybernews.db".to_string(),
            fetch_timeout_secs: 30,
            max_concurrent_fetches: 5,
            max_feed_bytes: 10 * 1024 * 1024,
            feeds: default_feeds(),
        }
    }
}

/// The built-in feed list, matching the sources the service ships with.
fn default_feeds() -> Vec<FeedDefinition> {
    const SEEDS: &[(&str, &str, &str)] = &[
        ("The Hacker News", "https://feeds.feedburner.com/TheHackersNews", "general"),
        ("SecurityWeek", "https://feeds.feedburner.com/Securityweek", "general"),
        ("Krebs on Security", "https://krebsonsecurity.com/feed/", "general"),
        ("ThreatPost", "https://threatpost.com/feed/", "threats"),
        ("Dark Reading", "https://www.darkreading.com/rss.xml", "general"),
        ("BleepingComputer", "https://www.bleepingcomputer.com/feed/", "general"),
        ("CISA Alerts", "https://www.cisa.gov/uscert/ncas/alerts.xml", "vulnerability"),
        ("Zero Day Initiative", "https://www.zerodayinitiative.com/rss/published/", "vulnerability"),
    ];

    SEEDS
        .iter()
        .map(|(name, feed_url, hint)| FeedDefinition {
            name: (*name).to_string(),
            feed_url: (*feed_url).to_string(),
            category_hint: (*hint).to_string(),
        })
        .collect()
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse the TOML content first as a raw table to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "db_path",
                "fetch_timeout_secs",
                "max_concurrent_fetches",
                "max_feed_bytes",
                "feeds",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            feeds = config.feeds.len(),
            "Loaded configuration"
        );
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================
