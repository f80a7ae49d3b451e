//! Aggregation orchestrator.
//!
//! Drives one ingestion cycle over the configured sources: fetch each
//! active feed, classify every new entry, and persist it with its category
//! associations. Source failures are isolated — a dead feed contributes
//! zero articles and the cycle moves on. Storage failures are fatal for
//! the cycle and propagate to the caller.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use url::Url;

use crate::classify::{classify_categories, classify_severity, FALLBACK_CATEGORY};
use crate::config::Config;
use crate::feed::{build_client, fetch_articles};
use crate::storage::{Database, NewArticle, NewSource, Source, StoreError};

/// Category taxonomy seeded at initialization: name, slug, display color.
const DEFAULT_CATEGORIES: &[(&str, &str, &str)] = &[
    ("Vulnerabilities", "vulnerabilities", "#FF6B6B"),
    ("Data Breaches", "data-breaches", "#FFA500"),
    ("Malware", "malware", "#9B59B6"),
    ("Security Tools", "security-tools", "#3498DB"),
    ("Best Practices", "best-practices", "#2ECC71"),
    ("Threats", "threats", "#E74C3C"),
    ("General", "general", "#95A5A6"),
];

pub struct Aggregator {
    db: Database,
    client: reqwest::Client,
    config: Config,
}

impl Aggregator {
    /// Create an orchestrator over an open database and an immutable
    /// configuration value. The HTTP client is shared by all fetch workers.
    pub fn new(db: Database, config: Config) -> Result<Self> {
        let client = build_client().context("Failed to build HTTP client")?;
        Ok(Self { db, client, config })
    }

    /// Seed configured sources and the fixed category taxonomy.
    ///
    /// Idempotent by feed URL and category slug — safe to call on every
    /// process start. A feed URL appearing under two configured names is a
    /// configuration error and is rejected before anything is written.
    pub async fn initialize_sources(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for def in &self.config.feeds {
            Url::parse(&def.feed_url)
                .with_context(|| format!("Invalid feed URL in configuration: {}", def.feed_url))?;
            if !seen.insert(def.feed_url.as_str()) {
                bail!(
                    "Feed URL configured more than once: {} (second entry: {})",
                    def.feed_url,
                    def.name
                );
            }
        }

        let mut new_sources = 0;
        for def in &self.config.feeds {
            if self.db.source_by_feed_url(&def.feed_url).await?.is_some() {
                continue;
            }
            tracing::debug!(source = %def.name, hint = %def.category_hint, "Seeding source");
            self.db
                .insert_source(&NewSource {
                    name: def.name.clone(),
                    url: def.feed_url.clone(),
                    feed_url: def.feed_url.clone(),
                    description: Some(format!("RSS feed from {}", def.name)),
                })
                .await?;
            new_sources += 1;
        }

        let mut new_categories = 0;
        for (name, slug, color) in DEFAULT_CATEGORIES {
            if self.db.category_by_slug(slug).await?.is_some() {
                continue;
            }
            self.db.insert_category(name, slug, Some(color)).await?;
            new_categories += 1;
        }

        tracing::info!(
            sources = new_sources,
            categories = new_categories,
            "Initialization complete"
        );
        Ok(())
    }

    /// Run one refresh cycle over all active sources.
    ///
    /// Sources are fetched through a bounded concurrent pool; each source's
    /// articles are persisted and its last-fetched stamp committed before
    /// its worker finishes, so an abandoned cycle leaves no partial source.
    /// Returns the total count of newly inserted articles.
    pub async fn refresh(&self) -> Result<usize> {
        let sources = self.db.active_sources().await?;
        if sources.is_empty() {
            tracing::info!("No active sources to refresh");
            return Ok(0);
        }

        let results: Vec<Result<usize, StoreError>> = stream::iter(sources)
            .map(|source| self.refresh_source(source))
            .buffer_unordered(self.config.max_concurrent_fetches)
            .collect()
            .await;

        let mut inserted = 0;
        for result in results {
            inserted += result?;
        }

        tracing::info!(inserted, "Refresh cycle complete");
        Ok(inserted)
    }

    /// Fetch and persist one source. Fetch failures are logged and yield
    /// zero articles without stamping last_fetched (the source is retried
    /// next cycle); storage failures propagate.
    async fn refresh_source(&self, source: Source) -> Result<usize, StoreError> {
        let timeout = Duration::from_secs(self.config.fetch_timeout_secs);
        let raw_articles = match fetch_articles(
            &self.client,
            &source.feed_url,
            timeout,
            self.config.max_feed_bytes,
        )
        .await
        {
            Ok(articles) => articles,
            Err(e) => {
                tracing::warn!(
                    source = %source.name,
                    feed = %source.feed_url,
                    error = %e,
                    "Feed fetch failed, skipping source this cycle"
                );
                return Ok(0);
            }
        };

        let mut inserted = 0;
        for raw in raw_articles {
            if self.db.article_url_exists(&raw.url).await? {
                continue;
            }

            let text = match &raw.description {
                Some(description) => format!("{} {}", raw.title, description),
                None => raw.title.clone(),
            };
            let severity = classify_severity(&text);
            let category_ids = self.resolve_category_ids(&text).await?;

            let article = NewArticle {
                title: raw.title,
                description: raw.description,
                content: raw.content,
                url: raw.url,
                image_url: raw.image_url,
                published: raw.published.timestamp(),
                severity,
                source_id: source.id,
            };

            match self.db.insert_article(&article, &category_ids).await? {
                Some(_) => inserted += 1,
                // Lost the race against a concurrent worker; first write wins
                None => tracing::debug!(url = %article.url, "Article already stored, skipping"),
            }
        }

        self.db.mark_source_fetched(source.id).await?;
        tracing::info!(source = %source.name, inserted, "Refreshed source");
        Ok(inserted)
    }

    /// Resolve matched category slugs to storage IDs. Slugs absent from
    /// storage are dropped; an empty result falls back to `general` when
    /// that category exists.
    async fn resolve_category_ids(&self, text: &str) -> Result<Vec<i64>, StoreError> {
        let mut ids = Vec::new();
        for slug in classify_categories(text) {
            match self.db.category_by_slug(slug).await? {
                Some(category) => ids.push(category.id),
                None => tracing::debug!(slug, "Matched category not in storage, dropping"),
            }
        }

        if ids.is_empty() {
            if let Some(general) = self.db.category_by_slug(FALLBACK_CATEGORY).await? {
                ids.push(general.id);
            }
        }

        Ok(ids)
    }

    /// Delete all articles fetched more than `days` days ago. Returns the
    /// number deleted.
    pub async fn prune_older_than(&self, days: i64) -> Result<u64> {
        let cutoff = Utc::now().timestamp() - days * 86_400;
        let deleted = self.db.prune_articles_before(cutoff).await?;
        tracing::info!(days, deleted, "Pruned stale articles");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedDefinition;

    fn feed_def(name: &str, url: &str) -> FeedDefinition {
        FeedDefinition {
            name: name.to_string(),
            feed_url: url.to_string(),
            category_hint: "general".to_string(),
        }
    }

    fn test_config(feeds: Vec<FeedDefinition>) -> Config {
        Config {
            feeds,
            ..Config::default()
        }
    }

    async fn test_aggregator(feeds: Vec<FeedDefinition>) -> (Aggregator, Database) {
        let db = Database::open(":memory:").await.unwrap();
        let aggregator = Aggregator::new(db.clone(), test_config(feeds)).unwrap();
        (aggregator, db)
    }

    #[tokio::test]
    async fn test_initialize_seeds_sources_and_categories() {
        let (aggregator, db) = test_aggregator(vec![
            feed_def("Feed A", "https://a.example.com/rss"),
            feed_def("Feed B", "https://b.example.com/rss"),
        ])
        .await;

        aggregator.initialize_sources().await.unwrap();

        assert_eq!(db.all_sources().await.unwrap().len(), 2);
        assert_eq!(db.all_categories().await.unwrap().len(), 7);
        assert!(db.category_by_slug("general").await.unwrap().is_some());

        let source = db
            .source_by_feed_url("https://a.example.com/rss")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(source.description.as_deref(), Some("RSS feed from Feed A"));
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let (aggregator, db) =
            test_aggregator(vec![feed_def("Feed A", "https://a.example.com/rss")]).await;

        aggregator.initialize_sources().await.unwrap();
        aggregator.initialize_sources().await.unwrap();

        assert_eq!(db.all_sources().await.unwrap().len(), 1);
        assert_eq!(db.all_categories().await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_initialize_rejects_duplicate_feed_url() {
        let (aggregator, db) = test_aggregator(vec![
            feed_def("First Name", "https://same.example.com/rss"),
            feed_def("Second Name", "https://same.example.com/rss"),
        ])
        .await;

        let err = aggregator.initialize_sources().await.unwrap_err();
        assert!(err.to_string().contains("configured more than once"));
        // Rejected before anything was written
        assert!(db.all_sources().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_rejects_invalid_feed_url() {
        let (aggregator, _db) =
            test_aggregator(vec![feed_def("Broken", "not a url")]).await;

        let err = aggregator.initialize_sources().await.unwrap_err();
        assert!(err.to_string().contains("Invalid feed URL"));
    }

    #[tokio::test]
    async fn test_prune_on_empty_store() {
        let (aggregator, _db) = test_aggregator(vec![]).await;
        assert_eq!(aggregator.prune_older_than(30).await.unwrap(), 0);
    }
}
