use thiserror::Error;

use crate::classify::Severity;

// ============================================================================
// Error Types
// ============================================================================

/// Storage-layer errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Schema migration failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

// ============================================================================
// Data Structures
// ============================================================================

/// A configured feed origin as stored.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Source {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub feed_url: String,
    pub description: Option<String>,
    pub active: bool,
    /// Unix seconds of the last completed fetch, `None` before the first.
    pub last_fetched: Option<i64>,
}

/// Insert payload for a new source.
#[derive(Debug, Clone)]
pub struct NewSource {
    pub name: String,
    pub url: String,
    pub feed_url: String,
    pub description: Option<String>,
}

/// A topical tag with a stable slug and a display color.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

/// A persisted article.
#[derive(Debug, Clone)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    /// Unix seconds; the feed's published/updated time, or ingestion time
    /// when the feed supplied neither.
    pub published: i64,
    /// Unix seconds of ingestion.
    pub fetched: i64,
    pub severity: Severity,
    pub source_id: i64,
}

/// Insert payload for a new article. `fetched` is stamped at insert time.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub published: i64,
    pub severity: Severity,
    pub source_id: i64,
}

/// Internal row type for article queries; severity is stored as TEXT.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ArticleRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub published: i64,
    pub fetched: i64,
    pub severity: String,
    pub source_id: i64,
}

impl ArticleRow {
    pub(crate) fn into_article(self) -> Article {
        Article {
            id: self.id,
            title: self.title,
            description: self.description,
            content: self.content,
            url: self.url,
            image_url: self.image_url,
            published: self.published,
            fetched: self.fetched,
            severity: Severity::from_db(&self.severity),
            source_id: self.source_id,
        }
    }
}
