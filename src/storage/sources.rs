use chrono::Utc;

use super::schema::Database;
use super::types::{NewSource, Source, StoreError};

impl Database {
    // ========================================================================
    // Source Operations
    // ========================================================================

    /// Insert a new source, returning its ID.
    ///
    /// Callers are expected to check [`source_by_feed_url`] first; a
    /// duplicate feed URL or name violates a UNIQUE constraint and errors.
    ///
    /// [`source_by_feed_url`]: Database::source_by_feed_url
    pub async fn insert_source(&self, source: &NewSource) -> Result<i64, StoreError> {
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO sources (name, url, feed_url, description)
            VALUES (?, ?, ?, ?)
            RETURNING id
        "#,
        )
        .bind(&source.name)
        .bind(&source.url)
        .bind(&source.feed_url)
        .bind(&source.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    /// Look up a source by its feed URL (the configured identity).
    pub async fn source_by_feed_url(&self, feed_url: &str) -> Result<Option<Source>, StoreError> {
        let source = sqlx::query_as::<_, Source>(
            r#"
            SELECT id, name, url, feed_url, description, active, last_fetched
            FROM sources
            WHERE feed_url = ?
        "#,
        )
        .bind(feed_url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(source)
    }

    /// All sources with the active flag set, in configuration (insertion) order.
    pub async fn active_sources(&self) -> Result<Vec<Source>, StoreError> {
        let sources = sqlx::query_as::<_, Source>(
            r#"
            SELECT id, name, url, feed_url, description, active, last_fetched
            FROM sources
            WHERE active = 1
            ORDER BY id
        "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sources)
    }

    /// All sources regardless of the active flag.
    pub async fn all_sources(&self) -> Result<Vec<Source>, StoreError> {
        let sources = sqlx::query_as::<_, Source>(
            r#"
            SELECT id, name, url, feed_url, description, active, last_fetched
            FROM sources
            ORDER BY id
        "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sources)
    }

    /// Toggle a source's active flag. Inactive sources are skipped by refresh.
    pub async fn set_source_active(&self, source_id: i64, active: bool) -> Result<(), StoreError> {
        sqlx::query("UPDATE sources SET active = ? WHERE id = ?")
            .bind(active)
            .bind(source_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Stamp a source's last_fetched with the current time.
    pub async fn mark_source_fetched(&self, source_id: i64) -> Result<(), StoreError> {
        let now = Utc::now().timestamp();
        sqlx::query("UPDATE sources SET last_fetched = ? WHERE id = ?")
            .bind(now)
            .bind(source_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
