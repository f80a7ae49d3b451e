use chrono::Utc;

use super::schema::Database;
use super::types::{Article, ArticleRow, Category, NewArticle, StoreError};

impl Database {
    // ========================================================================
    // Article Operations
    // ========================================================================

    /// Check whether an article with this URL already exists.
    ///
    /// The URL is the sole dedup key; callers use this to skip classification
    /// work for articles already seen. The insert itself remains guarded by
    /// the UNIQUE constraint, so a race between this check and the insert is
    /// harmless.
    pub async fn article_url_exists(&self, url: &str) -> Result<bool, StoreError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM articles WHERE url = ?")
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Insert an article together with its category associations as one
    /// atomic unit. Returns the new article ID, or `None` when an article
    /// with the same URL already exists (first write wins — a lost race
    /// against a concurrent worker is a skip, not an error).
    pub async fn insert_article(
        &self,
        article: &NewArticle,
        category_ids: &[i64],
    ) -> Result<Option<i64>, StoreError> {
        let now = Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO articles
                (title, description, content, url, image_url, published, fetched, severity, source_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(url) DO NOTHING
        "#,
        )
        .bind(&article.title)
        .bind(&article.description)
        .bind(&article.content)
        .bind(&article.url)
        .bind(&article.image_url)
        .bind(article.published)
        .bind(now)
        .bind(article.severity.as_str())
        .bind(article.source_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let article_id = result.last_insert_rowid();
        for category_id in category_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO article_categories (article_id, category_id) VALUES (?, ?)",
            )
            .bind(article_id)
            .bind(category_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(article_id))
    }

    /// Look up an article by URL.
    pub async fn article_by_url(&self, url: &str) -> Result<Option<Article>, StoreError> {
        let row = sqlx::query_as::<_, ArticleRow>(
            r#"
            SELECT id, title, description, content, url, image_url,
                   published, fetched, severity, source_id
            FROM articles
            WHERE url = ?
        "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ArticleRow::into_article))
    }

    /// Categories associated with an article, in slug order.
    pub async fn categories_for_article(
        &self,
        article_id: i64,
    ) -> Result<Vec<Category>, StoreError> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT c.id, c.name, c.slug, c.description, c.color
            FROM categories c
            JOIN article_categories ac ON ac.category_id = c.id
            WHERE ac.article_id = ?
            ORDER BY c.slug
        "#,
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Bulk-delete articles whose fetched timestamp is before `cutoff`
    /// (unix seconds). Returns the number of rows deleted. Category
    /// associations go with them via ON DELETE CASCADE.
    pub async fn prune_articles_before(&self, cutoff: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM articles WHERE fetched < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Total number of stored articles.
    pub async fn count_articles(&self) -> Result<i64, StoreError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}
