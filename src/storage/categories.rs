use super::schema::Database;
use super::types::{Category, StoreError};

impl Database {
    // ========================================================================
    // Category Operations
    // ========================================================================

    /// Insert a new category, returning its ID.
    ///
    /// Name and slug are UNIQUE; callers seed idempotently by checking
    /// [`category_by_slug`] first.
    ///
    /// [`category_by_slug`]: Database::category_by_slug
    pub async fn insert_category(
        &self,
        name: &str,
        slug: &str,
        color: Option<&str>,
    ) -> Result<i64, StoreError> {
        let row: (i64,) = sqlx::query_as(
            "INSERT INTO categories (name, slug, color) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(slug)
        .bind(color)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    /// Look up a category by its slug.
    pub async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, slug, description, color FROM categories WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// All categories in slug order.
    pub async fn all_categories(&self) -> Result<Vec<Category>, StoreError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, slug, description, color FROM categories ORDER BY slug",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}
