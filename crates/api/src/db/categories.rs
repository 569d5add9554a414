//! Category repository.
//!
//! Reads attach each category's visible products, fetched in one extra query
//! for the whole page of categories.

use std::collections::HashMap;

use sqlx::PgPool;

use food_app_core::CategoryId;

use super::{RepositoryError, SearchKeyword, map_write_error, soft_delete};
use crate::models::catalog::{Category, CategoryUpdate, NewCategory, ProductSummary};

const CATEGORY_COLUMNS: &str = "id, name, description, hidden";

#[derive(sqlx::FromRow)]
struct CategoryProductRow {
    category_id: CategoryId,
    #[sqlx(flatten)]
    product: ProductSummary,
}

/// Repository for product categories.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List visible categories with their products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM food.category WHERE hidden = FALSE ORDER BY id"
        );
        let mut categories = sqlx::query_as::<_, Category>(&sql)
            .fetch_all(self.pool)
            .await?;

        self.attach_products(&mut categories).await?;
        Ok(categories)
    }

    /// Get a visible category with its products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let sql =
            format!("SELECT {CATEGORY_COLUMNS} FROM food.category WHERE id = $1 AND hidden = FALSE");
        let Some(mut category) = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        self.attach_products(std::slice::from_mut(&mut category)).await?;
        Ok(Some(category))
    }

    /// Search by name, or exact id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, keyword: &SearchKeyword) -> Result<Vec<Category>, RepositoryError> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM food.category \
             WHERE hidden = FALSE AND (name ILIKE $1 OR id::text = $2) \
             ORDER BY id"
        );
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(keyword.pattern())
            .bind(keyword.as_str())
            .fetch_all(self.pool)
            .await?)
    }

    /// Whether a visible category with this name exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists_by_name(&self, name: &str) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM food.category WHERE name = $1 AND hidden = FALSE)",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, category: &NewCategory) -> Result<Category, RepositoryError> {
        let sql = format!(
            "INSERT INTO food.category (name, description) VALUES ($1, $2) \
             RETURNING {CATEGORY_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(&category.name)
            .bind(&category.description)
            .fetch_one(self.pool)
            .await
            .map_err(map_write_error)?)
    }

    /// Apply changes to a visible category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    pub async fn update(
        &self,
        id: CategoryId,
        changes: &CategoryUpdate,
    ) -> Result<Category, RepositoryError> {
        let sql = format!(
            "UPDATE food.category SET \
                 name = COALESCE($2, name), \
                 description = COALESCE($3, description) \
             WHERE id = $1 AND hidden = FALSE \
             RETURNING {CATEGORY_COLUMNS}"
        );
        let mut category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.description)
            .fetch_optional(self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or(RepositoryError::NotFound)?;

        self.attach_products(std::slice::from_mut(&mut category)).await?;
        Ok(category)
    }

    /// Hide a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        soft_delete(self.pool, "food.category", id.as_i32()).await
    }

    async fn attach_products(&self, categories: &mut [Category]) -> Result<(), RepositoryError> {
        if categories.is_empty() {
            return Ok(());
        }

        let ids: Vec<i32> = categories.iter().map(|c| c.id.as_i32()).collect();
        let rows = sqlx::query_as::<_, CategoryProductRow>(
            "SELECT category_id, id, name, price, status FROM food.product \
             WHERE category_id = ANY($1) AND hidden = FALSE \
             ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_category: HashMap<CategoryId, Vec<ProductSummary>> = HashMap::new();
        for row in rows {
            by_category.entry(row.category_id).or_default().push(row.product);
        }
        for category in categories {
            category.products = by_category.remove(&category.id).unwrap_or_default();
        }

        Ok(())
    }
}
