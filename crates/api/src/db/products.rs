//! Product repository.

use sqlx::PgPool;
use tracing::instrument;

use food_app_core::ProductId;

use super::{RepositoryError, SearchKeyword, map_write_error, soft_delete};
use crate::models::product::{NewProduct, Product, ProductChanges};

const PRODUCT_SELECT: &str = "SELECT p.id, p.category_id, p.supplier_id, p.name, p.description, \
                                     p.price, p.stock_quantity, p.status, p.images, \
                                     p.created_at, p.updated_at, p.hidden, \
                                     c.name AS category_name, s.name AS supplier_name \
                              FROM food.product p \
                              LEFT JOIN food.category c ON c.id = p.category_id \
                              LEFT JOIN food.supplier s ON s.id = p.supplier_id";

/// Repository for catalog products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all visible products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.hidden = FALSE ORDER BY p.id");
        Ok(sqlx::query_as::<_, Product>(&sql)
            .fetch_all(self.pool)
            .await?)
    }

    /// Get a visible product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.id = $1 AND p.hidden = FALSE");
        Ok(sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Search by name or description.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, keyword: &SearchKeyword) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "{PRODUCT_SELECT} \
             WHERE p.hidden = FALSE AND (p.name ILIKE $1 OR p.description ILIKE $1) \
             ORDER BY p.id"
        );
        Ok(sqlx::query_as::<_, Product>(&sql)
            .bind(keyword.pattern())
            .fetch_all(self.pool)
            .await?)
    }

    /// Whether a visible product with this id exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM food.product WHERE id = $1 AND hidden = FALSE)",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the category or supplier does not exist.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let (id,): (ProductId,) = sqlx::query_as(
            "INSERT INTO food.product \
                 (category_id, supplier_id, name, description, price, stock_quantity, status, images) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id",
        )
        .bind(product.category_id)
        .bind(product.supplier_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock_quantity)
        .bind(product.status)
        .bind(&product.images)
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Apply changes to a visible product. `images`, when present, replaces
    /// the stored set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if the category or supplier does not exist.
    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, RepositoryError> {
        let updated: Option<(ProductId,)> = sqlx::query_as(
            "UPDATE food.product SET \
                 category_id = COALESCE($2, category_id), \
                 supplier_id = COALESCE($3, supplier_id), \
                 name = COALESCE($4, name), \
                 description = COALESCE($5, description), \
                 price = COALESCE($6, price), \
                 stock_quantity = COALESCE($7, stock_quantity), \
                 status = COALESCE($8, status), \
                 images = COALESCE($9, images), \
                 updated_at = now() \
             WHERE id = $1 AND hidden = FALSE \
             RETURNING id",
        )
        .bind(id)
        .bind(changes.category_id)
        .bind(changes.supplier_id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.price)
        .bind(changes.stock_quantity)
        .bind(changes.status)
        .bind(&changes.images)
        .fetch_optional(self.pool)
        .await
        .map_err(map_write_error)?;

        let (id,) = updated.ok_or(RepositoryError::NotFound)?;
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Hide a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        soft_delete(self.pool, "food.product", id.as_i32()).await
    }
}
