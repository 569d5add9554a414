//! Promotion/product link repository.
//!
//! Rows are keyed by (product, promotion) and deleted outright.

use sqlx::PgPool;

use food_app_core::{ProductId, PromotionId};

use super::{RepositoryError, SearchKeyword, map_write_error};
use crate::models::promotion::{NewPromotionProduct, PromotionProduct, PromotionProductUpdate};

const LINK_SELECT: &str = "SELECT pp.product_id, pp.promotion_id, pp.applicable_quantity, \
                                  p.name AS product_name, pr.name AS promotion_name \
                           FROM food.promotion_product pp \
                           JOIN food.product p ON p.id = pp.product_id \
                           JOIN food.promotion pr ON pr.id = pp.promotion_id";

pub struct PromotionProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PromotionProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<PromotionProduct>, RepositoryError> {
        let sql = format!("{LINK_SELECT} ORDER BY pp.product_id, pp.promotion_id");
        Ok(sqlx::query_as::<_, PromotionProduct>(&sql)
            .fetch_all(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        product_id: ProductId,
        promotion_id: PromotionId,
    ) -> Result<Option<PromotionProduct>, RepositoryError> {
        let sql = format!("{LINK_SELECT} WHERE pp.product_id = $1 AND pp.promotion_id = $2");
        Ok(sqlx::query_as::<_, PromotionProduct>(&sql)
            .bind(product_id)
            .bind(promotion_id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Products covered by one promotion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn by_promotion(
        &self,
        promotion_id: PromotionId,
    ) -> Result<Vec<PromotionProduct>, RepositoryError> {
        let sql = format!("{LINK_SELECT} WHERE pp.promotion_id = $1 ORDER BY pp.product_id");
        Ok(sqlx::query_as::<_, PromotionProduct>(&sql)
            .bind(promotion_id)
            .fetch_all(self.pool)
            .await?)
    }

    /// Promotions applying to one product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn by_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<PromotionProduct>, RepositoryError> {
        let sql = format!("{LINK_SELECT} WHERE pp.product_id = $1 ORDER BY pp.promotion_id");
        Ok(sqlx::query_as::<_, PromotionProduct>(&sql)
            .bind(product_id)
            .fetch_all(self.pool)
            .await?)
    }

    /// Search by product or promotion name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(
        &self,
        keyword: &SearchKeyword,
    ) -> Result<Vec<PromotionProduct>, RepositoryError> {
        let sql = format!(
            "{LINK_SELECT} WHERE p.name ILIKE $1 OR pr.name ILIKE $1 \
             ORDER BY pp.product_id, pp.promotion_id"
        );
        Ok(sqlx::query_as::<_, PromotionProduct>(&sql)
            .bind(keyword.pattern())
            .fetch_all(self.pool)
            .await?)
    }

    /// Link a product to a promotion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the pair already exists or
    /// either side does not.
    pub async fn create(
        &self,
        link: &NewPromotionProduct,
    ) -> Result<PromotionProduct, RepositoryError> {
        sqlx::query(
            "INSERT INTO food.promotion_product (product_id, promotion_id, applicable_quantity) \
             VALUES ($1, $2, $3)",
        )
        .bind(link.product_id)
        .bind(link.promotion_id)
        .bind(link.applicable_quantity)
        .execute(self.pool)
        .await
        .map_err(map_write_error)?;

        self.get(link.product_id, link.promotion_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the pair does not exist.
    pub async fn update(
        &self,
        product_id: ProductId,
        promotion_id: PromotionId,
        changes: &PromotionProductUpdate,
    ) -> Result<PromotionProduct, RepositoryError> {
        let result = sqlx::query(
            "UPDATE food.promotion_product SET \
                 applicable_quantity = COALESCE($3, applicable_quantity) \
             WHERE product_id = $1 AND promotion_id = $2",
        )
        .bind(product_id)
        .bind(promotion_id)
        .bind(changes.applicable_quantity)
        .execute(self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get(product_id, promotion_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Remove the link.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the pair does not exist.
    pub async fn delete(
        &self,
        product_id: ProductId,
        promotion_id: PromotionId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM food.promotion_product WHERE product_id = $1 AND promotion_id = $2",
        )
        .bind(product_id)
        .bind(promotion_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
