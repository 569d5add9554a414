//! Order line repository.
//!
//! Lines are keyed by (order, product) and deleted outright.

use sqlx::PgPool;

use food_app_core::{OrderId, ProductId};

use super::{RepositoryError, SearchKeyword, map_write_error};
use crate::models::order::{NewOrderItem, OrderItem, OrderItemUpdate};

const ITEM_SELECT: &str = "SELECT i.order_id, i.product_id, i.quantity, i.note, \
                                  i.applied_promotion_id, p.name AS product_name \
                           FROM food.order_item i \
                           JOIN food.product p ON p.id = i.product_id";

pub struct OrderItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderItemRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<OrderItem>, RepositoryError> {
        let sql = format!("{ITEM_SELECT} ORDER BY i.order_id, i.product_id");
        Ok(sqlx::query_as::<_, OrderItem>(&sql)
            .fetch_all(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        order_id: OrderId,
        product_id: ProductId,
    ) -> Result<Option<OrderItem>, RepositoryError> {
        let sql = format!("{ITEM_SELECT} WHERE i.order_id = $1 AND i.product_id = $2");
        Ok(sqlx::query_as::<_, OrderItem>(&sql)
            .bind(order_id)
            .bind(product_id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Lines of one order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn by_order(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let sql = format!("{ITEM_SELECT} WHERE i.order_id = $1 ORDER BY i.product_id");
        Ok(sqlx::query_as::<_, OrderItem>(&sql)
            .bind(order_id)
            .fetch_all(self.pool)
            .await?)
    }

    /// Lines that include one product, across orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn by_product(&self, product_id: ProductId) -> Result<Vec<OrderItem>, RepositoryError> {
        let sql = format!("{ITEM_SELECT} WHERE i.product_id = $1 ORDER BY i.order_id");
        Ok(sqlx::query_as::<_, OrderItem>(&sql)
            .bind(product_id)
            .fetch_all(self.pool)
            .await?)
    }

    /// Search by note or product name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, keyword: &SearchKeyword) -> Result<Vec<OrderItem>, RepositoryError> {
        let sql = format!(
            "{ITEM_SELECT} WHERE i.note ILIKE $1 OR p.name ILIKE $1 \
             ORDER BY i.order_id, i.product_id"
        );
        Ok(sqlx::query_as::<_, OrderItem>(&sql)
            .bind(keyword.pattern())
            .fetch_all(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the line already exists or the
    /// order, product or promotion does not.
    pub async fn create(&self, item: &NewOrderItem) -> Result<OrderItem, RepositoryError> {
        sqlx::query(
            "INSERT INTO food.order_item \
                 (order_id, product_id, quantity, note, applied_promotion_id) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(item.order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(&item.note)
        .bind(item.applied_promotion_id)
        .execute(self.pool)
        .await
        .map_err(map_write_error)?;

        self.get(item.order_id, item.product_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not exist.
    pub async fn update(
        &self,
        order_id: OrderId,
        product_id: ProductId,
        changes: &OrderItemUpdate,
    ) -> Result<OrderItem, RepositoryError> {
        let result = sqlx::query(
            "UPDATE food.order_item SET \
                 quantity = COALESCE($3, quantity), \
                 note = COALESCE($4, note), \
                 applied_promotion_id = COALESCE($5, applied_promotion_id) \
             WHERE order_id = $1 AND product_id = $2",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(changes.quantity)
        .bind(&changes.note)
        .bind(changes.applied_promotion_id)
        .execute(self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get(order_id, product_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not exist.
    pub async fn delete(&self, order_id: OrderId, product_id: ProductId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM food.order_item WHERE order_id = $1 AND product_id = $2")
                .bind(order_id)
                .bind(product_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
