//! Order repository.

use sqlx::PgPool;
use tracing::instrument;

use food_app_core::{OrderId, UserId};

use super::{RepositoryError, SearchKeyword, map_write_error, soft_delete};
use crate::models::order::{NewOrder, Order, OrderUpdate};

const ORDER_SELECT: &str = "SELECT o.id, o.user_id, o.payment_method_id, o.address_id, o.total, \
                                   o.status, o.created_at, o.updated_at, o.hidden, \
                                   u.name AS user_name, \
                                   pm.name AS payment_method_name, \
                                   a.name AS address_name \
                            FROM food.customer_order o \
                            JOIN food.app_user u ON u.id = o.user_id \
                            LEFT JOIN food.payment_method pm ON pm.id = o.payment_method_id \
                            LEFT JOIN food.address a ON a.id = o.address_id";

/// Repository for customer orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all visible orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!("{ORDER_SELECT} WHERE o.hidden = FALSE ORDER BY o.id");
        Ok(sqlx::query_as::<_, Order>(&sql)
            .fetch_all(self.pool)
            .await?)
    }

    /// Get a visible order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("{ORDER_SELECT} WHERE o.id = $1 AND o.hidden = FALSE");
        Ok(sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// A user's visible orders, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn by_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!("{ORDER_SELECT} WHERE o.user_id = $1 AND o.hidden = FALSE ORDER BY o.id");
        Ok(sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?)
    }

    /// Orders whose id contains the keyword.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, keyword: &SearchKeyword) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "{ORDER_SELECT} WHERE o.hidden = FALSE AND o.id::text ILIKE $1 ORDER BY o.id"
        );
        Ok(sqlx::query_as::<_, Order>(&sql)
            .bind(keyword.pattern())
            .fetch_all(self.pool)
            .await?)
    }

    /// Create an order. The total is stored as given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a referenced user, payment
    /// method or address does not exist.
    #[instrument(skip(self, order), fields(user_id = %order.user_id))]
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let (id,): (OrderId,) = sqlx::query_as(
            "INSERT INTO food.customer_order (user_id, payment_method_id, address_id, total, status) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(order.user_id)
        .bind(order.payment_method_id)
        .bind(order.address_id)
        .bind(order.total)
        .bind(order.status)
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Apply changes to a visible order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: OrderId, changes: &OrderUpdate) -> Result<Order, RepositoryError> {
        let updated: Option<(OrderId,)> = sqlx::query_as(
            "UPDATE food.customer_order SET \
                 user_id = COALESCE($2, user_id), \
                 payment_method_id = COALESCE($3, payment_method_id), \
                 address_id = COALESCE($4, address_id), \
                 total = COALESCE($5, total), \
                 status = COALESCE($6, status), \
                 updated_at = now() \
             WHERE id = $1 AND hidden = FALSE \
             RETURNING id",
        )
        .bind(id)
        .bind(changes.user_id)
        .bind(changes.payment_method_id)
        .bind(changes.address_id)
        .bind(changes.total)
        .bind(changes.status)
        .fetch_optional(self.pool)
        .await
        .map_err(map_write_error)?;

        let (id,) = updated.ok_or(RepositoryError::NotFound)?;
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Hide an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        soft_delete(self.pool, "food.customer_order", id.as_i32()).await
    }
}
