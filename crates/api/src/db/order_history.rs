//! Order status timeline repository.

use sqlx::PgPool;

use food_app_core::{OrderHistoryId, OrderId};

use super::{RepositoryError, SearchKeyword, map_write_error, soft_delete};
use crate::models::order::{NewOrderHistoryEntry, OrderHistoryEntry, OrderHistoryUpdate};

const HISTORY_COLUMNS: &str = "id, order_id, status, note, created_at, hidden";

pub struct OrderHistoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderHistoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<OrderHistoryEntry>, RepositoryError> {
        let sql = format!(
            "SELECT {HISTORY_COLUMNS} FROM food.order_history WHERE hidden = FALSE ORDER BY id"
        );
        Ok(sqlx::query_as::<_, OrderHistoryEntry>(&sql)
            .fetch_all(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderHistoryId) -> Result<Option<OrderHistoryEntry>, RepositoryError> {
        let sql = format!(
            "SELECT {HISTORY_COLUMNS} FROM food.order_history WHERE id = $1 AND hidden = FALSE"
        );
        Ok(sqlx::query_as::<_, OrderHistoryEntry>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// The timeline of one order, oldest entry first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn by_order(&self, order_id: OrderId) -> Result<Vec<OrderHistoryEntry>, RepositoryError> {
        let sql = format!(
            "SELECT {HISTORY_COLUMNS} FROM food.order_history \
             WHERE order_id = $1 AND hidden = FALSE \
             ORDER BY created_at, id"
        );
        Ok(sqlx::query_as::<_, OrderHistoryEntry>(&sql)
            .bind(order_id)
            .fetch_all(self.pool)
            .await?)
    }

    /// Entries whose id or note contains the keyword.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(
        &self,
        keyword: &SearchKeyword,
    ) -> Result<Vec<OrderHistoryEntry>, RepositoryError> {
        let sql = format!(
            "SELECT {HISTORY_COLUMNS} FROM food.order_history \
             WHERE hidden = FALSE AND (id::text ILIKE $1 OR note ILIKE $1) \
             ORDER BY id"
        );
        Ok(sqlx::query_as::<_, OrderHistoryEntry>(&sql)
            .bind(keyword.pattern())
            .fetch_all(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order does not exist.
    pub async fn create(
        &self,
        entry: &NewOrderHistoryEntry,
    ) -> Result<OrderHistoryEntry, RepositoryError> {
        let sql = format!(
            "INSERT INTO food.order_history (order_id, status, note) VALUES ($1, $2, $3) \
             RETURNING {HISTORY_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, OrderHistoryEntry>(&sql)
            .bind(entry.order_id)
            .bind(entry.status)
            .bind(&entry.note)
            .fetch_one(self.pool)
            .await
            .map_err(map_write_error)?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry does not exist.
    pub async fn update(
        &self,
        id: OrderHistoryId,
        changes: &OrderHistoryUpdate,
    ) -> Result<OrderHistoryEntry, RepositoryError> {
        let sql = format!(
            "UPDATE food.order_history SET \
                 status = COALESCE($2, status), \
                 note = COALESCE($3, note) \
             WHERE id = $1 AND hidden = FALSE \
             RETURNING {HISTORY_COLUMNS}"
        );
        sqlx::query_as::<_, OrderHistoryEntry>(&sql)
            .bind(id)
            .bind(changes.status)
            .bind(&changes.note)
            .fetch_optional(self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry does not exist.
    pub async fn delete(&self, id: OrderHistoryId) -> Result<(), RepositoryError> {
        soft_delete(self.pool, "food.order_history", id.as_i32()).await
    }
}
