//! Payment method repository.

use sqlx::PgPool;

use food_app_core::PaymentMethodId;

use super::{RepositoryError, SearchKeyword, map_write_error, soft_delete};
use crate::models::catalog::{NewPaymentMethod, PaymentMethod, PaymentMethodUpdate};

const PAYMENT_METHOD_COLUMNS: &str = "id, name, description, hidden";

pub struct PaymentMethodRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentMethodRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<PaymentMethod>, RepositoryError> {
        let sql = format!(
            "SELECT {PAYMENT_METHOD_COLUMNS} FROM food.payment_method \
             WHERE hidden = FALSE ORDER BY id"
        );
        Ok(sqlx::query_as::<_, PaymentMethod>(&sql)
            .fetch_all(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PaymentMethodId) -> Result<Option<PaymentMethod>, RepositoryError> {
        let sql = format!(
            "SELECT {PAYMENT_METHOD_COLUMNS} FROM food.payment_method \
             WHERE id = $1 AND hidden = FALSE"
        );
        Ok(sqlx::query_as::<_, PaymentMethod>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Search by name, or exact id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(
        &self,
        keyword: &SearchKeyword,
    ) -> Result<Vec<PaymentMethod>, RepositoryError> {
        let sql = format!(
            "SELECT {PAYMENT_METHOD_COLUMNS} FROM food.payment_method \
             WHERE hidden = FALSE AND (name ILIKE $1 OR id::text = $2) \
             ORDER BY id"
        );
        Ok(sqlx::query_as::<_, PaymentMethod>(&sql)
            .bind(keyword.pattern())
            .bind(keyword.as_str())
            .fetch_all(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists_by_name(&self, name: &str) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM food.payment_method WHERE name = $1 AND hidden = FALSE)",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, method: &NewPaymentMethod) -> Result<PaymentMethod, RepositoryError> {
        let sql = format!(
            "INSERT INTO food.payment_method (name, description) VALUES ($1, $2) \
             RETURNING {PAYMENT_METHOD_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, PaymentMethod>(&sql)
            .bind(&method.name)
            .bind(&method.description)
            .fetch_one(self.pool)
            .await
            .map_err(map_write_error)?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment method does not exist.
    pub async fn update(
        &self,
        id: PaymentMethodId,
        changes: &PaymentMethodUpdate,
    ) -> Result<PaymentMethod, RepositoryError> {
        let sql = format!(
            "UPDATE food.payment_method SET \
                 name = COALESCE($2, name), \
                 description = COALESCE($3, description) \
             WHERE id = $1 AND hidden = FALSE \
             RETURNING {PAYMENT_METHOD_COLUMNS}"
        );
        sqlx::query_as::<_, PaymentMethod>(&sql)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.description)
            .fetch_optional(self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment method does not exist.
    pub async fn delete(&self, id: PaymentMethodId) -> Result<(), RepositoryError> {
        soft_delete(self.pool, "food.payment_method", id.as_i32()).await
    }
}
