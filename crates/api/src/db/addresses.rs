//! Address repository.

use sqlx::PgPool;

use food_app_core::AddressId;

use super::{RepositoryError, SearchKeyword, map_write_error, soft_delete};
use crate::models::address::{Address, AddressUpdate, NewAddress};

const ADDRESS_SELECT: &str = "SELECT a.id, a.user_id, a.name, a.address, a.hidden, \
                                     u.name AS user_name \
                              FROM food.address a \
                              JOIN food.app_user u ON u.id = a.user_id";

/// Repository for delivery addresses.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all visible addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Address>, RepositoryError> {
        let sql = format!("{ADDRESS_SELECT} WHERE a.hidden = FALSE ORDER BY a.id");
        Ok(sqlx::query_as::<_, Address>(&sql)
            .fetch_all(self.pool)
            .await?)
    }

    /// Get a visible address by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        let sql = format!("{ADDRESS_SELECT} WHERE a.id = $1 AND a.hidden = FALSE");
        Ok(sqlx::query_as::<_, Address>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Search by label or address text, or exact id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, keyword: &SearchKeyword) -> Result<Vec<Address>, RepositoryError> {
        let sql = format!(
            "{ADDRESS_SELECT} \
             WHERE a.hidden = FALSE \
               AND (a.name ILIKE $1 OR a.address ILIKE $1 OR a.id::text = $2) \
             ORDER BY a.id"
        );
        Ok(sqlx::query_as::<_, Address>(&sql)
            .bind(keyword.pattern())
            .bind(keyword.as_str())
            .fetch_all(self.pool)
            .await?)
    }

    /// Create an address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the owner does not exist.
    pub async fn create(&self, address: &NewAddress) -> Result<Address, RepositoryError> {
        let (id,): (AddressId,) = sqlx::query_as(
            "INSERT INTO food.address (user_id, name, address) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(address.user_id)
        .bind(&address.name)
        .bind(&address.address)
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Apply changes to a visible address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist.
    /// Returns `RepositoryError::Conflict` if the new owner does not exist.
    pub async fn update(
        &self,
        id: AddressId,
        changes: &AddressUpdate,
    ) -> Result<Address, RepositoryError> {
        let updated: Option<(AddressId,)> = sqlx::query_as(
            "UPDATE food.address SET \
                 user_id = COALESCE($2, user_id), \
                 name = COALESCE($3, name), \
                 address = COALESCE($4, address) \
             WHERE id = $1 AND hidden = FALSE \
             RETURNING id",
        )
        .bind(id)
        .bind(changes.user_id)
        .bind(&changes.name)
        .bind(&changes.address)
        .fetch_optional(self.pool)
        .await
        .map_err(map_write_error)?;

        let (id,) = updated.ok_or(RepositoryError::NotFound)?;
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Hide an address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist.
    pub async fn delete(&self, id: AddressId) -> Result<(), RepositoryError> {
        soft_delete(self.pool, "food.address", id.as_i32()).await
    }
}
