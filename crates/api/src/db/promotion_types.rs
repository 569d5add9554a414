//! Promotion type repository.

use std::collections::HashMap;

use sqlx::PgPool;

use food_app_core::PromotionTypeId;

use super::{RepositoryError, SearchKeyword, map_write_error, soft_delete};
use crate::models::promotion::{
    NewPromotionType, PromotionSummary, PromotionType, PromotionTypeUpdate,
};

const PROMOTION_TYPE_COLUMNS: &str = "id, name, description, hidden";

#[derive(sqlx::FromRow)]
struct TypedPromotionRow {
    type_id: PromotionTypeId,
    #[sqlx(flatten)]
    promotion: PromotionSummary,
}

pub struct PromotionTypeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PromotionTypeRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List visible promotion types with their promotions.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self) -> Result<Vec<PromotionType>, RepositoryError> {
        let sql = format!(
            "SELECT {PROMOTION_TYPE_COLUMNS} FROM food.promotion_type \
             WHERE hidden = FALSE ORDER BY id"
        );
        let mut types = sqlx::query_as::<_, PromotionType>(&sql)
            .fetch_all(self.pool)
            .await?;

        self.attach_promotions(&mut types).await?;
        Ok(types)
    }

    /// Get a visible promotion type with its promotions.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: PromotionTypeId) -> Result<Option<PromotionType>, RepositoryError> {
        let sql = format!(
            "SELECT {PROMOTION_TYPE_COLUMNS} FROM food.promotion_type \
             WHERE id = $1 AND hidden = FALSE"
        );
        let Some(mut promotion_type) = sqlx::query_as::<_, PromotionType>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        self.attach_promotions(std::slice::from_mut(&mut promotion_type))
            .await?;
        Ok(Some(promotion_type))
    }

    /// Search by name, or exact id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(
        &self,
        keyword: &SearchKeyword,
    ) -> Result<Vec<PromotionType>, RepositoryError> {
        let sql = format!(
            "SELECT {PROMOTION_TYPE_COLUMNS} FROM food.promotion_type \
             WHERE hidden = FALSE AND (name ILIKE $1 OR id::text = $2) \
             ORDER BY id"
        );
        Ok(sqlx::query_as::<_, PromotionType>(&sql)
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
            "SELECT EXISTS(SELECT 1 FROM food.promotion_type WHERE name = $1 AND hidden = FALSE)",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        promotion_type: &NewPromotionType,
    ) -> Result<PromotionType, RepositoryError> {
        let sql = format!(
            "INSERT INTO food.promotion_type (name, description) VALUES ($1, $2) \
             RETURNING {PROMOTION_TYPE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, PromotionType>(&sql)
            .bind(&promotion_type.name)
            .bind(&promotion_type.description)
            .fetch_one(self.pool)
            .await
            .map_err(map_write_error)?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the type does not exist.
    pub async fn update(
        &self,
        id: PromotionTypeId,
        changes: &PromotionTypeUpdate,
    ) -> Result<PromotionType, RepositoryError> {
        let sql = format!(
            "UPDATE food.promotion_type SET \
                 name = COALESCE($2, name), \
                 description = COALESCE($3, description) \
             WHERE id = $1 AND hidden = FALSE \
             RETURNING {PROMOTION_TYPE_COLUMNS}"
        );
        let mut promotion_type = sqlx::query_as::<_, PromotionType>(&sql)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.description)
            .fetch_optional(self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or(RepositoryError::NotFound)?;

        self.attach_promotions(std::slice::from_mut(&mut promotion_type))
            .await?;
        Ok(promotion_type)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the type does not exist.
    pub async fn delete(&self, id: PromotionTypeId) -> Result<(), RepositoryError> {
        soft_delete(self.pool, "food.promotion_type", id.as_i32()).await
    }

    async fn attach_promotions(&self, types: &mut [PromotionType]) -> Result<(), RepositoryError> {
        if types.is_empty() {
            return Ok(());
        }

        let ids: Vec<i32> = types.iter().map(|t| t.id.as_i32()).collect();
        let rows = sqlx::query_as::<_, TypedPromotionRow>(
            "SELECT type_id, id, name, value, starts_at, ends_at FROM food.promotion \
             WHERE type_id = ANY($1) AND hidden = FALSE \
             ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_type: HashMap<PromotionTypeId, Vec<PromotionSummary>> = HashMap::new();
        for row in rows {
            by_type.entry(row.type_id).or_default().push(row.promotion);
        }
        for promotion_type in types {
            promotion_type.promotions = by_type.remove(&promotion_type.id).unwrap_or_default();
        }

        Ok(())
    }
}
