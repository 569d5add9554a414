//! Promotion repository.

use sqlx::PgPool;

use food_app_core::PromotionId;

use super::{RepositoryError, SearchKeyword, map_write_error, soft_delete};
use crate::models::promotion::{NewPromotion, Promotion, PromotionUpdate};

const PROMOTION_SELECT: &str = "SELECT p.id, p.type_id, p.name, p.value, p.conditions, \
                                       p.starts_at, p.ends_at, p.created_at, p.updated_at, \
                                       p.hidden, t.name AS type_name \
                                FROM food.promotion p \
                                LEFT JOIN food.promotion_type t ON t.id = p.type_id";

pub struct PromotionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PromotionRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Promotion>, RepositoryError> {
        let sql = format!("{PROMOTION_SELECT} WHERE p.hidden = FALSE ORDER BY p.id");
        Ok(sqlx::query_as::<_, Promotion>(&sql)
            .fetch_all(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PromotionId) -> Result<Option<Promotion>, RepositoryError> {
        let sql = format!("{PROMOTION_SELECT} WHERE p.id = $1 AND p.hidden = FALSE");
        Ok(sqlx::query_as::<_, Promotion>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Exact, case-sensitive name lookup. The first visible match by id wins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Promotion>, RepositoryError> {
        let sql = format!(
            "{PROMOTION_SELECT} WHERE p.name = $1 AND p.hidden = FALSE ORDER BY p.id LIMIT 1"
        );
        Ok(sqlx::query_as::<_, Promotion>(&sql)
            .bind(name)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Search by name, or exact id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, keyword: &SearchKeyword) -> Result<Vec<Promotion>, RepositoryError> {
        let sql = format!(
            "{PROMOTION_SELECT} \
             WHERE p.hidden = FALSE AND (p.name ILIKE $1 OR p.id::text = $2) \
             ORDER BY p.id"
        );
        Ok(sqlx::query_as::<_, Promotion>(&sql)
            .bind(keyword.pattern())
            .bind(keyword.as_str())
            .fetch_all(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the promotion type does not exist.
    pub async fn create(&self, promotion: &NewPromotion) -> Result<Promotion, RepositoryError> {
        let (id,): (PromotionId,) = sqlx::query_as(
            "INSERT INTO food.promotion (type_id, name, value, conditions, starts_at, ends_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(promotion.type_id)
        .bind(&promotion.name)
        .bind(promotion.value)
        .bind(&promotion.conditions)
        .bind(promotion.starts_at)
        .bind(promotion.ends_at)
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Apply changes to a visible promotion.
    ///
    /// The merged window is checked by the `promotion_window` constraint, so a
    /// change that ends the promotion before it starts fails as a database
    /// error; callers validate against the stored row first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the promotion does not exist.
    pub async fn update(
        &self,
        id: PromotionId,
        changes: &PromotionUpdate,
    ) -> Result<Promotion, RepositoryError> {
        let updated: Option<(PromotionId,)> = sqlx::query_as(
            "UPDATE food.promotion SET \
                 type_id = COALESCE($2, type_id), \
                 name = COALESCE($3, name), \
                 value = COALESCE($4, value), \
                 conditions = COALESCE($5, conditions), \
                 starts_at = COALESCE($6, starts_at), \
                 ends_at = COALESCE($7, ends_at), \
                 updated_at = now() \
             WHERE id = $1 AND hidden = FALSE \
             RETURNING id",
        )
        .bind(id)
        .bind(changes.type_id)
        .bind(&changes.name)
        .bind(changes.value)
        .bind(&changes.conditions)
        .bind(changes.starts_at)
        .bind(changes.ends_at)
        .fetch_optional(self.pool)
        .await
        .map_err(map_write_error)?;

        let (id,) = updated.ok_or(RepositoryError::NotFound)?;
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the promotion does not exist.
    pub async fn delete(&self, id: PromotionId) -> Result<(), RepositoryError> {
        soft_delete(self.pool, "food.promotion", id.as_i32()).await
    }
}
