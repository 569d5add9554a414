//! Review repository.

use sqlx::PgPool;

use food_app_core::{ProductId, ReviewId};

use super::{RepositoryError, SearchKeyword, map_write_error, soft_delete};
use crate::models::review::{NewReview, Review, ReviewUpdate};

const REVIEW_SELECT: &str = "SELECT r.id, r.user_id, r.product_id, r.stars, r.content, \
                                    r.image_url, r.reviewed_at, r.updated_at, r.hidden, \
                                    u.name AS user_name, p.name AS product_name \
                             FROM food.review r \
                             JOIN food.app_user u ON u.id = r.user_id \
                             JOIN food.product p ON p.id = r.product_id";

pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Review>, RepositoryError> {
        let sql = format!("{REVIEW_SELECT} WHERE r.hidden = FALSE ORDER BY r.id");
        Ok(sqlx::query_as::<_, Review>(&sql)
            .fetch_all(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let sql = format!("{REVIEW_SELECT} WHERE r.id = $1 AND r.hidden = FALSE");
        Ok(sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Visible reviews of one product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn by_product(&self, product_id: ProductId) -> Result<Vec<Review>, RepositoryError> {
        let sql = format!(
            "{REVIEW_SELECT} WHERE r.product_id = $1 AND r.hidden = FALSE ORDER BY r.id"
        );
        Ok(sqlx::query_as::<_, Review>(&sql)
            .bind(product_id)
            .fetch_all(self.pool)
            .await?)
    }

    /// Search by content, reviewer name or product name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, keyword: &SearchKeyword) -> Result<Vec<Review>, RepositoryError> {
        let sql = format!(
            "{REVIEW_SELECT} \
             WHERE r.hidden = FALSE \
               AND (r.content ILIKE $1 OR u.name ILIKE $1 OR p.name ILIKE $1) \
             ORDER BY r.id"
        );
        Ok(sqlx::query_as::<_, Review>(&sql)
            .bind(keyword.pattern())
            .fetch_all(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user or product does not exist.
    pub async fn create(&self, review: &NewReview) -> Result<Review, RepositoryError> {
        let (id,): (ReviewId,) = sqlx::query_as(
            "INSERT INTO food.review (user_id, product_id, stars, content, image_url) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(review.user_id)
        .bind(review.product_id)
        .bind(review.stars)
        .bind(&review.content)
        .bind(&review.image_url)
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    pub async fn update(&self, id: ReviewId, changes: &ReviewUpdate) -> Result<Review, RepositoryError> {
        let updated: Option<(ReviewId,)> = sqlx::query_as(
            "UPDATE food.review SET \
                 stars = COALESCE($2, stars), \
                 content = COALESCE($3, content), \
                 updated_at = now() \
             WHERE id = $1 AND hidden = FALSE \
             RETURNING id",
        )
        .bind(id)
        .bind(changes.stars)
        .bind(&changes.content)
        .fetch_optional(self.pool)
        .await
        .map_err(map_write_error)?;

        let (id,) = updated.ok_or(RepositoryError::NotFound)?;
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    pub async fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        soft_delete(self.pool, "food.review", id.as_i32()).await
    }
}
