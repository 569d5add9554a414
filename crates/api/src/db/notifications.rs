//! Notification repository.

use sqlx::PgPool;

use food_app_core::NotificationId;

use super::{RepositoryError, SearchKeyword, map_write_error, soft_delete};
use crate::models::notification::{NewNotification, Notification, NotificationUpdate};

const NOTIFICATION_SELECT: &str = "SELECT n.id, n.user_id, n.name, n.description, n.content, \
                                          n.category, n.trigger_condition, n.created_at, \
                                          n.updated_at, n.hidden, u.name AS user_name \
                                   FROM food.notification n \
                                   LEFT JOIN food.app_user u ON u.id = n.user_id";

pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Notification>, RepositoryError> {
        let sql = format!("{NOTIFICATION_SELECT} WHERE n.hidden = FALSE ORDER BY n.id");
        Ok(sqlx::query_as::<_, Notification>(&sql)
            .fetch_all(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: NotificationId) -> Result<Option<Notification>, RepositoryError> {
        let sql = format!("{NOTIFICATION_SELECT} WHERE n.id = $1 AND n.hidden = FALSE");
        Ok(sqlx::query_as::<_, Notification>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Search by name, description, content or category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(
        &self,
        keyword: &SearchKeyword,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let sql = format!(
            "{NOTIFICATION_SELECT} \
             WHERE n.hidden = FALSE \
               AND (n.name ILIKE $1 OR n.description ILIKE $1 \
                    OR n.content ILIKE $1 OR n.category ILIKE $1) \
             ORDER BY n.id"
        );
        Ok(sqlx::query_as::<_, Notification>(&sql)
            .bind(keyword.pattern())
            .fetch_all(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the addressed user does not exist.
    pub async fn create(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, RepositoryError> {
        let (id,): (NotificationId,) = sqlx::query_as(
            "INSERT INTO food.notification \
                 (user_id, name, description, content, category, trigger_condition) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(notification.user_id)
        .bind(&notification.name)
        .bind(&notification.description)
        .bind(&notification.content)
        .bind(&notification.category)
        .bind(&notification.trigger_condition)
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notification does not exist.
    pub async fn update(
        &self,
        id: NotificationId,
        changes: &NotificationUpdate,
    ) -> Result<Notification, RepositoryError> {
        let updated: Option<(NotificationId,)> = sqlx::query_as(
            "UPDATE food.notification SET \
                 user_id = COALESCE($2, user_id), \
                 name = COALESCE($3, name), \
                 description = COALESCE($4, description), \
                 content = COALESCE($5, content), \
                 category = COALESCE($6, category), \
                 trigger_condition = COALESCE($7, trigger_condition), \
                 updated_at = now() \
             WHERE id = $1 AND hidden = FALSE \
             RETURNING id",
        )
        .bind(id)
        .bind(changes.user_id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(&changes.content)
        .bind(&changes.category)
        .bind(&changes.trigger_condition)
        .fetch_optional(self.pool)
        .await
        .map_err(map_write_error)?;

        let (id,) = updated.ok_or(RepositoryError::NotFound)?;
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notification does not exist.
    pub async fn delete(&self, id: NotificationId) -> Result<(), RepositoryError> {
        soft_delete(self.pool, "food.notification", id.as_i32()).await
    }
}
