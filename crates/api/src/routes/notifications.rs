//! Notification handlers. Reads need a token, writes need an Admin.

use axum::{Json, extract::State, http::StatusCode};

use food_app_core::NotificationId;

use crate::db::NotificationRepository;
use crate::error::{AppError, OrNotFound, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::NAME_MAX;
use crate::models::notification::{NewNotification, Notification, NotificationUpdate};
use crate::routes::extract::{
    JsonBody, PathParam, check_name_change, check_optional_length, require_name, search_keyword,
};
use crate::state::AppState;

pub async fn list(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Notification>>> {
    Ok(Json(NotificationRepository::new(state.pool()).list().await?))
}

pub async fn show(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam(id): PathParam<NotificationId>,
) -> Result<Json<Notification>> {
    let notification = NotificationRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Notification"))?;
    Ok(Json(notification))
}

pub async fn search(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam(keyword): PathParam<String>,
) -> Result<Json<Vec<Notification>>> {
    let keyword = search_keyword(&keyword)?;
    Ok(Json(
        NotificationRepository::new(state.pool())
            .search(&keyword)
            .await?,
    ))
}

pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewNotification>,
) -> Result<(StatusCode, Json<Notification>)> {
    require_name(&body.name)?;
    check_optional_length("category", body.category.as_deref(), NAME_MAX)?;
    let notification = NotificationRepository::new(state.pool())
        .create(&body)
        .await?;

    tracing::info!(
        notification_id = %notification.id,
        broadcast = notification.user_id.is_none(),
        created_by = %admin.id,
        "Notification created"
    );
    Ok((StatusCode::CREATED, Json(notification)))
}

pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    PathParam(id): PathParam<NotificationId>,
    JsonBody(body): JsonBody<NotificationUpdate>,
) -> Result<Json<Notification>> {
    check_name_change(body.name.as_deref())?;
    check_optional_length("category", body.category.as_deref(), NAME_MAX)?;
    let notification = NotificationRepository::new(state.pool())
        .update(id, &body)
        .await
        .or_not_found("Notification")?;

    tracing::info!(notification_id = %id, updated_by = %admin.id, "Notification updated");
    Ok(Json(notification))
}

pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    PathParam(id): PathParam<NotificationId>,
) -> Result<StatusCode> {
    NotificationRepository::new(state.pool())
        .delete(id)
        .await
        .or_not_found("Notification")?;

    tracing::info!(notification_id = %id, deleted_by = %admin.id, "Notification deleted");
    Ok(StatusCode::NO_CONTENT)
}
