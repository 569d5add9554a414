//! Promotion handlers. Reads are public, writes Admin only.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};

use food_app_core::PromotionId;

use crate::db::PromotionRepository;
use crate::error::{AppError, OrNotFound, Result};
use crate::middleware::RequireAdmin;
use crate::models::promotion::{NewPromotion, Promotion, PromotionUpdate, is_valid_window};
use crate::routes::extract::{JsonBody, PathParam, check_name_change, require_name, search_keyword};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Promotion>>> {
    Ok(Json(PromotionRepository::new(state.pool()).list().await?))
}

pub async fn show(
    State(state): State<AppState>,
    PathParam(id): PathParam<PromotionId>,
) -> Result<Json<Promotion>> {
    let promotion = PromotionRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Promotion"))?;
    Ok(Json(promotion))
}

pub async fn show_by_name(
    State(state): State<AppState>,
    PathParam(name): PathParam<String>,
) -> Result<Json<Promotion>> {
    let promotion = PromotionRepository::new(state.pool())
        .get_by_name(&name)
        .await?
        .ok_or(AppError::NotFound("Promotion"))?;
    Ok(Json(promotion))
}

pub async fn search(
    State(state): State<AppState>,
    PathParam(keyword): PathParam<String>,
) -> Result<Json<Vec<Promotion>>> {
    let keyword = search_keyword(&keyword)?;
    Ok(Json(
        PromotionRepository::new(state.pool()).search(&keyword).await?,
    ))
}

pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewPromotion>,
) -> Result<(StatusCode, Json<Promotion>)> {
    require_name(&body.name)?;
    check_window(body.starts_at, body.ends_at)?;

    let promotion = PromotionRepository::new(state.pool()).create(&body).await?;

    tracing::info!(promotion_id = %promotion.id, created_by = %admin.id, "Promotion created");
    Ok((StatusCode::CREATED, Json(promotion)))
}

/// Update a promotion. The window is checked after merging the change with
/// the stored dates.
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    PathParam(id): PathParam<PromotionId>,
    JsonBody(body): JsonBody<PromotionUpdate>,
) -> Result<Json<Promotion>> {
    check_name_change(body.name.as_deref())?;
    let repo = PromotionRepository::new(state.pool());
    let current = repo.get(id).await?.ok_or(AppError::NotFound("Promotion"))?;
    check_window(
        body.starts_at.or(current.starts_at),
        body.ends_at.or(current.ends_at),
    )?;

    let promotion = repo.update(id, &body).await.or_not_found("Promotion")?;

    tracing::info!(promotion_id = %id, updated_by = %admin.id, "Promotion updated");
    Ok(Json(promotion))
}

pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    PathParam(id): PathParam<PromotionId>,
) -> Result<StatusCode> {
    PromotionRepository::new(state.pool())
        .delete(id)
        .await
        .or_not_found("Promotion")?;

    tracing::info!(promotion_id = %id, deleted_by = %admin.id, "Promotion deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn check_window(starts_at: Option<DateTime<Utc>>, ends_at: Option<DateTime<Utc>>) -> Result<()> {
    if is_valid_window(starts_at, ends_at) {
        Ok(())
    } else {
        Err(AppError::bad_request("ends_at cannot be before starts_at"))
    }
}
