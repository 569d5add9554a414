//! Promotion type handlers. Reads are public, writes Admin only.

use axum::{Json, extract::State, http::StatusCode};

use food_app_core::PromotionTypeId;

use crate::db::PromotionTypeRepository;
use crate::error::{AppError, OrNotFound, Result};
use crate::middleware::RequireAdmin;
use crate::models::promotion::{NewPromotionType, PromotionType, PromotionTypeUpdate};
use crate::routes::extract::{JsonBody, PathParam, check_name_change, require_name, search_keyword};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<PromotionType>>> {
    Ok(Json(PromotionTypeRepository::new(state.pool()).list().await?))
}

pub async fn show(
    State(state): State<AppState>,
    PathParam(id): PathParam<PromotionTypeId>,
) -> Result<Json<PromotionType>> {
    let promotion_type = PromotionTypeRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Promotion type"))?;
    Ok(Json(promotion_type))
}

pub async fn search(
    State(state): State<AppState>,
    PathParam(keyword): PathParam<String>,
) -> Result<Json<Vec<PromotionType>>> {
    let keyword = search_keyword(&keyword)?;
    Ok(Json(
        PromotionTypeRepository::new(state.pool())
            .search(&keyword)
            .await?,
    ))
}

pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewPromotionType>,
) -> Result<(StatusCode, Json<PromotionType>)> {
    require_name(&body.name)?;
    let promotion_type = PromotionTypeRepository::new(state.pool())
        .create(&body)
        .await?;

    tracing::info!(promotion_type_id = %promotion_type.id, created_by = %admin.id, "Promotion type created");
    Ok((StatusCode::CREATED, Json(promotion_type)))
}

pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    PathParam(id): PathParam<PromotionTypeId>,
    JsonBody(body): JsonBody<PromotionTypeUpdate>,
) -> Result<Json<PromotionType>> {
    check_name_change(body.name.as_deref())?;
    let promotion_type = PromotionTypeRepository::new(state.pool())
        .update(id, &body)
        .await
        .or_not_found("Promotion type")?;

    tracing::info!(promotion_type_id = %id, updated_by = %admin.id, "Promotion type updated");
    Ok(Json(promotion_type))
}

pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    PathParam(id): PathParam<PromotionTypeId>,
) -> Result<StatusCode> {
    PromotionTypeRepository::new(state.pool())
        .delete(id)
        .await
        .or_not_found("Promotion type")?;

    tracing::info!(promotion_type_id = %id, deleted_by = %admin.id, "Promotion type deleted");
    Ok(StatusCode::NO_CONTENT)
}
