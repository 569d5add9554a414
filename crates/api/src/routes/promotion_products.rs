//! Promotion/product link handlers. Reads are public, writes Admin only.

use axum::{Json, extract::State, http::StatusCode};

use food_app_core::{ProductId, PromotionId};

use crate::db::PromotionProductRepository;
use crate::error::{AppError, OrNotFound, Result};
use crate::middleware::RequireAdmin;
use crate::models::promotion::{NewPromotionProduct, PromotionProduct, PromotionProductUpdate};
use crate::routes::extract::{JsonBody, PathParam, search_keyword};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<PromotionProduct>>> {
    Ok(Json(PromotionProductRepository::new(state.pool()).list().await?))
}

pub async fn show(
    State(state): State<AppState>,
    PathParam((product_id, promotion_id)): PathParam<(ProductId, PromotionId)>,
) -> Result<Json<PromotionProduct>> {
    let link = PromotionProductRepository::new(state.pool())
        .get(product_id, promotion_id)
        .await?
        .ok_or(AppError::NotFound("Promotion product"))?;
    Ok(Json(link))
}

pub async fn by_promotion(
    State(state): State<AppState>,
    PathParam(promotion_id): PathParam<PromotionId>,
) -> Result<Json<Vec<PromotionProduct>>> {
    Ok(Json(
        PromotionProductRepository::new(state.pool())
            .by_promotion(promotion_id)
            .await?,
    ))
}

pub async fn by_product(
    State(state): State<AppState>,
    PathParam(product_id): PathParam<ProductId>,
) -> Result<Json<Vec<PromotionProduct>>> {
    Ok(Json(
        PromotionProductRepository::new(state.pool())
            .by_product(product_id)
            .await?,
    ))
}

pub async fn search(
    State(state): State<AppState>,
    PathParam(keyword): PathParam<String>,
) -> Result<Json<Vec<PromotionProduct>>> {
    let keyword = search_keyword(&keyword)?;
    Ok(Json(
        PromotionProductRepository::new(state.pool())
            .search(&keyword)
            .await?,
    ))
}

pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewPromotionProduct>,
) -> Result<(StatusCode, Json<PromotionProduct>)> {
    check_quantity(body.applicable_quantity)?;
    let link = PromotionProductRepository::new(state.pool())
        .create(&body)
        .await?;

    tracing::info!(
        product_id = %link.product_id,
        promotion_id = %link.promotion_id,
        created_by = %admin.id,
        "Promotion product created"
    );
    Ok((StatusCode::CREATED, Json(link)))
}

pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    PathParam((product_id, promotion_id)): PathParam<(ProductId, PromotionId)>,
    JsonBody(body): JsonBody<PromotionProductUpdate>,
) -> Result<Json<PromotionProduct>> {
    check_quantity(body.applicable_quantity)?;
    let link = PromotionProductRepository::new(state.pool())
        .update(product_id, promotion_id, &body)
        .await
        .or_not_found("Promotion product")?;

    tracing::info!(%product_id, %promotion_id, updated_by = %admin.id, "Promotion product updated");
    Ok(Json(link))
}

pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    PathParam((product_id, promotion_id)): PathParam<(ProductId, PromotionId)>,
) -> Result<StatusCode> {
    PromotionProductRepository::new(state.pool())
        .delete(product_id, promotion_id)
        .await
        .or_not_found("Promotion product")?;

    tracing::info!(%product_id, %promotion_id, deleted_by = %admin.id, "Promotion product deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn check_quantity(quantity: Option<i32>) -> Result<()> {
    match quantity {
        Some(q) if q < 0 => Err(AppError::bad_request(
            "applicable_quantity cannot be negative",
        )),
        _ => Ok(()),
    }
}
