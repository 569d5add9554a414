//! Order timeline handlers. Every route needs a token.

use axum::{Json, extract::State, http::StatusCode};

use food_app_core::{OrderHistoryId, OrderId};

use crate::db::OrderHistoryRepository;
use crate::error::{AppError, OrNotFound, Result};
use crate::middleware::RequireAuth;
use crate::models::order::{NewOrderHistoryEntry, OrderHistoryEntry, OrderHistoryUpdate};
use crate::routes::extract::{JsonBody, PathParam, search_keyword};
use crate::state::AppState;

pub async fn list(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderHistoryEntry>>> {
    Ok(Json(OrderHistoryRepository::new(state.pool()).list().await?))
}

pub async fn show(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam(id): PathParam<OrderHistoryId>,
) -> Result<Json<OrderHistoryEntry>> {
    let entry = OrderHistoryRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Order history"))?;
    Ok(Json(entry))
}

pub async fn by_order(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam(order_id): PathParam<OrderId>,
) -> Result<Json<Vec<OrderHistoryEntry>>> {
    Ok(Json(
        OrderHistoryRepository::new(state.pool())
            .by_order(order_id)
            .await?,
    ))
}

pub async fn search(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam(keyword): PathParam<String>,
) -> Result<Json<Vec<OrderHistoryEntry>>> {
    let keyword = search_keyword(&keyword)?;
    Ok(Json(
        OrderHistoryRepository::new(state.pool())
            .search(&keyword)
            .await?,
    ))
}

pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewOrderHistoryEntry>,
) -> Result<(StatusCode, Json<OrderHistoryEntry>)> {
    let entry = OrderHistoryRepository::new(state.pool())
        .create(&body)
        .await?;

    tracing::info!(
        order_id = %entry.order_id,
        status = entry.status,
        created_by = %user.id,
        "Order status recorded"
    );
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    PathParam(id): PathParam<OrderHistoryId>,
    JsonBody(body): JsonBody<OrderHistoryUpdate>,
) -> Result<Json<OrderHistoryEntry>> {
    let entry = OrderHistoryRepository::new(state.pool())
        .update(id, &body)
        .await
        .or_not_found("Order history")?;

    tracing::info!(history_id = %id, updated_by = %user.id, "Order history updated");
    Ok(Json(entry))
}

pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    PathParam(id): PathParam<OrderHistoryId>,
) -> Result<StatusCode> {
    OrderHistoryRepository::new(state.pool())
        .delete(id)
        .await
        .or_not_found("Order history")?;

    tracing::info!(history_id = %id, deleted_by = %user.id, "Order history deleted");
    Ok(StatusCode::NO_CONTENT)
}
