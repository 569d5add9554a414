//! Order handlers. Every route needs a token.
//!
//! Totals are stored as the client sends them.

use axum::{Json, extract::State, http::StatusCode};

use food_app_core::{OrderId, UserId};

use crate::db::OrderRepository;
use crate::error::{AppError, OrNotFound, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::order::{NewOrder, Order, OrderUpdate};
use crate::routes::extract::{JsonBody, PathParam, search_keyword};
use crate::state::AppState;

pub async fn list(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(OrderRepository::new(state.pool()).list().await?))
}

pub async fn show(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam(id): PathParam<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Order"))?;
    Ok(Json(order))
}

pub async fn by_user(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam(user_id): PathParam<UserId>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(
        OrderRepository::new(state.pool()).by_user(user_id).await?,
    ))
}

pub async fn search(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam(keyword): PathParam<String>,
) -> Result<Json<Vec<Order>>> {
    let keyword = search_keyword(&keyword)?;
    Ok(Json(OrderRepository::new(state.pool()).search(&keyword).await?))
}

pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewOrder>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = OrderRepository::new(state.pool()).create(&body).await?;

    let order_id = order.id.to_string();
    add_breadcrumb("order", "Order placed", Some(&[("order_id", &order_id)]));
    tracing::info!(order_id = %order.id, total = %order.total, created_by = %user.id, "Order created");
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    PathParam(id): PathParam<OrderId>,
    JsonBody(body): JsonBody<OrderUpdate>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .update(id, &body)
        .await
        .or_not_found("Order")?;

    tracing::info!(order_id = %id, status = order.status, updated_by = %user.id, "Order updated");
    Ok(Json(order))
}

pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    PathParam(id): PathParam<OrderId>,
) -> Result<StatusCode> {
    OrderRepository::new(state.pool())
        .delete(id)
        .await
        .or_not_found("Order")?;

    tracing::info!(order_id = %id, deleted_by = %user.id, "Order deleted");
    Ok(StatusCode::NO_CONTENT)
}
