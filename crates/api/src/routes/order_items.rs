//! Order line handlers. Every route needs a token.

use axum::{Json, extract::State, http::StatusCode};

use food_app_core::{OrderId, ProductId};

use crate::db::OrderItemRepository;
use crate::error::{AppError, OrNotFound, Result};
use crate::middleware::RequireAuth;
use crate::models::order::{NewOrderItem, OrderItem, OrderItemUpdate};
use crate::routes::extract::{JsonBody, PathParam, search_keyword};
use crate::state::AppState;

pub async fn list(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderItem>>> {
    Ok(Json(OrderItemRepository::new(state.pool()).list().await?))
}

pub async fn show(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam((order_id, product_id)): PathParam<(OrderId, ProductId)>,
) -> Result<Json<OrderItem>> {
    let item = OrderItemRepository::new(state.pool())
        .get(order_id, product_id)
        .await?
        .ok_or(AppError::NotFound("Order item"))?;
    Ok(Json(item))
}

pub async fn by_order(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam(order_id): PathParam<OrderId>,
) -> Result<Json<Vec<OrderItem>>> {
    Ok(Json(
        OrderItemRepository::new(state.pool())
            .by_order(order_id)
            .await?,
    ))
}

pub async fn by_product(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam(product_id): PathParam<ProductId>,
) -> Result<Json<Vec<OrderItem>>> {
    Ok(Json(
        OrderItemRepository::new(state.pool())
            .by_product(product_id)
            .await?,
    ))
}

pub async fn search(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam(keyword): PathParam<String>,
) -> Result<Json<Vec<OrderItem>>> {
    let keyword = search_keyword(&keyword)?;
    Ok(Json(
        OrderItemRepository::new(state.pool())
            .search(&keyword)
            .await?,
    ))
}

pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewOrderItem>,
) -> Result<(StatusCode, Json<OrderItem>)> {
    check_quantity(Some(body.quantity))?;
    let item = OrderItemRepository::new(state.pool()).create(&body).await?;

    tracing::info!(
        order_id = %item.order_id,
        product_id = %item.product_id,
        quantity = item.quantity,
        created_by = %user.id,
        "Order item created"
    );
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    PathParam((order_id, product_id)): PathParam<(OrderId, ProductId)>,
    JsonBody(body): JsonBody<OrderItemUpdate>,
) -> Result<Json<OrderItem>> {
    check_quantity(body.quantity)?;
    let item = OrderItemRepository::new(state.pool())
        .update(order_id, product_id, &body)
        .await
        .or_not_found("Order item")?;

    tracing::info!(%order_id, %product_id, updated_by = %user.id, "Order item updated");
    Ok(Json(item))
}

pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    PathParam((order_id, product_id)): PathParam<(OrderId, ProductId)>,
) -> Result<StatusCode> {
    OrderItemRepository::new(state.pool())
        .delete(order_id, product_id)
        .await
        .or_not_found("Order item")?;

    tracing::info!(%order_id, %product_id, deleted_by = %user.id, "Order item deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn check_quantity(quantity: Option<i32>) -> Result<()> {
    match quantity {
        Some(q) if q < 1 => Err(AppError::bad_request("quantity must be at least 1")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_quantity() {
        assert!(check_quantity(Some(1)).is_ok());
        assert!(check_quantity(None).is_ok());
        assert!(check_quantity(Some(0)).is_err());
        assert!(check_quantity(Some(-3)).is_err());
    }
}
