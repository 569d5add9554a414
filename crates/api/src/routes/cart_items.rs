//! Cart handlers.
//!
//! Reading a line by id or the whole table is public; everything else needs
//! a token.

use axum::{Json, extract::State, http::StatusCode};

use food_app_core::{CartItemId, UserId};

use crate::db::{CartItemRepository, CartMerge, ProductRepository, UserRepository};
use crate::error::{AppError, OrNotFound, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::cart::{CartItem, CartItemKey, NewCartItem};
use crate::routes::extract::{JsonBody, PathParam, search_keyword};
use crate::routes::order_items::check_quantity;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<CartItem>>> {
    Ok(Json(CartItemRepository::new(state.pool()).list().await?))
}

pub async fn show(
    State(state): State<AppState>,
    PathParam(id): PathParam<CartItemId>,
) -> Result<Json<CartItem>> {
    let item = CartItemRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Cart item"))?;
    Ok(Json(item))
}

pub async fn by_user(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam(user_id): PathParam<UserId>,
) -> Result<Json<Vec<CartItem>>> {
    Ok(Json(
        CartItemRepository::new(state.pool())
            .by_user(user_id)
            .await?,
    ))
}

pub async fn search(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    PathParam(keyword): PathParam<String>,
) -> Result<Json<Vec<CartItem>>> {
    let keyword = search_keyword(&keyword)?;
    Ok(Json(
        CartItemRepository::new(state.pool())
            .search(&keyword)
            .await?,
    ))
}

/// Add a product to a cart.
///
/// Responds 201 with a new line, or 200 when the product was already in the
/// cart and its quantity grew.
pub async fn create(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewCartItem>,
) -> Result<(StatusCode, Json<CartItem>)> {
    let quantity = body.quantity.unwrap_or(1);
    check_quantity(Some(quantity))?;

    if !ProductRepository::new(state.pool())
        .exists(body.product_id)
        .await?
    {
        return Err(AppError::NotFound("Product"));
    }
    if !UserRepository::new(state.pool()).exists(body.user_id).await? {
        return Err(AppError::NotFound("User"));
    }

    let merge = CartItemRepository::new(state.pool())
        .add(body.user_id, body.product_id, quantity)
        .await?;

    let product_id = body.product_id.to_string();
    add_breadcrumb("cart", "Added item", Some(&[("product_id", &product_id)]));

    let (status, item) = match merge {
        CartMerge::Inserted(item) => (StatusCode::CREATED, item),
        CartMerge::Merged(item) => (StatusCode::OK, item),
    };
    tracing::info!(
        cart_item_id = %item.id,
        quantity = item.quantity,
        merged = status == StatusCode::OK,
        by = %caller.id,
        "Cart item saved"
    );
    Ok((status, Json(item)))
}

/// Set the quantity of the line addressed by `(product_id, user_id)`.
pub async fn update(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CartItemKey>,
) -> Result<Json<CartItem>> {
    let (Some(product_id), Some(user_id)) = (body.product_id, body.user_id) else {
        return Err(AppError::bad_request("product_id and user_id are required"));
    };
    check_quantity(body.quantity)?;

    let item = CartItemRepository::new(state.pool())
        .update_quantity(user_id, product_id, body.quantity)
        .await
        .or_not_found("Cart item")?;

    tracing::info!(cart_item_id = %item.id, quantity = item.quantity, by = %caller.id, "Cart item updated");
    Ok(Json(item))
}

pub async fn delete(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    PathParam(id): PathParam<CartItemId>,
) -> Result<StatusCode> {
    CartItemRepository::new(state.pool())
        .delete(id)
        .await
        .or_not_found("Cart item")?;

    tracing::info!(cart_item_id = %id, by = %caller.id, "Cart item removed");
    Ok(StatusCode::NO_CONTENT)
}
