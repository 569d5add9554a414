//! Shopping cart lines.
//!
//! A user holds at most one line per product; adding the same product again
//! grows that line's quantity.

use serde::{Deserialize, Serialize};

use food_app_core::{CartItemId, ProductId, UserId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub quantity: i32,
    pub user_name: String,
    pub product_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub user_id: UserId,
    /// Defaults to one.
    pub quantity: Option<i32>,
}

/// Body of `PUT /api/cart-items`. The line is addressed by its
/// (product, user) pair; both must be present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartItemKey {
    pub product_id: Option<ProductId>,
    pub user_id: Option<UserId>,
    pub quantity: Option<i32>,
}
