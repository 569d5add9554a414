//! HTTP route handlers.
//!
//! # Route Structure
//!
//! Every resource lives under `/api`. Unless noted, a resource has:
//!
//! ```text
//! GET    /api/{resource}                  - List visible rows
//! GET    /api/{resource}/{id}             - One row (404 when absent or hidden)
//! GET    /api/{resource}/search/{keyword} - Substring search
//! POST   /api/{resource}                  - Create (201)
//! PUT    /api/{resource}/{id}             - Partial update
//! DELETE /api/{resource}/{id}             - Soft delete (204)
//! ```
//!
//! Extras:
//!
//! ```text
//! POST /api/users/login                          - Bearer token (rate limited)
//! GET  /api/users/by-username/{username}
//! GET  /api/promotions/by-name/{name}
//! GET  /api/promotion-products/{product_id}/{promotion_id}
//! GET  /api/promotion-products/by-promotion/{id}, /by-product/{id}
//! GET  /api/orders/by-user/{user_id}
//! GET  /api/order-items/{order_id}/{product_id}
//! GET  /api/order-items/by-order/{id}, /by-product/{id}
//! GET  /api/order-history/by-order/{order_id}
//! GET  /api/cart-items/by-user/{user_id}
//! PUT  /api/cart-items                           - Update by (product_id, user_id)
//! GET  /api/reviews/by-product/{product_id}
//! ```

pub mod addresses;
pub mod cart_items;
pub mod categories;
pub mod extract;
mod images;
pub mod notifications;
pub mod order_history;
pub mod order_items;
pub mod orders;
pub mod payment_methods;
pub mod products;
pub mod promotion_products;
pub mod promotion_types;
pub mod promotions;
pub mod reviews;
pub mod suppliers;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::login_rate_limiter;
use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    let login = Router::new()
        .route("/login", post(users::login))
        .layer(login_rate_limiter());

    Router::new()
        .merge(login)
        .route("/", get(users::list).post(users::create))
        .route("/by-username/{username}", get(users::show_by_username))
        .route("/search/{keyword}", get(users::search))
        .route(
            "/{id}",
            get(users::show).put(users::update).delete(users::delete),
        )
}

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(addresses::list).post(addresses::create))
        .route("/search/{keyword}", get(addresses::search))
        .route(
            "/{id}",
            get(addresses::show)
                .put(addresses::update)
                .delete(addresses::delete),
        )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list).post(categories::create))
        .route("/search/{keyword}", get(categories::search))
        .route(
            "/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::delete),
        )
}

/// Create the supplier routes router.
pub fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(suppliers::list).post(suppliers::create))
        .route("/search/{keyword}", get(suppliers::search))
        .route(
            "/{id}",
            get(suppliers::show)
                .put(suppliers::update)
                .delete(suppliers::delete),
        )
}

/// Create the payment method routes router.
pub fn payment_method_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(payment_methods::list).post(payment_methods::create))
        .route("/search/{keyword}", get(payment_methods::search))
        .route(
            "/{id}",
            get(payment_methods::show)
                .put(payment_methods::update)
                .delete(payment_methods::delete),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route("/search/{keyword}", get(products::search))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the promotion type routes router.
pub fn promotion_type_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(promotion_types::list).post(promotion_types::create))
        .route("/search/{keyword}", get(promotion_types::search))
        .route(
            "/{id}",
            get(promotion_types::show)
                .put(promotion_types::update)
                .delete(promotion_types::delete),
        )
}

/// Create the promotion routes router.
pub fn promotion_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(promotions::list).post(promotions::create))
        .route("/by-name/{name}", get(promotions::show_by_name))
        .route("/search/{keyword}", get(promotions::search))
        .route(
            "/{id}",
            get(promotions::show)
                .put(promotions::update)
                .delete(promotions::delete),
        )
}

/// Create the promotion product routes router.
pub fn promotion_product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(promotion_products::list).post(promotion_products::create),
        )
        .route(
            "/by-promotion/{id}",
            get(promotion_products::by_promotion),
        )
        .route("/by-product/{id}", get(promotion_products::by_product))
        .route("/search/{keyword}", get(promotion_products::search))
        .route(
            "/{product_id}/{promotion_id}",
            get(promotion_products::show)
                .put(promotion_products::update)
                .delete(promotion_products::delete),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list).post(orders::create))
        .route("/by-user/{user_id}", get(orders::by_user))
        .route("/search/{keyword}", get(orders::search))
        .route(
            "/{id}",
            get(orders::show).put(orders::update).delete(orders::delete),
        )
}

/// Create the order item routes router.
pub fn order_item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(order_items::list).post(order_items::create))
        .route("/by-order/{id}", get(order_items::by_order))
        .route("/by-product/{id}", get(order_items::by_product))
        .route("/search/{keyword}", get(order_items::search))
        .route(
            "/{order_id}/{product_id}",
            get(order_items::show)
                .put(order_items::update)
                .delete(order_items::delete),
        )
}

/// Create the order history routes router.
pub fn order_history_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(order_history::list).post(order_history::create))
        .route("/by-order/{order_id}", get(order_history::by_order))
        .route("/search/{keyword}", get(order_history::search))
        .route(
            "/{id}",
            get(order_history::show)
                .put(order_history::update)
                .delete(order_history::delete),
        )
}

/// Create the cart routes router.
pub fn cart_item_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(cart_items::list)
                .post(cart_items::create)
                .put(cart_items::update),
        )
        .route("/by-user/{user_id}", get(cart_items::by_user))
        .route("/search/{keyword}", get(cart_items::search))
        .route(
            "/{id}",
            get(cart_items::show).delete(cart_items::delete),
        )
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(reviews::list).post(reviews::create))
        .route("/by-product/{product_id}", get(reviews::by_product))
        .route("/search/{keyword}", get(reviews::search))
        .route(
            "/{id}",
            get(reviews::show)
                .put(reviews::update)
                .delete(reviews::delete),
        )
}

/// Create the notification routes router.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::list).post(notifications::create))
        .route("/search/{keyword}", get(notifications::search))
        .route(
            "/{id}",
            get(notifications::show)
                .put(notifications::update)
                .delete(notifications::delete),
        )
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .nest("/users", user_routes())
        .nest("/addresses", address_routes())
        .nest("/categories", category_routes())
        .nest("/suppliers", supplier_routes())
        .nest("/payment-methods", payment_method_routes())
        .nest("/products", product_routes())
        .nest("/promotion-types", promotion_type_routes())
        .nest("/promotions", promotion_routes())
        .nest("/promotion-products", promotion_product_routes())
        .nest("/orders", order_routes())
        .nest("/order-items", order_item_routes())
        .nest("/order-history", order_history_routes())
        .nest("/cart-items", cart_item_routes())
        .nest("/reviews", review_routes())
        .nest("/notifications", notification_routes());

    Router::new().nest("/api", api)
}
