//! In-process router tests.
//!
//! The pool behind these requests never connects, so every case here is a
//! request the API must answer from authentication or input validation
//! alone.

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use food_app_api::routes;
use food_app_core::Role;
use food_app_integration_tests::{bearer_for, lazy_state};
use tower::ServiceExt;

async fn send(
    method: Method,
    uri: &str,
    auth: Option<&str>,
    json: Option<&str>,
) -> (StatusCode, String) {
    let app = routes::routes().with_state(lazy_state());

    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = auth {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    let body = match json {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_owned())
        }
        None => Body::empty(),
    };

    let response = app
        .oneshot(builder.body(body).expect("valid request"))
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body fits");
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

fn user_token() -> String {
    bearer_for(&lazy_state(), 7, Role::User)
}

fn admin_token() -> String {
    bearer_for(&lazy_state(), 1, Role::Admin)
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_protected_route_without_token() {
    let app = routes::routes().with_state(lazy_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/orders")
                .body(Body::empty())
                .expect("valid request"),
        )
        .await
        .expect("router is infallible");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).map(axum::http::HeaderValue::as_bytes),
        Some(b"Bearer".as_slice())
    );
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let (status, body) = send(Method::GET, "/api/users", Some("Bearer not.a.token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "Invalid or expired token");
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() {
    let mut config = food_app_integration_tests::test_config();
    config.jwt.secret = secrecy::SecretString::from("Zr8#nQ3!wX6@mK1$bT5%yH9^cV2&jL4*");
    let foreign = food_app_api::services::TokenIssuer::new(&config.jwt)
        .issue(food_app_core::UserId::new(1), "intruder", Role::Admin)
        .expect("token signs");

    let (status, _) = send(
        Method::GET,
        "/api/categories",
        Some(&format!("Bearer {}", foreign.token)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_route_forbids_user_role() {
    let (status, body) = send(Method::GET, "/api/categories", Some(&user_token()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, "Forbidden");
}

#[tokio::test]
async fn test_admin_write_forbids_user_role() {
    let (status, _) = send(
        Method::DELETE,
        "/api/notifications/3",
        Some(&user_token()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ============================================================================
// Input validation
// ============================================================================

#[tokio::test]
async fn test_blank_search_keyword() {
    let (status, body) = send(Method::GET, "/api/products/search/%20%20", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Keyword cannot be empty");
}

#[tokio::test]
async fn test_non_numeric_id() {
    let (status, _) = send(Method::GET, "/api/products/abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_body() {
    let (status, _) = send(
        Method::POST,
        "/api/categories",
        Some(&admin_token()),
        Some("{\"name\":"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blank_required_name() {
    let (status, body) = send(
        Method::POST,
        "/api/categories",
        Some(&admin_token()),
        Some(r#"{"name":"   "}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "name is required");
}

#[tokio::test]
async fn test_blank_name_on_update() {
    for uri in [
        "/api/categories/4",
        "/api/suppliers/4",
        "/api/payment-methods/4",
        "/api/promotion-types/4",
        "/api/promotions/4",
        "/api/notifications/4",
    ] {
        let (status, body) =
            send(Method::PUT, uri, Some(&admin_token()), Some(r#"{"name":""}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, "name is required", "{uri}");
    }
}

#[tokio::test]
async fn test_name_longer_than_column() {
    let json = format!(r#"{{"name":"{}"}}"#, "n".repeat(101));
    for (method, uri) in [
        (Method::POST, "/api/categories"),
        (Method::PUT, "/api/categories/4"),
        (Method::POST, "/api/suppliers"),
        (Method::POST, "/api/payment-methods"),
        (Method::POST, "/api/promotion-types"),
        (Method::PUT, "/api/promotions/4"),
        (Method::POST, "/api/notifications"),
    ] {
        let (status, body) = send(method, uri, Some(&admin_token()), Some(&json)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, "name must be at most 100 characters", "{uri}");
    }
}

#[tokio::test]
async fn test_address_longer_than_column() {
    let json = format!(r#"{{"user_id":7,"address":"{}"}}"#, "a".repeat(256));
    let (status, body) = send(
        Method::POST,
        "/api/addresses",
        Some(&user_token()),
        Some(&json),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "address must be at most 255 characters");

    let json = format!(r#"{{"name":"{}"}}"#, "h".repeat(101));
    let (status, body) = send(
        Method::PUT,
        "/api/addresses/2",
        Some(&user_token()),
        Some(&json),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "name must be at most 100 characters");
}

#[tokio::test]
async fn test_notification_category_longer_than_column() {
    let json = format!(r#"{{"category":"{}"}}"#, "c".repeat(101));
    let (status, body) = send(
        Method::PUT,
        "/api/notifications/4",
        Some(&admin_token()),
        Some(&json),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "category must be at most 100 characters");
}

#[tokio::test]
async fn test_promotion_window_reversed() {
    let (status, body) = send(
        Method::POST,
        "/api/promotions",
        Some(&admin_token()),
        Some(
            r#"{"name":"Lunch deal","value":"10.00",
                "starts_at":"2026-06-02T00:00:00Z","ends_at":"2026-06-01T00:00:00Z"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "ends_at cannot be before starts_at");
}

#[tokio::test]
async fn test_cart_quantity_must_be_positive() {
    let (status, body) = send(
        Method::POST,
        "/api/cart-items",
        Some(&user_token()),
        Some(r#"{"product_id":3,"user_id":7,"quantity":0}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "quantity must be at least 1");
}

#[tokio::test]
async fn test_negative_price_rejected() {
    let (status, _) = send(
        Method::POST,
        "/api/promotions",
        Some(&admin_token()),
        Some(r#"{"name":"Broken","value":"-5"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, _) = send(Method::GET, "/api/does-not-exist", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
