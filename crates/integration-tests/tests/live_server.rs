//! End-to-end checks against a running server.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`food-cli migrate`)
//! - The API server running (`cargo run -p food-app-api`)
//! - For the write tests, an admin account (`food-cli user create-admin`)
//!   whose credentials are in `FOOD_APP_ADMIN_USERNAME` and
//!   `FOOD_APP_ADMIN_PASSWORD`
//!
//! Run with: `cargo test -p food-app-integration-tests -- --ignored`

use chrono::Utc;
use reqwest::multipart::Form;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Base URL for the API (configurable via environment).
fn base_url() -> String {
    std::env::var("FOOD_APP_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

fn client() -> Client {
    Client::builder().build().expect("Failed to create HTTP client")
}

fn admin_username() -> String {
    std::env::var("FOOD_APP_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string())
}

/// Log in as the configured admin and return the `Authorization` value.
async fn admin_bearer(client: &Client) -> String {
    let password =
        std::env::var("FOOD_APP_ADMIN_PASSWORD").expect("FOOD_APP_ADMIN_PASSWORD must be set");
    let resp = client
        .post(format!("{}/api/users/login", base_url()))
        .json(&json!({"username": admin_username(), "password": password}))
        .send()
        .await
        .expect("login request");
    assert_eq!(resp.status(), StatusCode::OK, "admin login");

    let body: Value = resp.json().await.expect("token JSON");
    format!("Bearer {}", body["token"].as_str().expect("token field"))
}

/// A name no earlier run has used.
fn unique_name(prefix: &str) -> String {
    format!("{prefix} {}", Utc::now().timestamp_micros())
}

async fn create_category(client: &Client, auth: &str, body: &Value) -> Value {
    let resp = client
        .post(format!("{}/api/categories", base_url()))
        .header("authorization", auth)
        .json(body)
        .send()
        .await
        .expect("create category request");
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("category JSON")
}

async fn get_category(client: &Client, auth: &str, id: i64) -> reqwest::Response {
    client
        .get(format!("{}/api/categories/{id}", base_url()))
        .header("authorization", auth)
        .send()
        .await
        .expect("get category request")
}

async fn delete_path(client: &Client, auth: &str, path: &str) {
    let resp = client
        .delete(format!("{}{path}", base_url()))
        .header("authorization", auth)
        .send()
        .await
        .expect("delete request");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT, "DELETE {path}");
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_health_endpoints() {
    let client = client();
    let base = base_url();

    let live = client
        .get(format!("{base}/health"))
        .send()
        .await
        .expect("health request");
    assert_eq!(live.status(), StatusCode::OK);
    assert_eq!(live.text().await.expect("body"), "ok");

    let ready = client
        .get(format!("{base}/health/ready"))
        .send()
        .await
        .expect("readiness request");
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_request_id_echoed() {
    let resp = client()
        .get(format!("{}/health", base_url()))
        .header("x-request-id", "it-live-1")
        .send()
        .await
        .expect("health request");

    assert_eq!(
        resp.headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("it-live-1")
    );
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_bad_login_is_unauthorized() {
    let resp = client()
        .post(format!("{}/api/users/login", base_url()))
        .json(&json!({"username": "nobody-here", "password": "wrong-password"}))
        .send()
        .await
        .expect("login request");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.text().await.expect("body"), "Invalid username or password");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_public_product_list() {
    let resp = client()
        .get(format!("{}/api/products", base_url()))
        .send()
        .await
        .expect("product list request");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("JSON body");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_missing_product_is_404() {
    let resp = client()
        .get(format!("{}/api/products/2147483647", base_url()))
        .send()
        .await
        .expect("product request");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.text().await.expect("body"), "Product not found");
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server, database and admin account"]
async fn test_created_category_is_retrievable() {
    let client = client();
    let auth = admin_bearer(&client).await;
    let name = unique_name("Noodles");

    let created = create_category(
        &client,
        &auth,
        &json!({"name": name, "description": "Pho and bun"}),
    )
    .await;
    let id = created["id"].as_i64().expect("id");

    let resp = get_category(&client, &auth, id).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = resp.json().await.expect("category JSON");
    assert_eq!(fetched["name"], name.as_str());
    assert_eq!(fetched["description"], "Pho and bun");
    assert_eq!(fetched["hidden"], false);

    delete_path(&client, &auth, &format!("/api/categories/{id}")).await;
}

#[tokio::test]
#[ignore = "Requires running API server, database and admin account"]
async fn test_deleted_category_leaves_listing() {
    let client = client();
    let auth = admin_bearer(&client).await;

    let created = create_category(&client, &auth, &json!({"name": unique_name("Desserts")})).await;
    let id = created["id"].as_i64().expect("id");

    delete_path(&client, &auth, &format!("/api/categories/{id}")).await;

    let listed: Value = client
        .get(format!("{}/api/categories", base_url()))
        .header("authorization", &auth)
        .send()
        .await
        .expect("list request")
        .json()
        .await
        .expect("list JSON");
    let ids: Vec<i64> = listed
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|c| c["id"].as_i64())
        .collect();
    assert!(!ids.contains(&id));

    let resp = get_category(&client, &auth, id).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.text().await.expect("body"), "Category not found");

    // A second delete finds nothing visible.
    let resp = client
        .delete(format!("{}/api/categories/{id}", base_url()))
        .header("authorization", &auth)
        .send()
        .await
        .expect("delete request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server, database and admin account"]
async fn test_partial_update_keeps_other_fields() {
    let client = client();
    let auth = admin_bearer(&client).await;
    let name = unique_name("Drinks");

    let created = create_category(
        &client,
        &auth,
        &json!({"name": name, "description": "Cold"}),
    )
    .await;
    let id = created["id"].as_i64().expect("id");

    let resp = client
        .put(format!("{}/api/categories/{id}", base_url()))
        .header("authorization", &auth)
        .json(&json!({"description": "Hot and cold"}))
        .send()
        .await
        .expect("update request");
    assert_eq!(resp.status(), StatusCode::OK);

    let fetched: Value = get_category(&client, &auth, id)
        .await
        .json()
        .await
        .expect("category JSON");
    assert_eq!(fetched["name"], name.as_str());
    assert_eq!(fetched["description"], "Hot and cold");

    delete_path(&client, &auth, &format!("/api/categories/{id}")).await;
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server, database and admin account"]
async fn test_adding_same_cart_item_twice_sums_quantity() {
    let client = client();
    let base = base_url();
    let auth = admin_bearer(&client).await;

    let admin: Value = client
        .get(format!("{base}/api/users/by-username/{}", admin_username()))
        .header("authorization", &auth)
        .send()
        .await
        .expect("user request")
        .json()
        .await
        .expect("user JSON");
    let user_id = admin["id"].as_i64().expect("user id");

    let form = Form::new()
        .text("name", unique_name("Banh mi"))
        .text("price", "25000")
        .text("stock_quantity", "10");
    let resp = client
        .post(format!("{base}/api/products"))
        .header("authorization", &auth)
        .multipart(form)
        .send()
        .await
        .expect("create product request");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let product: Value = resp.json().await.expect("product JSON");
    let product_id = product["id"].as_i64().expect("product id");

    let line = json!({"product_id": product_id, "user_id": user_id, "quantity": 2});
    let first = client
        .post(format!("{base}/api/cart-items"))
        .header("authorization", &auth)
        .json(&line)
        .send()
        .await
        .expect("first add");
    assert_eq!(first.status(), StatusCode::CREATED);
    let first: Value = first.json().await.expect("cart JSON");
    assert_eq!(first["quantity"], 2);

    let line = json!({"product_id": product_id, "user_id": user_id, "quantity": 3});
    let second = client
        .post(format!("{base}/api/cart-items"))
        .header("authorization", &auth)
        .json(&line)
        .send()
        .await
        .expect("second add");
    assert_eq!(second.status(), StatusCode::OK);
    let second: Value = second.json().await.expect("cart JSON");
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["quantity"], 5);

    let cart_item_id = second["id"].as_i64().expect("cart item id");
    delete_path(&client, &auth, &format!("/api/cart-items/{cart_item_id}")).await;
    delete_path(&client, &auth, &format!("/api/products/{product_id}")).await;
}
