//! Cross-crate contracts: token round trips, JSON shapes, error statuses,
//! Cloudinary signing and the column widths the validators assume, all over
//! public types.

use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{Duration, Utc};
use food_app_api::cloudinary::{public_id_from_url, sign_params};
use food_app_api::config::CorsOrigins;
use food_app_api::db::{RepositoryError, SearchKeyword};
use food_app_api::error::AppError;
use food_app_api::middleware::AuthUser;
use food_app_api::models::user::USERNAME_MAX;
use food_app_api::models::{ADDRESS_MAX, Category, NAME_MAX, ProductSummary};
use food_app_api::services::TokenError;
use food_app_core::{CategoryId, Email, PhoneNumber, Price, ProductId, Role, UserId};
use food_app_integration_tests::test_issuer;
use serde_json::json;

// ============================================================================
// Tokens
// ============================================================================

#[test]
fn test_token_carries_identity_into_auth_user() {
    let issuer = test_issuer();
    let issued = issuer
        .issue(UserId::new(42), "lan", Role::Admin)
        .expect("token signs");

    let claims = issuer.verify(&issued.token).expect("token verifies");
    let user = AuthUser::try_from(claims).expect("numeric subject");

    assert_eq!(user.id, UserId::new(42));
    assert_eq!(user.username, "lan");
    assert!(user.is_admin());
    assert!(user.can_act_for(UserId::new(7)));
}

#[test]
fn test_token_expires_after_ttl() {
    let issuer = test_issuer();
    let issued_at = Utc::now() - Duration::hours(3);
    let issued = issuer
        .issue_at(UserId::new(1), "old", Role::User, issued_at)
        .expect("token signs");

    assert_eq!(issued.expiration, issued_at + Duration::minutes(60));
    assert_eq!(issuer.verify(&issued.token), Err(TokenError::Expired));
}

#[test]
fn test_issued_token_json_shape() {
    let issued = test_issuer()
        .issue(UserId::new(3), "minh", Role::User)
        .expect("token signs");
    let value = serde_json::to_value(&issued).expect("serializes");

    assert!(value["token"].as_str().is_some_and(|t| t.split('.').count() == 3));
    assert!(value["expiration"].is_string());
}

// ============================================================================
// JSON shapes
// ============================================================================

#[test]
fn test_absent_optional_fields_are_omitted() {
    let category = Category {
        id: CategoryId::new(2),
        name: "Noodles".to_string(),
        description: None,
        hidden: false,
        products: vec![ProductSummary {
            id: ProductId::new(9),
            name: "Pho bo".to_string(),
            price: Price::parse("12.5").expect("valid price"),
            status: 1,
        }],
    };

    let value = serde_json::to_value(&category).expect("serializes");
    assert!(value.get("description").is_none());
    assert_eq!(
        value,
        json!({
            "id": 2,
            "name": "Noodles",
            "hidden": false,
            "products": [{"id": 9, "name": "Pho bo", "price": "12.50", "status": 1}]
        })
    );
}

// ============================================================================
// Error statuses
// ============================================================================

async fn render(error: AppError) -> (StatusCode, String) {
    let response = error.into_response();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 4096)
        .await
        .expect("body fits");
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

#[tokio::test]
async fn test_not_found_names_entity() {
    let (status, body) = render(AppError::NotFound("Product")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Product not found");
}

#[tokio::test]
async fn test_conflict_is_409() {
    let (status, body) = render(AppError::from(RepositoryError::Conflict(
        "duplicate value violates app_user_username_key".to_string(),
    )))
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("app_user_username_key"));
}

#[tokio::test]
async fn test_internal_details_hidden() {
    let (status, body) = render(AppError::from(RepositoryError::DataCorruption(
        "invalid phone in database: +84 abc".to_string(),
    )))
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal server error");
}

#[tokio::test]
async fn test_rejected_value_is_400() {
    let (status, body) = render(AppError::from(RepositoryError::InvalidValue(
        "value too long for column".to_string(),
    )))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid value: value too long for column");
}

// ============================================================================
// Schema
// ============================================================================

const SCHEMA: &str = include_str!("../../api/migrations/20250101000000_create_food_schema.sql");

/// Column type of every `column` definition in the schema.
fn column_types(column: &str) -> Vec<String> {
    SCHEMA
        .lines()
        .filter_map(|line| {
            let mut words = line.split_whitespace();
            (words.next() == Some(column)).then(|| words.next().unwrap_or("").to_string())
        })
        .collect()
}

#[test]
fn test_phone_columns_hold_canonical_phone() {
    let types = column_types("phone");
    assert_eq!(types.len(), 2);
    for ty in types {
        assert_eq!(ty, format!("VARCHAR({})", PhoneNumber::MAX_LENGTH));
    }
}

#[test]
fn test_text_columns_match_validators() {
    let name = format!("VARCHAR({NAME_MAX})");
    let names = column_types("name");
    assert!(names.len() >= 9);
    assert!(names.iter().all(|ty| *ty == name), "{names:?}");
    assert!(column_types("category").iter().all(|ty| *ty == name));

    let address = format!("VARCHAR({ADDRESS_MAX})");
    let addresses = column_types("address");
    assert_eq!(addresses.len(), 2);
    assert!(addresses.iter().all(|ty| *ty == address), "{addresses:?}");

    assert_eq!(column_types("username"), [format!("VARCHAR({USERNAME_MAX})")]);
    for ty in column_types("email") {
        assert_eq!(ty, format!("VARCHAR({})", Email::MAX_LENGTH));
    }
}

// ============================================================================
// Search, CORS and Cloudinary
// ============================================================================

#[test]
fn test_search_keyword_is_literal() {
    let keyword = SearchKeyword::parse(" 100%_real ").expect("non-blank");
    assert_eq!(keyword.as_str(), "100%_real");
    assert_eq!(keyword.pattern(), "%100\\%\\_real%");
}

#[test]
fn test_cors_origins_from_env_value() {
    assert_eq!(CorsOrigins::parse("*"), CorsOrigins::Any);
    assert_eq!(
        CorsOrigins::parse("https://food.example, https://admin.food.example"),
        CorsOrigins::List(vec![
            "https://food.example".to_string(),
            "https://admin.food.example".to_string(),
        ])
    );
}

#[test]
fn test_upload_signature_vector() {
    let signature = sign_params(
        &[
            ("timestamp", "1700000000"),
            ("transformation", "c_limit,h_800,w_800"),
            ("folder", "food/products"),
        ],
        "topsecret",
    );
    assert_eq!(
        signature,
        "1cc9791b3bd151f68fe7a83c82f5467e77968757b68feec66780a0c10ea62861"
    );
}

#[test]
fn test_destroy_signature_uses_recovered_public_id() {
    let public_id = public_id_from_url(
        "https://res.cloudinary.com/demo-cloud/image/upload/v1712345678/user-images/abc.jpg",
    )
    .expect("delivery URL");
    assert_eq!(public_id, "user-images/abc");

    let signature = sign_params(
        &[("public_id", public_id.as_str()), ("timestamp", "1700000000")],
        "topsecret",
    );
    assert_eq!(
        signature,
        "968dbdd378d7496e23f01ee6427bf14e289e8c630b152a7e9a58d1e8c65ec969"
    );
}
