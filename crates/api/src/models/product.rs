//! Products.

use chrono::{DateTime, Utc};
use serde::Serialize;

use food_app_core::{CategoryId, Price, ProductId, SupplierId};

/// Upper bound on stored image URLs per product.
pub const MAX_IMAGES: usize = 5;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<SupplierId>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Price,
    pub stock_quantity: i32,
    pub status: i32,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_name: Option<String>,
}

/// A product to insert. `images` holds already-uploaded URLs.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category_id: Option<CategoryId>,
    pub supplier_id: Option<SupplierId>,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock_quantity: i32,
    pub status: i32,
    pub images: Vec<String>,
}

/// Changes to a product. `images: Some(..)` replaces the whole set.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub category_id: Option<CategoryId>,
    pub supplier_id: Option<SupplierId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub stock_quantity: Option<i32>,
    pub status: Option<i32>,
    pub images: Option<Vec<String>>,
}
