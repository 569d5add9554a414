//! Catalog reference data: categories, suppliers and payment methods.
//!
//! Categories and suppliers are returned together with the visible products
//! that reference them, as [`ProductSummary`] entries.

use serde::{Deserialize, Serialize};

use food_app_core::{
    CategoryId, Email, PaymentMethodId, PhoneNumber, Price, ProductId, SupplierId,
};

/// The short form of a product nested inside a category or supplier.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub status: i32,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub hidden: bool,
    #[sqlx(skip)]
    pub products: Vec<ProductSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<PhoneNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    pub hidden: bool,
    pub products: Vec<ProductSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<PhoneNumber>,
    pub email: Option<Email>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplierUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<PhoneNumber>,
    pub email: Option<Email>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub hidden: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPaymentMethod {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentMethodUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}
