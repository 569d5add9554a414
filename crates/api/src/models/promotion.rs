//! Promotions, their types, and the products they apply to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use food_app_core::{Price, ProductId, PromotionId, PromotionTypeId};

/// The short form of a promotion nested inside its type.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PromotionSummary {
    pub id: PromotionId,
    pub name: String,
    pub value: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PromotionType {
    pub id: PromotionTypeId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub hidden: bool,
    #[sqlx(skip)]
    pub promotions: Vec<PromotionSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPromotionType {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromotionTypeUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Promotion {
    pub id: PromotionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_id: Option<PromotionTypeId>,
    pub name: String,
    pub value: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPromotion {
    pub type_id: Option<PromotionTypeId>,
    pub name: String,
    pub value: Price,
    pub conditions: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromotionUpdate {
    pub type_id: Option<PromotionTypeId>,
    pub name: Option<String>,
    pub value: Option<Price>,
    pub conditions: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// A promotion may not end before it starts. Open-ended windows are valid.
#[must_use]
pub fn is_valid_window(starts_at: Option<DateTime<Utc>>, ends_at: Option<DateTime<Utc>>) -> bool {
    match (starts_at, ends_at) {
        (Some(start), Some(end)) => end >= start,
        _ => true,
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PromotionProduct {
    pub product_id: ProductId,
    pub promotion_id: PromotionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicable_quantity: Option<i32>,
    pub product_name: String,
    pub promotion_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPromotionProduct {
    pub product_id: ProductId,
    pub promotion_id: PromotionId,
    pub applicable_quantity: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromotionProductUpdate {
    pub applicable_quantity: Option<i32>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_window_validation() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap();

        assert!(is_valid_window(Some(start), Some(end)));
        assert!(is_valid_window(Some(start), Some(start)));
        assert!(!is_valid_window(Some(end), Some(start)));
        assert!(is_valid_window(None, Some(start)));
        assert!(is_valid_window(Some(end), None));
    }

    #[test]
    fn test_new_promotion_accepts_string_value() {
        let promo: NewPromotion =
            serde_json::from_str(r#"{"name":"Lunch deal","value":"15.50","type_id":2}"#).unwrap();
        assert_eq!(promo.value.to_string(), "15.50");
        assert_eq!(promo.type_id.map(|id| id.as_i32()), Some(2));
        assert!(promo.starts_at.is_none());
    }
}
