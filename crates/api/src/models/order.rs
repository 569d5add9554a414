//! Orders, their line items and status timeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use food_app_core::{
    AddressId, OrderHistoryId, OrderId, PaymentMethodId, Price, ProductId, PromotionId, UserId,
};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_id: Option<PaymentMethodId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_id: Option<AddressId>,
    pub total: Price,
    pub status: i32,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub hidden: bool,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_name: Option<String>,
}

/// A new order. The total is taken as given.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    pub user_id: UserId,
    pub payment_method_id: Option<PaymentMethodId>,
    pub address_id: Option<AddressId>,
    #[serde(default = "zero_total")]
    pub total: Price,
    #[serde(default)]
    pub status: i32,
}

const fn zero_total() -> Price {
    Price::ZERO
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderUpdate {
    pub user_id: Option<UserId>,
    pub payment_method_id: Option<PaymentMethodId>,
    pub address_id: Option<AddressId>,
    pub total: Option<Price>,
    pub status: Option<i32>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_promotion_id: Option<PromotionId>,
    pub product_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    #[serde(default = "one")]
    pub quantity: i32,
    pub note: Option<String>,
    pub applied_promotion_id: Option<PromotionId>,
}

const fn one() -> i32 {
    1
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderItemUpdate {
    pub quantity: Option<i32>,
    pub note: Option<String>,
    pub applied_promotion_id: Option<PromotionId>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderHistoryEntry {
    pub id: OrderHistoryId,
    pub order_id: OrderId,
    pub status: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub hidden: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderHistoryEntry {
    pub order_id: OrderId,
    #[serde(default)]
    pub status: i32,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderHistoryUpdate {
    pub status: Option<i32>,
    pub note: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_order_defaults() {
        let order: NewOrder = serde_json::from_str(r#"{"user_id":7}"#).unwrap();
        assert_eq!(order.user_id.as_i32(), 7);
        assert_eq!(order.total, Price::ZERO);
        assert_eq!(order.status, 0);
        assert!(order.address_id.is_none());
    }

    #[test]
    fn test_new_order_item_default_quantity() {
        let item: NewOrderItem = serde_json::from_str(r#"{"order_id":1,"product_id":2}"#).unwrap();
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_order_omits_absent_names() {
        let order = Order {
            id: OrderId::new(3),
            user_id: UserId::new(7),
            payment_method_id: None,
            address_id: None,
            total: Price::parse("120000.00").unwrap(),
            status: 1,
            created_at: Utc::now(),
            updated_at: None,
            hidden: false,
            user_name: "Lan".to_string(),
            payment_method_name: None,
            address_name: None,
        };

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["user_name"], "Lan");
        assert_eq!(json["total"], "120000.00");
        assert!(json.get("payment_method_name").is_none());
        assert!(json.get("updated_at").is_none());
    }
}
