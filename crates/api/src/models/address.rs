//! Delivery addresses.

use serde::{Deserialize, Serialize};

use food_app_core::{AddressId, UserId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub hidden: bool,
    /// Owner's display name.
    pub user_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAddress {
    pub user_id: UserId,
    pub name: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressUpdate {
    pub user_id: Option<UserId>,
    pub name: Option<String>,
    pub address: Option<String>,
}
