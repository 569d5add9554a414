//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use food_app_core::{Email, PhoneNumber, Role, UserId};

pub use super::NAME_MAX;

/// Width of `food.app_user.username`.
pub const USERNAME_MAX: usize = 50;

/// An account. The password hash stays in the repository layer.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    pub phone: PhoneNumber,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub username: String,
    pub role: Role,
    pub hidden: bool,
    pub registered_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A validated registration, with the password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Option<Email>,
    pub phone: PhoneNumber,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub avatar_url: Option<String>,
}

/// Fields to change on an existing account.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub phone: Option<PhoneNumber>,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub avatar_url: Option<String>,
}
