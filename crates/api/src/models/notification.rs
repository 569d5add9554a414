//! Notifications, either broadcast or addressed to one user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use food_app_core::{NotificationId, UserId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Notification {
    pub id: NotificationId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_condition: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewNotification {
    pub user_id: Option<UserId>,
    pub name: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub trigger_condition: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationUpdate {
    pub user_id: Option<UserId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub trigger_condition: Option<String>,
}
