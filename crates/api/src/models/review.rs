//! Product reviews.

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use food_app_core::{ProductId, ReviewId, UserId};

/// Accepted star ratings.
pub const STARS: RangeInclusive<i32> = 1..=5;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub stars: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub reviewed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub hidden: bool,
    pub user_name: String,
    pub product_name: String,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub stars: i32,
    pub content: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewUpdate {
    pub stars: Option<i32>,
    pub content: Option<String>,
}
