//! Database operations for the food ordering `PostgreSQL` database.
//!
//! ## Tables (schema `food`)
//!
//! - `app_user` - Accounts with Argon2 password hashes and roles
//! - `address` - Delivery addresses owned by a user
//! - `category`, `supplier` - Product classification and sourcing
//! - `product` - Catalog entries with up to five image URLs
//! - `payment_method` - Accepted payment options
//! - `promotion_type`, `promotion`, `promotion_product` - Discounts
//! - `customer_order`, `order_item`, `order_history` - Orders and their timeline
//! - `cart_item` - One line per (user, product)
//! - `review` - Star ratings with optional photo
//! - `notification` - Messages shown to users
//!
//! Every table except the link tables and `cart_item` carries a `hidden`
//! flag. Deletes set it; reads filter on it.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p food-app-cli -- migrate
//! ```

pub mod addresses;
pub mod cart_items;
pub mod categories;
pub mod notifications;
pub mod order_history;
pub mod order_items;
pub mod orders;
pub mod payment_methods;
pub mod products;
pub mod promotion_products;
pub mod promotion_types;
pub mod promotions;
pub mod reviews;
pub mod suppliers;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::AddressRepository;
pub use cart_items::{CartItemRepository, CartMerge};
pub use categories::CategoryRepository;
pub use notifications::NotificationRepository;
pub use order_history::OrderHistoryRepository;
pub use order_items::OrderItemRepository;
pub use orders::OrderRepository;
pub use payment_methods::PaymentMethodRepository;
pub use products::ProductRepository;
pub use promotion_products::PromotionProductRepository;
pub use promotion_types::PromotionTypeRepository;
pub use promotions::PromotionRepository;
pub use reviews::ReviewRepository;
pub use suppliers::SupplierRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (duplicate key or dangling reference).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The database rejected a value as out of range for its column.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Describe a SQLSTATE that means the client sent a value the column cannot
/// hold.
fn rejected_value(sqlstate: &str) -> Option<&'static str> {
    match sqlstate {
        "22001" => Some("value too long for column"),
        "22003" => Some("numeric value out of range"),
        "23502" => Some("required value missing"),
        "23514" => Some("value fails check constraint"),
        _ => None,
    }
}

/// Classify a failed write.
///
/// Unique and foreign-key violations become [`RepositoryError::Conflict`]
/// carrying the violated constraint name. Over-long strings, numeric
/// overflow, null and check violations become
/// [`RepositoryError::InvalidValue`]. Everything else stays a database error.
pub(crate) fn map_write_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        let constraint = db_err.constraint().unwrap_or("unknown").to_owned();
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(format!("duplicate value violates {constraint}"));
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::Conflict(format!("referenced row missing for {constraint}"));
        }
        if let Some(reason) = db_err.code().as_deref().and_then(rejected_value) {
            tracing::debug!(error = %db_err, "Write rejected by column constraint");
            return match db_err.constraint() {
                Some(name) => RepositoryError::InvalidValue(format!("{reason} ({name})")),
                None => RepositoryError::InvalidValue(reason.to_owned()),
            };
        }
    }
    RepositoryError::Database(e)
}

/// Set `hidden` on one visible row of `table`.
///
/// `table` is always a literal from this crate, never user input.
pub(crate) async fn soft_delete(
    pool: &PgPool,
    table: &'static str,
    id: i32,
) -> Result<(), RepositoryError> {
    let sql = format!("UPDATE {table} SET hidden = TRUE WHERE id = $1 AND hidden = FALSE");
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    tracing::debug!(table, id, "Row hidden");
    Ok(())
}

/// A validated search keyword.
///
/// Holds the trimmed keyword, and an `ILIKE` pattern that matches it as a
/// literal substring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchKeyword {
    keyword: String,
    pattern: String,
}

impl SearchKeyword {
    /// Returns `None` when the keyword is blank.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let keyword = raw.trim();
        if keyword.is_empty() {
            return None;
        }

        let mut pattern = String::with_capacity(keyword.len() + 2);
        pattern.push('%');
        for c in keyword.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');

        Some(Self {
            keyword: keyword.to_owned(),
            pattern,
        })
    }

    /// The trimmed keyword, compared against ids rendered as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.keyword
    }

    /// `%keyword%` with `%`, `_` and `\` escaped.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_value_classifies_client_errors() {
        assert_eq!(rejected_value("22001"), Some("value too long for column"));
        assert_eq!(rejected_value("22003"), Some("numeric value out of range"));
        assert_eq!(rejected_value("23514"), Some("value fails check constraint"));
        assert_eq!(rejected_value("23502"), Some("required value missing"));
    }

    #[test]
    fn test_rejected_value_leaves_server_errors() {
        // deadlock, connection failure, duplicate key
        assert_eq!(rejected_value("40P01"), None);
        assert_eq!(rejected_value("08006"), None);
        assert_eq!(rejected_value("23505"), None);
    }

    #[test]
    fn test_map_write_error_keeps_non_database_errors() {
        let err = map_write_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn test_search_keyword_blank() {
        assert!(SearchKeyword::parse("").is_none());
        assert!(SearchKeyword::parse("   \t").is_none());
    }

    #[test]
    fn test_search_keyword_trims() {
        let kw = SearchKeyword::parse("  pho ").unwrap();
        assert_eq!(kw.as_str(), "pho");
        assert_eq!(kw.pattern(), "%pho%");
    }

    #[test]
    fn test_search_keyword_escapes_wildcards() {
        let kw = SearchKeyword::parse("50%_off\\").unwrap();
        assert_eq!(kw.pattern(), "%50\\%\\_off\\\\%");
    }
}
