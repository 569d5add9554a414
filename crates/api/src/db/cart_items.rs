//! Cart repository.
//!
//! `(user_id, product_id)` is unique; adding a product already in the cart
//! grows the existing line in the same statement.

use sqlx::PgPool;
use tracing::instrument;

use food_app_core::{CartItemId, ProductId, UserId};

use super::{RepositoryError, SearchKeyword, map_write_error};
use crate::models::cart::CartItem;

const CART_SELECT: &str = "SELECT ci.id, ci.product_id, ci.user_id, ci.quantity, \
                                  u.name AS user_name, p.name AS product_name \
                           FROM food.cart_item ci \
                           JOIN food.app_user u ON u.id = ci.user_id \
                           JOIN food.product p ON p.id = ci.product_id";

/// Outcome of adding a product to a cart.
#[derive(Debug, Clone)]
pub enum CartMerge {
    /// A new line was created.
    Inserted(CartItem),
    /// An existing line's quantity was increased.
    Merged(CartItem),
}

pub struct CartItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartItemRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<CartItem>, RepositoryError> {
        let sql = format!("{CART_SELECT} ORDER BY ci.id");
        Ok(sqlx::query_as::<_, CartItem>(&sql)
            .fetch_all(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CartItemId) -> Result<Option<CartItem>, RepositoryError> {
        let sql = format!("{CART_SELECT} WHERE ci.id = $1");
        Ok(sqlx::query_as::<_, CartItem>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// All lines in one user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn by_user(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let sql = format!("{CART_SELECT} WHERE ci.user_id = $1 ORDER BY ci.id");
        Ok(sqlx::query_as::<_, CartItem>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?)
    }

    /// Lines whose id or product name contains the keyword.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, keyword: &SearchKeyword) -> Result<Vec<CartItem>, RepositoryError> {
        let sql = format!(
            "{CART_SELECT} WHERE ci.id::text ILIKE $1 OR p.name ILIKE $1 ORDER BY ci.id"
        );
        Ok(sqlx::query_as::<_, CartItem>(&sql)
            .bind(keyword.pattern())
            .fetch_all(self.pool)
            .await?)
    }

    /// Add `quantity` of a product to a user's cart.
    ///
    /// `xmax = 0` on the returned row tells a fresh insert from an update of
    /// the conflicting line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user or product does not exist.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartMerge, RepositoryError> {
        let (id, inserted): (CartItemId, bool) = sqlx::query_as(
            "INSERT INTO food.cart_item AS ci (product_id, user_id, quantity) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, product_id) \
             DO UPDATE SET quantity = ci.quantity + EXCLUDED.quantity \
             RETURNING ci.id, (ci.xmax = 0) AS inserted",
        )
        .bind(product_id)
        .bind(user_id)
        .bind(quantity)
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        let item = self.get(id).await?.ok_or(RepositoryError::NotFound)?;
        Ok(if inserted {
            CartMerge::Inserted(item)
        } else {
            CartMerge::Merged(item)
        })
    }

    /// Change the quantity of the line for (user, product).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no such line.
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: Option<i32>,
    ) -> Result<CartItem, RepositoryError> {
        let updated: Option<(CartItemId,)> = sqlx::query_as(
            "UPDATE food.cart_item SET quantity = COALESCE($3, quantity) \
             WHERE user_id = $1 AND product_id = $2 \
             RETURNING id",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(self.pool)
        .await
        .map_err(map_write_error)?;

        let (id,) = updated.ok_or(RepositoryError::NotFound)?;
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not exist.
    pub async fn delete(&self, id: CartItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM food.cart_item WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
