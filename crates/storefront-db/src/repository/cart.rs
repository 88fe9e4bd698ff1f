//! # Cart Repository
//!
//! Carts are opaque UUID tokens owning a list of rows. Every add inserts a
//! new row; rows for the same product are never merged.
//!
//! ## Cart Lifecycle
//! ```text
//! POST /cart ──► open() ──► "550e8400-..."
//!                              │
//!        add_item() ──────────►│◄────────── update_quantity() / remove_item()
//!                              │
//!                              ▼
//!                lines() ──► cart::aggregate() ──► total, count
//!                              │
//!                              ▼
//!                  checkout ──► remove_lines(paid lines)
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::catalog::ProductRepository;
use storefront_core::validation::{validate_cart_id, validate_cart_size, validate_quantity};
use storefront_core::{CartItem, CartLine, ValidationError};

/// Repository for cart database operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Opens a new empty cart and returns its id.
    pub async fn open(&self) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO carts (id, created_at) VALUES (?1, ?2)")
            .bind(&id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        debug!(cart_id = %id, "Cart opened");
        Ok(id)
    }

    /// Fails with NotFound unless `cart_id` names an open cart.
    pub async fn ensure_exists(&self, cart_id: &str) -> DbResult<()> {
        validate_cart_id(cart_id).map_err(|_| DbError::not_found("Cart", cart_id))?;

        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM carts WHERE id = ?1")
            .bind(cart_id)
            .fetch_optional(&self.pool)
            .await?;

        match found {
            Some(_) => Ok(()),
            None => Err(DbError::not_found("Cart", cart_id)),
        }
    }

    /// Cart rows joined with each product's current base price, oldest first.
    pub async fn lines(&self, cart_id: &str) -> DbResult<Vec<CartLine>> {
        let lines = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT
                ci.id          AS item_id,
                ci.product_id  AS product_id,
                p.name         AS product_name,
                p.price_cents  AS unit_price_cents,
                ci.quantity    AS quantity
            FROM cart_items ci
            INNER JOIN products p ON p.id = ci.product_id
            WHERE ci.cart_id = ?1
            ORDER BY ci.id
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Adds a row for `product_id`.
    ///
    /// The product must be available with enough stock for `quantity`.
    pub async fn add_item(&self, cart_id: &str, product_id: i64, quantity: i64) -> DbResult<CartItem> {
        validate_quantity(quantity)?;
        self.ensure_exists(cart_id).await?;

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_items WHERE cart_id = ?1")
            .bind(cart_id)
            .fetch_one(&self.pool)
            .await?;
        validate_cart_size(rows as usize)?;

        self.ensure_sellable(product_id, quantity).await?;

        let item = sqlx::query_as::<_, CartItem>(
            r#"
            INSERT INTO cart_items (cart_id, product_id, quantity, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, cart_id, product_id, quantity, created_at
            "#,
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        debug!(cart_id = %cart_id, item_id = item.id, product_id, quantity, "Cart item added");
        Ok(item)
    }

    /// Changes the quantity of one row, under the same stock rule as
    /// [`CartRepository::add_item`].
    pub async fn update_quantity(&self, cart_id: &str, item_id: i64, quantity: i64) -> DbResult<CartItem> {
        validate_quantity(quantity)?;

        let product_id: i64 =
            sqlx::query_scalar("SELECT product_id FROM cart_items WHERE cart_id = ?1 AND id = ?2")
                .bind(cart_id)
                .bind(item_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| DbError::not_found("Cart item", item_id))?;
        self.ensure_sellable(product_id, quantity).await?;

        let item = sqlx::query_as::<_, CartItem>(
            r#"
            UPDATE cart_items SET quantity = ?3
            WHERE cart_id = ?1 AND id = ?2
            RETURNING id, cart_id, product_id, quantity, created_at
            "#,
        )
        .bind(cart_id)
        .bind(item_id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Cart item", item_id))?;

        Ok(item)
    }

    /// Removes one row.
    pub async fn remove_item(&self, cart_id: &str, item_id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = ?1 AND id = ?2")
            .bind(cart_id)
            .bind(item_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart item", item_id));
        }
        Ok(())
    }

    /// Removes the rows a checkout was charged for.
    ///
    /// A row is removed only if it still has the quantity that was summed, so
    /// items added or changed after the cart was totalled stay in the cart.
    /// Returns how many rows were removed.
    pub async fn remove_lines(&self, cart_id: &str, lines: &[CartLine]) -> DbResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut removed = 0;

        for line in lines {
            removed += sqlx::query(
                "DELETE FROM cart_items WHERE cart_id = ?1 AND id = ?2 AND quantity = ?3",
            )
            .bind(cart_id)
            .bind(line.item_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(cart_id = %cart_id, removed, "Paid cart rows removed");
        Ok(removed)
    }

    /// The product must be listed with at least `quantity` units in stock.
    async fn ensure_sellable(&self, product_id: i64, quantity: i64) -> DbResult<()> {
        let product = ProductRepository::new(self.pool.clone())
            .get_by_id(product_id)
            .await?
            .filter(|p| p.available)
            .ok_or_else(|| DbError::not_found("Product", product_id))?;

        if !product.can_sell(quantity) {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: product.stock,
            }
            .into());
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
