//! # Discount Repository
//!
//! Discounts and their many-to-many link to products.
//!
//! ```text
//! discounts ──< discount_products >── products
//! ```
//!
//! A [`Discount`] is always returned with its full `product_ids` set, so the
//! evaluator can check membership without another query.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use storefront_core::validation::{validate_name, validate_promotion_value, validate_window};
use storefront_core::{Discount, DiscountKind};

/// Input for creating a discount.
#[derive(Debug, Clone)]
pub struct NewDiscount {
    pub name: String,
    pub description: String,
    pub kind: DiscountKind,
    /// Hundredths: bps for percentage, cents for fixed.
    pub value: i64,
    pub active: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub product_ids: Vec<i64>,
}

/// Stored discount row, before the product links are attached.
#[derive(Debug, sqlx::FromRow)]
struct DiscountRow {
    id: i64,
    name: String,
    description: String,
    kind: DiscountKind,
    value: i64,
    active: bool,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DiscountRow {
    fn into_discount(self, product_ids: Vec<i64>) -> Discount {
        Discount {
            id: self.id,
            name: self.name,
            description: self.description,
            kind: self.kind,
            value: self.value,
            active: self.active,
            start_date: self.start_date,
            end_date: self.end_date,
            product_ids,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Repository for discount database operations.
#[derive(Debug, Clone)]
pub struct DiscountRepository {
    pool: SqlitePool,
}

impl DiscountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DiscountRepository { pool }
    }

    /// Lists discounts ordered by id, optionally only those attached to `product_id`.
    pub async fn list(&self, product_id: Option<i64>) -> DbResult<Vec<Discount>> {
        let rows = match product_id {
            Some(pid) => {
                sqlx::query_as::<_, DiscountRow>(
                    r#"
                    SELECT id, name, description, kind, value, active,
                           start_date, end_date, created_at, updated_at
                    FROM discounts
                    WHERE id IN (SELECT discount_id FROM discount_products WHERE product_id = ?1)
                    ORDER BY id
                    "#,
                )
                .bind(pid)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, DiscountRow>(
                    r#"
                    SELECT id, name, description, kind, value, active,
                           start_date, end_date, created_at, updated_at
                    FROM discounts
                    ORDER BY id
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut links = self.product_links().await?;

        let discounts: Vec<Discount> = rows
            .into_iter()
            .map(|row| {
                let ids = links.remove(&row.id).unwrap_or_default();
                row.into_discount(ids)
            })
            .collect();

        debug!(count = discounts.len(), product_id = ?product_id, "Loaded discounts");
        Ok(discounts)
    }

    /// Discount id → attached product ids.
    async fn product_links(&self) -> DbResult<HashMap<i64, Vec<i64>>> {
        let pairs: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT discount_id, product_id FROM discount_products ORDER BY discount_id, product_id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut links: HashMap<i64, Vec<i64>> = HashMap::new();
        for (discount_id, product_id) in pairs {
            links.entry(discount_id).or_default().push(product_id);
        }
        Ok(links)
    }

    /// Creates a discount and links it to its products in one transaction.
    ///
    /// Rejects values outside 0.00-100.00, windows that end before they
    /// start, and unknown product ids.
    pub async fn insert(&self, new: &NewDiscount) -> DbResult<Discount> {
        validate_name(&new.name)?;
        validate_promotion_value(new.value)?;
        validate_window("discount", new.start_date, new.end_date)?;

        let mut product_ids = new.product_ids.clone();
        product_ids.sort_unstable();
        product_ids.dedup();

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, DiscountRow>(
            r#"
            INSERT INTO discounts (
                name, description, kind, value, active,
                start_date, end_date, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            RETURNING id, name, description, kind, value, active,
                      start_date, end_date, created_at, updated_at
            "#,
        )
        .bind(new.name.trim())
        .bind(&new.description)
        .bind(new.kind)
        .bind(new.value)
        .bind(new.active)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        for product_id in &product_ids {
            sqlx::query("INSERT INTO discount_products (discount_id, product_id) VALUES (?1, ?2)")
                .bind(row.id)
                .bind(product_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| match DbError::from(e) {
                    DbError::ForeignKeyViolation { .. } => DbError::not_found("Product", product_id),
                    other => other,
                })?;
        }

        tx.commit().await?;

        info!(id = row.id, kind = ?row.kind, value = row.value, products = product_ids.len(), "Discount created");
        Ok(row.into_discount(product_ids))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
