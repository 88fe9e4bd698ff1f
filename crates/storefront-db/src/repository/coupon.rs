//! # Coupon Repository
//!
//! Coupon lookup/creation and the atomic redemption step.
//!
//! ## Redemption Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    0. UPDATE coupons SET code = code WHERE code = ?   ← write lock now, │
//! │                                                    before any read      │
//! │    1. SELECT coupon WHERE code = canonical(code)                        │
//! │    2. coupon::validate(coupon, order_total, now)   ← same rules as the  │
//! │                                                       read-only check   │
//! │    3. UPDATE coupons SET current_uses = current_uses + 1                │
//! │         WHERE id = ? AND (max_uses IS NULL OR current_uses < max_uses)  │
//! │         └── 0 rows? another checkout took the last slot → rejected     │
//! │    4. INSERT coupon_usages (coupon_id, user_id, ...)                    │
//! │         └── UNIQUE(coupon_id, user_id) → AlreadyRedeemed                │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any error drops the transaction, which rolls back steps 3 and 4.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Step 0 matters on a file database. A deferred SQLite transaction that has
//! already read cannot become a writer after another connection commits; it
//! fails with `SQLITE_BUSY` at once instead of waiting. Writing first makes
//! competing redemptions wait out `busy_timeout` and then read the committed
//! row, so the loser sees `AlreadyRedeemed` or `UsageLimitReached`.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use storefront_core::coupon::{self, canonical_code, CouponApplication};
use storefront_core::validation::{
    validate_coupon_code, validate_price_cents, validate_promotion_value, validate_window,
};
use storefront_core::{Coupon, CouponRejection, CouponUsage, Money};

const COUPON_COLUMNS: &str = "id, code, description, discount_value, is_percentage, \
                              minimum_purchase_cents, active, valid_from, valid_to, \
                              max_uses, current_uses, created_at, updated_at";

/// Input for creating a coupon.
#[derive(Debug, Clone)]
pub struct NewCoupon {
    /// Any case/whitespace; stored canonically.
    pub code: String,
    pub description: String,
    /// Hundredths: bps when `is_percentage`, cents otherwise.
    pub discount_value: i64,
    pub is_percentage: bool,
    pub minimum_purchase_cents: i64,
    pub active: bool,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub max_uses: Option<i64>,
}

/// A committed redemption.
#[derive(Debug, Clone)]
pub struct Redemption {
    pub application: CouponApplication,
    pub usage: CouponUsage,
}

/// Repository for coupon database operations.
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Looks a coupon up by code, case- and whitespace-insensitively.
    pub async fn find_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        let code = canonical_code(code);
        debug!(code = %code, "Looking up coupon");

        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE code = ?1"
        ))
        .bind(&code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(coupon)
    }

    /// Creates a coupon with its code in canonical form.
    pub async fn insert(&self, new: &NewCoupon) -> DbResult<Coupon> {
        let code = canonical_code(&new.code);
        validate_coupon_code(&code)?;
        validate_promotion_value(new.discount_value)?;
        validate_price_cents(new.minimum_purchase_cents)?;
        validate_window("coupon", new.valid_from, new.valid_to)?;
        if let Some(max) = new.max_uses {
            if max < 0 {
                return Err(storefront_core::ValidationError::OutOfRange {
                    field: "max_uses".to_string(),
                    min: 0,
                    max: i64::MAX,
                }
                .into());
            }
        }

        let now = Utc::now();
        debug!(code = %code, "Inserting coupon");

        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            r#"
            INSERT INTO coupons (
                code, description, discount_value, is_percentage,
                minimum_purchase_cents, active, valid_from, valid_to,
                max_uses, current_uses, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10, ?10)
            RETURNING {COUPON_COLUMNS}
            "#
        ))
        .bind(&code)
        .bind(&new.description)
        .bind(new.discount_value)
        .bind(new.is_percentage)
        .bind(new.minimum_purchase_cents)
        .bind(new.active)
        .bind(new.valid_from)
        .bind(new.valid_to)
        .bind(new.max_uses)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            err if err.is_unique_violation_on("coupons.code") => DbError::duplicate("code", &code),
            other => other,
        })?;

        info!(id = coupon.id, code = %coupon.code, "Coupon created");
        Ok(coupon)
    }

    /// Records that `user_id` redeemed `code` on an order of `order_total`.
    ///
    /// Re-runs the validator inside the transaction, so a coupon that
    /// expired or ran out between the shopper's check and checkout is
    /// rejected here with the same reason.
    ///
    /// ## Errors
    /// - `DbError::CouponRejected` for any validator failure, including a
    ///   lost race for the last use
    /// - `DbError::AlreadyRedeemed` when the user already has a usage row
    pub async fn redeem(
        &self,
        code: &str,
        user_id: &str,
        order_total: Money,
        now: DateTime<Utc>,
    ) -> DbResult<Redemption> {
        let code = canonical_code(code);
        let mut tx = self.pool.begin().await?;
        lock_for_write(&mut tx, &code).await?;

        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE code = ?1"
        ))
        .bind(&code)
        .fetch_optional(&mut *tx)
        .await?;

        let application = coupon::validate(coupon.as_ref(), order_total, now)?;

        claim_use(&mut tx, application.coupon_id).await?;

        let usage = sqlx::query_as::<_, CouponUsage>(
            r#"
            INSERT INTO coupon_usages (
                coupon_id, user_id, used_at, order_total_cents, discount_amount_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, coupon_id, user_id, used_at, order_total_cents, discount_amount_cents
            "#,
        )
        .bind(application.coupon_id)
        .bind(user_id)
        .bind(now)
        .bind(order_total.cents())
        .bind(application.discount_amount.cents())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            err if err.is_unique_violation_on("coupon_usages.") => DbError::AlreadyRedeemed,
            other => other,
        })?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            coupon_id = application.coupon_id,
            user_id = %user_id,
            discount_cents = application.discount_amount.cents(),
            "Coupon redeemed"
        );

        Ok(Redemption { application, usage })
    }

    /// Lists usage rows of a coupon, oldest first.
    pub async fn usages(&self, coupon_id: i64) -> DbResult<Vec<CouponUsage>> {
        let usages = sqlx::query_as::<_, CouponUsage>(
            r#"
            SELECT id, coupon_id, user_id, used_at, order_total_cents, discount_amount_cents
            FROM coupon_usages
            WHERE coupon_id = ?1
            ORDER BY id
            "#,
        )
        .bind(coupon_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(usages)
    }
}

/// Makes the transaction a writer before it reads anything.
///
/// Matching no row is fine: the statement still takes the database write
/// lock, waiting up to `busy_timeout` for another redemption to finish.
async fn lock_for_write(tx: &mut Transaction<'_, Sqlite>, code: &str) -> DbResult<()> {
    sqlx::query("UPDATE coupons SET code = code WHERE code = ?1")
        .bind(code)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Compare-and-set increment of `current_uses`.
async fn claim_use(tx: &mut Transaction<'_, Sqlite>, coupon_id: i64) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE coupons
        SET current_uses = current_uses + 1, updated_at = ?2
        WHERE id = ?1 AND (max_uses IS NULL OR current_uses < max_uses)
        "#,
    )
    .bind(coupon_id)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        warn!(coupon_id, "Coupon ran out of uses during redemption");
        return Err(CouponRejection::UsageLimitReached.into());
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
