//! # Pricing Service
//!
//! Wires storage to the pure pricing rules in `storefront_core`. This is the
//! only place that reads the clock for pricing decisions.
//!
//! ```text
//! ProductRepository ──┐
//!                     ├──► pricing::price_product(now) ──► ProductPricing
//! DiscountRepository ─┘
//!
//! CartRepository ─────► cart::aggregate ──► CartSummary
//!                                              │
//! CouponRepository ───► coupon::check/validate(now)
//! ```

use chrono::Utc;
use tracing::{debug, warn};

use storefront_core::cart::{self, CartSummary};
use storefront_core::coupon::{self, CouponApplication};
use storefront_core::pricing::{self, ProductPricing};
use storefront_core::{CartLine, CouponRejection, Money, Product};
use storefront_db::{Database, DbResult};

use crate::error::ApiError;

/// Outcome of a coupon check: the rejection is a normal business answer,
/// storage failures stay in the outer `DbResult`.
pub type CouponOutcome<T> = Result<T, CouponRejection>;

#[derive(Debug, Clone)]
pub struct PricingService {
    db: Database,
}

impl PricingService {
    pub fn new(db: Database) -> Self {
        PricingService { db }
    }

    /// Prices a batch of products against all stored discounts.
    pub async fn price_products(
        &self,
        products: Vec<Product>,
    ) -> DbResult<Vec<(Product, ProductPricing)>> {
        let discounts = self.db.discounts().list(None).await?;
        let now = Utc::now();

        Ok(products
            .into_iter()
            .map(|product| {
                let pricing = pricing::price_product(&product, &discounts, now);
                (product, pricing)
            })
            .collect())
    }

    /// Prices a single product against its own discounts.
    pub async fn price_product(&self, product: Product) -> DbResult<(Product, ProductPricing)> {
        let discounts = self.db.discounts().list(Some(product.id)).await?;
        let pricing = pricing::price_product(&product, &discounts, Utc::now());
        Ok((product, pricing))
    }

    /// Loads a cart's rows and their base-price totals.
    ///
    /// A total outside the i64 cents range is refused rather than wrapped.
    pub async fn cart_summary(&self, cart_id: &str) -> Result<(Vec<CartLine>, CartSummary), ApiError> {
        self.db.carts().ensure_exists(cart_id).await?;
        let lines = self.db.carts().lines(cart_id).await?;
        let summary = cart::aggregate(&lines).map_err(|e| {
            warn!(cart_id = %cart_id, rows = lines.len(), "Cart total out of range");
            ApiError::from(e)
        })?;
        debug!(cart_id = %cart_id, total = summary.total.cents(), count = summary.count, "Cart aggregated");
        Ok((lines, summary))
    }

    /// Read-only coupon check. Without a cart total the minimum-purchase
    /// check is skipped and no amounts are computed.
    pub async fn check_coupon(
        &self,
        code: &str,
        cart_total: Option<Money>,
    ) -> DbResult<CouponOutcome<Option<CouponApplication>>> {
        let coupon = self.db.coupons().find_by_code(code).await?;
        let now = Utc::now();

        Ok(match cart_total {
            Some(total) => coupon::validate(coupon.as_ref(), total, now).map(Some),
            None => coupon::check(coupon.as_ref(), None, now).map(|_| None),
        })
    }

    /// Applies a coupon to a cart total without recording anything.
    pub async fn apply_coupon(
        &self,
        code: &str,
        cart_total: Money,
    ) -> DbResult<CouponOutcome<CouponApplication>> {
        let coupon = self.db.coupons().find_by_code(code).await?;
        Ok(pricing::apply_coupon_to_cart(coupon.as_ref(), cart_total, Utc::now()))
    }
}
