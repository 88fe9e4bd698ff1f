//! # Pricing Facade
//!
//! The two operations the API exposes: price a product, apply a coupon to a
//! cart total. Both are thin compositions of the evaluator and validator.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::coupon::{self, CouponApplication};
use crate::discount;
use crate::error::CouponRejection;
use crate::money::Money;
use crate::types::{Coupon, Discount, Product};

/// A product with its display pricing.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPricing {
    pub base_price: Money,
    /// Base price minus the single best in-effect discount.
    pub current_price: Money,
    pub applied_discount: Option<i64>,
    /// Every in-effect discount for the product, including ones that lost.
    pub active_discounts: Vec<Discount>,
}

/// Prices `product` against the discounts attached to it.
pub fn price_product(product: &Product, discounts: &[Discount], now: DateTime<Utc>) -> ProductPricing {
    let effective = discount::effective_price(product, discounts, now);

    ProductPricing {
        base_price: product.price(),
        current_price: effective.price,
        applied_discount: effective.applied_discount,
        active_discounts: discount::in_effect_for(product, discounts, now)
            .cloned()
            .collect(),
    }
}

/// Validates `coupon` (the lookup result for a canonical code) against a cart total.
pub fn apply_coupon_to_cart(
    coupon: Option<&Coupon>,
    cart_total: Money,
    now: DateTime<Utc>,
) -> Result<CouponApplication, CouponRejection> {
    coupon::validate(coupon, cart_total, now)
}
