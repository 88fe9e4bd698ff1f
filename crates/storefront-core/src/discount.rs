//! # Discount Evaluator
//!
//! Picks the single best discount for a product at a point in time.
//!
//! ## Selection Rule
//! ```text
//! discounts ──► attached to product? ──► in effect at `now`? ──► amount_off(price)
//!                                                                     │
//!                          ┌──────────────────────────────────────────┘
//!                          ▼
//!               max amount (ties → lowest discount id)
//!                          │
//!                          ▼
//!            EffectivePrice { price - amount, Some(id) }
//! ```
//!
//! Discounts never stack: one winner or none.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::money::Money;
use crate::types::{Discount, Product};

/// Result of evaluating a product's discounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectivePrice {
    /// Base price minus the winning discount. Never negative.
    pub price: Money,
    /// Id of the winning discount, if any applied.
    pub applied_discount: Option<i64>,
}

/// Discounts attached to `product` and in effect at `now`, in input order.
pub fn in_effect_for<'a>(
    product: &Product,
    discounts: &'a [Discount],
    now: DateTime<Utc>,
) -> impl Iterator<Item = &'a Discount> {
    let product_id = product.id;
    discounts
        .iter()
        .filter(move |d| d.applies_to(product_id) && d.is_in_effect(now))
}

/// Computes the effective price of `product` at `now`.
///
/// ```rust
/// use chrono::{Duration, Utc};
/// use storefront_core::discount::effective_price;
/// # use storefront_core::types::*;
/// # let now = Utc::now();
/// # let product = Product {
/// #     id: 1, category_id: 1, name: "Mug".into(), slug: "mug".into(),
/// #     description: String::new(), price_cents: 10000, stock: 5, available: true,
/// #     created_at: now, updated_at: now,
/// # };
/// # let discount = Discount {
/// #     id: 3, name: "Spring".into(), description: String::new(),
/// #     kind: DiscountKind::Percentage, value: 2000, active: true,
/// #     start_date: now - Duration::days(1), end_date: now + Duration::days(1),
/// #     product_ids: vec![1], created_at: now, updated_at: now,
/// # };
/// let priced = effective_price(&product, &[discount], now);
/// assert_eq!(priced.price.cents(), 8000);
/// assert_eq!(priced.applied_discount, Some(3));
/// ```
pub fn effective_price(
    product: &Product,
    discounts: &[Discount],
    now: DateTime<Utc>,
) -> EffectivePrice {
    let base = product.price();

    let best = in_effect_for(product, discounts, now)
        .map(|d| (d.reduction().amount_off(base), d.id))
        .fold(None, |best: Option<(Money, i64)>, (amount, id)| match best {
            Some((best_amount, best_id))
                if best_amount > amount || (best_amount == amount && best_id < id) =>
            {
                Some((best_amount, best_id))
            }
            _ => Some((amount, id)),
        });

    match best {
        Some((amount, id)) => EffectivePrice {
            price: base - amount,
            applied_discount: Some(id),
        },
        None => EffectivePrice {
            price: base,
            applied_discount: None,
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
