//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │   │    Product      │   │    CartItem     │       │
//! │  │  ─────────────  │◄──│  ─────────────  │◄──│  ─────────────  │       │
//! │  │  id, slug       │   │  price_cents    │   │  cart_id        │       │
//! │  │  name           │   │  stock          │   │  quantity ≥ 1   │       │
//! │  └─────────────────┘   └────────┬────────┘   └─────────────────┘       │
//! │                                 │ many-to-many                          │
//! │                        ┌────────▼────────┐                              │
//! │                        │    Discount     │   percentage | fixed        │
//! │                        │  window, active │                              │
//! │                        └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │     Coupon      │◄──│  CouponUsage    │   one row per (coupon,user) │
//! │  │  CODE, window   │   │  order_total    │                              │
//! │  │  max/current    │   │  discount       │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Promotion Values
//! Discount and coupon values are stored in hundredths (`value = 1250`):
//! basis points for percentage promotions (12.50%), cents for fixed-amount
//! ones ($12.50). [`Reduction`] turns the pair (kind, value) into something
//! that can be applied to a base amount.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Rate
// =============================================================================

/// Percentage represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1000 bps = 10%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Rate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// Reduction
// =============================================================================

/// How much a promotion takes off a base amount.
///
/// Shared by product discounts (base = product price) and coupons
/// (base = cart total) so both follow exactly one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// `base × rate / 100`, rounded half-up to the cent.
    Percentage(Rate),
    /// A flat amount, never more than the base.
    Fixed(Money),
}

impl Reduction {
    /// Builds a reduction from a stored (is_percentage, hundredths) pair.
    pub fn from_hundredths(is_percentage: bool, value: i64) -> Self {
        if is_percentage {
            Reduction::Percentage(Rate::from_bps(value.clamp(0, u32::MAX as i64) as u32))
        } else {
            Reduction::Fixed(Money::from_cents(value))
        }
    }

    /// Amount taken off `base`. Never negative and never more than `base`.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    /// use storefront_core::types::{Rate, Reduction};
    ///
    /// let base = Money::from_cents(800);
    /// assert_eq!(Reduction::Fixed(Money::from_cents(1000)).amount_off(base), base);
    /// assert_eq!(Reduction::Percentage(Rate::from_bps(2500)).amount_off(base).cents(), 200);
    /// ```
    pub fn amount_off(&self, base: Money) -> Money {
        let amount = match self {
            Reduction::Percentage(rate) => base.percentage(*rate),
            Reduction::Fixed(value) => (*value).min(base),
        };
        amount.max(Money::zero())
    }
}

// =============================================================================
// Category
// =============================================================================

/// A catalog category.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// URL-safe unique identifier (`"hot-drinks"`).
    pub slug: String,
    pub description: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,

    /// Base price in cents, before any discount.
    pub price_cents: i64,

    /// Units on hand.
    pub stock: i64,

    /// Whether the product is listed in the storefront.
    pub available: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the base price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks if `quantity` units can be put in a cart.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.available && self.stock >= quantity
    }
}

// =============================================================================
// Discount
// =============================================================================

/// Whether a discount's value is a percentage or a currency amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

/// A time-bounded price reduction attached to one or more products.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Discount {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub kind: DiscountKind,

    /// Value in hundredths (bps or cents depending on `kind`), 0-10000.
    pub value: i64,

    pub active: bool,

    /// Start of the validity window (inclusive).
    #[ts(as = "String")]
    pub start_date: DateTime<Utc>,

    /// End of the validity window (inclusive).
    #[ts(as = "String")]
    pub end_date: DateTime<Utc>,

    /// Products this discount applies to.
    pub product_ids: Vec<i64>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Discount {
    /// A discount is in effect iff it is active and `now` is inside
    /// `[start_date, end_date]`.
    pub fn is_in_effect(&self, now: DateTime<Utc>) -> bool {
        self.active && self.start_date <= now && now <= self.end_date
    }

    /// Checks whether the discount is attached to `product_id`.
    pub fn applies_to(&self, product_id: i64) -> bool {
        self.product_ids.contains(&product_id)
    }

    pub fn reduction(&self) -> Reduction {
        Reduction::from_hundredths(self.kind == DiscountKind::Percentage, self.value)
    }
}

// =============================================================================
// Coupon
// =============================================================================

/// A cart-level promotion redeemed with a code.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Coupon {
    pub id: i64,

    /// Canonical (trimmed, upper-cased) code.
    pub code: String,

    pub description: String,

    /// Value in hundredths (bps or cents depending on `is_percentage`).
    pub discount_value: i64,

    pub is_percentage: bool,

    /// Cart total required before the coupon applies, in cents.
    pub minimum_purchase_cents: i64,

    pub active: bool,

    #[ts(as = "String")]
    pub valid_from: DateTime<Utc>,
    #[ts(as = "String")]
    pub valid_to: DateTime<Utc>,

    /// `None` means unlimited.
    pub max_uses: Option<i64>,

    /// Number of recorded redemptions. Only ever incremented.
    pub current_uses: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    #[inline]
    pub fn minimum_purchase(&self) -> Money {
        Money::from_cents(self.minimum_purchase_cents)
    }

    pub fn reduction(&self) -> Reduction {
        Reduction::from_hundredths(self.is_percentage, self.discount_value)
    }

    /// Checks whether another redemption fits under `max_uses`.
    pub fn has_uses_left(&self) -> bool {
        match self.max_uses {
            Some(max) => self.current_uses < max,
            None => true,
        }
    }
}

// =============================================================================
// Coupon Usage
// =============================================================================

/// Record of a user redeeming a coupon. At most one per (coupon, user).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CouponUsage {
    pub id: i64,
    pub coupon_id: i64,
    pub user_id: String,
    #[ts(as = "String")]
    pub used_at: DateTime<Utc>,
    /// Cart total the coupon was applied to, in cents.
    pub order_total_cents: i64,
    /// Amount taken off, in cents.
    pub discount_amount_cents: i64,
}

// =============================================================================
// Cart
// =============================================================================

/// A stored cart row.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CartItem {
    pub id: i64,
    /// Opaque session token the row belongs to.
    pub cart_id: String,
    pub product_id: i64,
    pub quantity: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A cart row joined with the product's current base price.
///
/// This is what the Cart Aggregator sums; it is never priced with discounts.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CartLine {
    pub item_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl CartLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Result<Money, CoreError> {
        self.unit_price()
            .checked_mul(self.quantity)
            .ok_or(CoreError::AmountOverflow)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
