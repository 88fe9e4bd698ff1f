//! # storefront-core: Pure Pricing Logic for the Storefront
//!
//! This crate is the **heart** of the storefront backend. It contains the
//! promotional pricing engine as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 storefront-api (axum routes)                    │   │
//! │  │    /products ──► /cart ──► /cart/apply_coupon ──► /checkout     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌────────┐ ┌─────────┐  │   │
//! │  │   │  money  │ │ discount │ │ coupon  │ │  cart  │ │ pricing │  │   │
//! │  │   │  Money  │ │ best-of  │ │ ordered │ │ totals │ │ facade  │  │   │
//! │  │   │  Rate   │ │ evaluator│ │ checks  │ │        │ │         │  │   │
//! │  │   └─────────┘ └──────────┘ └─────────┘ └────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                storefront-db (Database Layer)                   │   │
//! │  │        SQLite queries, migrations, atomic coupon redemption     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`types`] - Domain types (Product, Discount, Coupon, ...)
//! - [`discount`] - Discount Evaluator (best single discount per product)
//! - [`coupon`] - Coupon Validator (ordered, read-only checks)
//! - [`cart`] - Cart Aggregator (base-price totals)
//! - [`pricing`] - Pricing Facade composing the above
//! - [`validation`] - Input validation for catalog/promotion writes
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::money::Money;
//! use storefront_core::types::Rate;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let off = price.percentage(Rate::from_bps(1000)); // 10%
//!
//! // $1.099 rounds half-up to $1.10
//! assert_eq!(off.cents(), 110);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod coupon;
pub mod discount;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CouponRejection, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single cart row.
///
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest accepted product price or minimum purchase: $10,000,000.00.
///
/// With at most 100 rows of 999 units each, no cart total can leave the
/// i64 range.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;

/// Maximum rows allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Upper bound for discount and coupon values, in hundredths.
///
/// Values are 0-100 inclusive with two decimals: 100% for percentage
/// promotions, $100.00 for fixed-amount ones.
pub const MAX_PROMOTION_VALUE: i64 = 10_000;
