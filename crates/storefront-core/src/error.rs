//! Errors raised by pricing logic and input checks.
//!
//! [`CouponRejection`] messages are shown to shoppers as-is. The database
//! crate wraps both [`CouponRejection`] and [`ValidationError`] in its own
//! error, and the API turns those into JSON bodies with a stable code.

use thiserror::Error;

use crate::money::Money;

#[derive(Debug, Error)]
pub enum CoreError {
    /// `cart_total: "abc"` and friends.
    #[error("Invalid amount: '{0}'")]
    MalformedAmount(String),

    /// A line or cart total does not fit in i64 cents.
    #[error("Amount exceeds the supported range")]
    AmountOverflow,

    #[error(transparent)]
    Coupon(#[from] CouponRejection),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Reasons a coupon is not applicable, in the order they are checked.
///
/// ## Check Order
/// ```text
/// lookup ──► active? ──► started? ──► not expired? ──► uses left? ──► minimum met?
///   │           │            │              │               │               │
///   ▼           ▼            ▼              ▼               ▼               ▼
/// NotFound   Inactive   NotYetValid      Expired    UsageLimitReached  BelowMinimumPurchase
/// ```
/// The first failing check wins: an inactive coupon that has also expired
/// reports `Inactive`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponRejection {
    #[error("Coupon not found")]
    NotFound,

    #[error("Coupon is not active")]
    Inactive,

    #[error("Coupon is not valid yet")]
    NotYetValid,

    #[error("Coupon has expired")]
    Expired,

    #[error("Coupon has reached its usage limit")]
    UsageLimitReached,

    #[error("Minimum purchase amount is {minimum}")]
    BelowMinimumPurchase { minimum: Money },
}

/// Input that fails a rule in [`crate::validation`].
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A validity window ends before it starts.
    #[error("{field} ends before it starts")]
    InvertedWindow { field: String },
}
