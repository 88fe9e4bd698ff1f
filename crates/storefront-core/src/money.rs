//! # Money
//!
//! Every amount in the storefront is an `i64` count of cents. Discount and
//! coupon percentages are basis points, and the only rounding step in the
//! whole pricing path is [`Money::percentage`].
//!
//! ```text
//!   client "49.99" / 49.99 ──► Money::parse / from_decimal ──► 4999¢
//!                                                               │
//!   products.price_cents ──► Money::from_cents ─────────────────┤
//!                                                               ▼
//!                            percentage(Rate), checked_mul/checked_add, Sub
//!                                                               │
//!   response "44.99" ◄── Money::to_decimal ◄────────────────────┘
//! ```
//!
//! ```rust
//! use storefront_core::money::Money;
//! use storefront_core::types::Rate;
//!
//! let total = Money::parse("49.99").unwrap();
//! let off = total.percentage(Rate::from_bps(1000));
//! assert_eq!(off.cents(), 500);
//! assert_eq!((total - off).to_string(), "$44.99");
//! ```

use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::types::Rate;

/// An amount of money in cents. May be negative only as an intermediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Parses `"49.99"`, `"100"` or `" 0.5 "`.
    ///
    /// Digits past the cent round half away from zero, so `"0.005"` is one
    /// cent.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let trimmed = input.trim();
        Decimal::from_str(trimmed)
            .map_err(|_| CoreError::MalformedAmount(trimmed.to_string()))
            .and_then(Money::from_decimal)
    }

    /// Rounds an exact decimal to the cent.
    pub fn from_decimal(value: Decimal) -> Result<Self, CoreError> {
        let mut cents = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        cents.rescale(2);
        i64::try_from(cents.mantissa())
            .map(Money)
            .map_err(|_| CoreError::MalformedAmount(value.to_string()))
    }

    /// Two-place decimal used on the wire: `9000` becomes `90.00`.
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// `rate` of this amount, rounded half-up to the cent.
    ///
    /// Computed as `(cents * bps + 5000) / 10000` on i128, mirrored for
    /// negative amounts.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    /// use storefront_core::types::Rate;
    ///
    /// // 10% of $0.25 is 2.5¢, which rounds up
    /// assert_eq!(Money::from_cents(25).percentage(Rate::from_bps(1000)).cents(), 3);
    /// ```
    pub fn percentage(&self, rate: Rate) -> Money {
        const HALF: i128 = 5_000;
        const WHOLE: i128 = 10_000;

        let scaled = i128::from(self.0) * i128::from(rate.bps());
        let cents = if scaled < 0 {
            (scaled - HALF) / WHOLE
        } else {
            (scaled + HALF) / WHOLE
        };
        Money(cents as i64)
    }

    /// Line total for `qty` units at this unit price, `None` on overflow.
    #[inline]
    pub const fn checked_mul(&self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, rhs: Money) -> Option<Money> {
        match self.0.checked_add(rhs.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

/// `$10.99`, `-$5.50`. Used inside user-facing messages.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            f.write_str("-")?;
        }
        let abs = self.0.unsigned_abs();
        write!(f, "${}.{:02}", abs / 100, abs % 100)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}
