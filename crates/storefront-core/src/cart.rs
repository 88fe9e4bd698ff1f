//! # Cart Aggregator
//!
//! Sums a cart at base prices.
//!
//! Per-product discounts are a catalog display concern; the cart total the
//! coupon is checked against is always `Σ unit_price × quantity`.

use serde::Serialize;

use crate::error::CoreError;
use crate::money::Money;
use crate::types::CartLine;

/// Totals for one cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    /// Sum of base `unit_price × quantity` over every row.
    pub total: Money,
    /// Number of cart rows, not units.
    pub count: usize,
}

impl CartSummary {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Aggregates cart rows into a total and a row count.
///
/// Fails with [`CoreError::AmountOverflow`] instead of wrapping when a line
/// or the running total leaves the i64 range.
///
/// ```rust
/// use storefront_core::cart::aggregate;
/// use storefront_core::types::CartLine;
///
/// let lines = vec![
///     CartLine { item_id: 1, product_id: 1, product_name: "Tea".into(), unit_price_cents: 450, quantity: 2 },
///     CartLine { item_id: 2, product_id: 2, product_name: "Cup".into(), unit_price_cents: 1200, quantity: 1 },
/// ];
/// let summary = aggregate(&lines).unwrap();
/// assert_eq!(summary.total.cents(), 2100);
/// assert_eq!(summary.count, 2);
/// ```
pub fn aggregate(lines: &[CartLine]) -> Result<CartSummary, CoreError> {
    let total = lines.iter().try_fold(Money::zero(), |total, line| {
        total
            .checked_add(line.line_total()?)
            .ok_or(CoreError::AmountOverflow)
    })?;

    Ok(CartSummary {
        total,
        count: lines.len(),
    })
}
