//! # Coupon Validator
//!
//! Read-only applicability checks for cart-level coupons.
//!
//! ## Flow
//! ```text
//! ┌──────────────┐    canonical_code()    ┌──────────────┐
//! │  " save10 "  │ ─────────────────────► │   "SAVE10"   │ ──► storage lookup
//! └──────────────┘                        └──────────────┘          │
//!                                                                   ▼
//!                                       check(coupon?, cart_total?, now)
//!                                                                   │
//!                   ┌───────────────────────────────────────────────┤
//!                   ▼                                               ▼
//!          Err(CouponRejection)                  validate() → CouponApplication
//!          (first failing check)                  { discount_amount, final_total }
//! ```
//!
//! Nothing here mutates a coupon. Recording a redemption (usage counter and
//! usage row) is done by the storage layer in one transaction, which calls
//! back into [`validate`] before writing.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CouponRejection;
use crate::money::Money;
use crate::types::Coupon;

/// A coupon that passed every check, applied to a cart total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CouponApplication {
    pub coupon_id: i64,
    pub code: String,
    pub discount_amount: Money,
    pub final_total: Money,
}

/// Canonical form of a coupon code: surrounding whitespace removed, upper-cased.
///
/// ```rust
/// use storefront_core::coupon::canonical_code;
///
/// assert_eq!(canonical_code("  save10 "), "SAVE10");
/// ```
pub fn canonical_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Runs the ordered applicability checks.
///
/// `coupon` is the result of looking up the canonical code (`None` when no
/// row matched). The minimum-purchase check only runs when `cart_total` is
/// supplied.
pub fn check<'a>(
    coupon: Option<&'a Coupon>,
    cart_total: Option<Money>,
    now: DateTime<Utc>,
) -> Result<&'a Coupon, CouponRejection> {
    let coupon = coupon.ok_or(CouponRejection::NotFound)?;

    if !coupon.active {
        return Err(CouponRejection::Inactive);
    }
    if now < coupon.valid_from {
        return Err(CouponRejection::NotYetValid);
    }
    if now > coupon.valid_to {
        return Err(CouponRejection::Expired);
    }
    if !coupon.has_uses_left() {
        return Err(CouponRejection::UsageLimitReached);
    }
    if let Some(total) = cart_total {
        if total < coupon.minimum_purchase() {
            return Err(CouponRejection::BelowMinimumPurchase {
                minimum: coupon.minimum_purchase(),
            });
        }
    }

    Ok(coupon)
}

/// Checks `coupon` against `cart_total` and computes the discount.
///
/// The discount follows the same rule as product discounts, with the cart
/// total as the base: percentage rounded half-up, fixed capped at the total.
pub fn validate(
    coupon: Option<&Coupon>,
    cart_total: Money,
    now: DateTime<Utc>,
) -> Result<CouponApplication, CouponRejection> {
    let coupon = check(coupon, Some(cart_total), now)?;
    let discount_amount = coupon.reduction().amount_off(cart_total);

    Ok(CouponApplication {
        coupon_id: coupon.id,
        code: coupon.code.clone(),
        discount_amount,
        final_total: cart_total - discount_amount,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn save10(now: DateTime<Utc>) -> Coupon {
        Coupon {
            id: 1,
            code: "SAVE10".to_string(),
            description: "Ten percent off".to_string(),
            discount_value: 1000,
            is_percentage: true,
            minimum_purchase_cents: 0,
            active: true,
            valid_from: now - Duration::days(1),
            valid_to: now + Duration::days(30),
            max_uses: None,
            current_uses: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_missing_coupon_is_not_found() {
        let err = validate(None, Money::from_cents(1000), Utc::now()).unwrap_err();
        assert_eq!(err, CouponRejection::NotFound);
    }

    #[test]
    fn test_ten_percent_of_one_hundred() {
        let now = Utc::now();
        let coupon = save10(now);
        let applied = validate(Some(&coupon), Money::from_cents(10_000), now).unwrap();

        assert_eq!(applied.discount_amount.to_decimal().to_string(), "10.00");
        assert_eq!(applied.final_total.to_decimal().to_string(), "90.00");
        assert_eq!(applied.code, "SAVE10");
    }

    #[test]
    fn test_inactive_is_reported_before_expired() {
        let now = Utc::now();
        let mut coupon = save10(now);
        coupon.active = false;
        coupon.valid_from = now - Duration::days(60);
        coupon.valid_to = now - Duration::days(30);

        let err = validate(Some(&coupon), Money::from_cents(10_000), now).unwrap_err();
        assert_eq!(err, CouponRejection::Inactive);
        assert_eq!(err.to_string(), "Coupon is not active");
    }

    #[test]
    fn test_window_edges() {
        let now = Utc::now();
        let mut coupon = save10(now);

        coupon.valid_from = now + Duration::seconds(1);
        assert_eq!(
            check(Some(&coupon), None, now).unwrap_err(),
            CouponRejection::NotYetValid
        );

        coupon.valid_from = now - Duration::days(2);
        coupon.valid_to = now - Duration::seconds(1);
        assert_eq!(
            check(Some(&coupon), None, now).unwrap_err(),
            CouponRejection::Expired
        );

        coupon.valid_from = now;
        coupon.valid_to = now;
        assert!(check(Some(&coupon), None, now).is_ok());
    }

    #[test]
    fn test_usage_limit_reached() {
        let now = Utc::now();
        let mut coupon = save10(now);
        coupon.max_uses = Some(1);
        coupon.current_uses = 1;

        let err = validate(Some(&coupon), Money::from_cents(10_000), now).unwrap_err();
        assert_eq!(err, CouponRejection::UsageLimitReached);
    }

    #[test]
    fn test_unlimited_uses() {
        let now = Utc::now();
        let mut coupon = save10(now);
        coupon.current_uses = 1_000_000;
        assert!(check(Some(&coupon), None, now).is_ok());
    }

    #[test]
    fn test_minimum_purchase_message_mentions_minimum() {
        let now = Utc::now();
        let mut coupon = save10(now);
        coupon.minimum_purchase_cents = 5000;

        let err = validate(Some(&coupon), Money::from_cents(4000), now).unwrap_err();
        assert!(matches!(err, CouponRejection::BelowMinimumPurchase { .. }));
        assert!(err.to_string().contains("50"));

        // Exactly the minimum is enough
        assert!(validate(Some(&coupon), Money::from_cents(5000), now).is_ok());
    }

    #[test]
    fn test_minimum_is_skipped_without_cart_total() {
        let now = Utc::now();
        let mut coupon = save10(now);
        coupon.minimum_purchase_cents = 5000;
        assert!(check(Some(&coupon), None, now).is_ok());
    }

    #[test]
    fn test_fixed_coupon_is_capped_at_cart_total() {
        let now = Utc::now();
        let mut coupon = save10(now);
        coupon.is_percentage = false;
        coupon.discount_value = 2500;

        let applied = validate(Some(&coupon), Money::from_cents(1800), now).unwrap();
        assert_eq!(applied.discount_amount.cents(), 1800);
        assert_eq!(applied.final_total, Money::zero());
    }

    #[test]
    fn test_canonical_code() {
        assert_eq!(canonical_code(" save10 "), "SAVE10");
        assert_eq!(canonical_code("SAVE10"), "SAVE10");
        assert_eq!(canonical_code("\tsUmMeR-24\n"), "SUMMER-24");
    }

    #[test]
    fn test_validation_does_not_mutate() {
        let now = Utc::now();
        let mut coupon = save10(now);
        coupon.max_uses = Some(5);
        let before = coupon.current_uses;
        let _ = validate(Some(&coupon), Money::from_cents(10_000), now);
        assert_eq!(coupon.current_uses, before);
    }
}
