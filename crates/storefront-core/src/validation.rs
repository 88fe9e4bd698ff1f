//! # Input Rules
//!
//! Checks applied to admin and shopper input before any SQL runs. SQLite
//! still enforces uniqueness and references; these rules cover the things
//! it cannot express, like slug shape or an inverted validity window.
//!
//! ```rust
//! use storefront_core::validation::{slugify, validate_quantity};
//!
//! assert_eq!(slugify("Hot Drinks & Tea"), "hot-drinks-tea");
//! assert!(validate_quantity(5).is_ok());
//! ```

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_PRICE_CENTS, MAX_PROMOTION_VALUE};

pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_SLUG_LEN: usize = 50;
const MAX_CODE_LEN: usize = 50;

fn required(field: &str) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

fn bounded_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.is_empty() {
        Err(required(field))
    } else if value.len() > max {
        Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        })
    } else {
        Ok(())
    }
}

fn in_range(field: &str, value: i64, min: i64, max: i64) -> ValidationResult<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max,
        })
    }
}

fn bad_format(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// URL slug for a display name.
///
/// ASCII letters and digits are kept in lower case; any other run of
/// characters becomes one `-`, never at either end.
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// A slug must already be in [`slugify`] form and fit in 50 characters.
///
/// ```rust
/// use storefront_core::validation::validate_slug;
///
/// assert!(validate_slug("hot-drinks").is_ok());
/// assert!(validate_slug("Hot Drinks").is_err());
/// ```
pub fn validate_slug(slug: &str) -> ValidationResult<()> {
    bounded_text("slug", slug, MAX_SLUG_LEN)?;
    if slugify(slug) != slug {
        return Err(bad_format(
            "slug",
            "must contain only lowercase letters, numbers, and single hyphens",
        ));
    }
    Ok(())
}

/// Category, product and discount names.
pub fn validate_name(name: &str) -> ValidationResult<()> {
    bounded_text("name", name.trim(), MAX_NAME_LEN)
}

/// Coupon codes are checked after canonicalization to upper case.
pub fn validate_coupon_code(code: &str) -> ValidationResult<()> {
    bounded_text("code", code, MAX_CODE_LEN)?;
    if !code
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err(bad_format(
            "code",
            "must contain only letters, numbers, hyphens, and underscores",
        ));
    }
    Ok(())
}

/// Quantity of one cart row: 1 to 999.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    in_range("quantity", qty, 1, MAX_ITEM_QUANTITY)
}

/// Prices and minimum purchases in cents, 0 through [`MAX_PRICE_CENTS`].
///
/// ```rust
/// use storefront_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    in_range("price", cents, 0, MAX_PRICE_CENTS)
}

pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    in_range("stock", stock, 0, i64::MAX)
}

/// Discount and coupon values in hundredths, 0.00 through 100.00.
pub fn validate_promotion_value(value: i64) -> ValidationResult<()> {
    in_range("value", value, 0, MAX_PROMOTION_VALUE)
}

/// `start == end` is a valid one-instant window.
pub fn validate_window(field: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> ValidationResult<()> {
    if start > end {
        return Err(ValidationError::InvertedWindow {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Called with the current row count before another row is added.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }
    Ok(())
}

/// Cart ids are UUIDs handed out by `POST /cart`.
///
/// ```rust
/// use storefront_core::validation::validate_cart_id;
///
/// assert!(validate_cart_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_cart_id("not-a-uuid").is_err());
/// ```
pub fn validate_cart_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(required("cart_id"));
    }
    uuid::Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| bad_format("cart_id", "must be a valid UUID"))
}
