//! # HTTP Routes
//!
//! Handlers grouped by resource. Each module owns its request and response
//! bodies; amounts always cross the wire as decimal strings (`"10.00"`).
//!
//! ## Route Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  health     GET  /health                                               │
//! │  catalog    GET  /categories            POST /categories               │
//! │             GET  /categories/{slug}/products                           │
//! │             GET  /products              POST /products                 │
//! │             GET  /products/{slug}                                      │
//! │  discounts  GET  /discounts             POST /discounts                │
//! │  coupons    POST /coupons               POST /coupons/validate         │
//! │             POST /cart/apply_coupon                                    │
//! │  cart       POST /cart                  GET  /cart/{cart_id}           │
//! │             POST /cart/{cart_id}/items  GET  /cart/{cart_id}/total     │
//! │             PATCH|DELETE /cart/{cart_id}/items/{item_id}               │
//! │  payment    POST /payment/verify                                       │
//! │  checkout   POST /checkout                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod coupons;
pub mod discounts;
pub mod health;
pub mod payment;

use axum::Router;
use serde_json::Value;

use storefront_core::{CoreError, Money};

use crate::AppState;

/// All routes, before middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(catalog::routes())
        .merge(discounts::routes())
        .merge(coupons::routes())
        .merge(cart::routes())
        .merge(payment::routes())
        .merge(checkout::routes())
}

/// Reads a non-negative amount sent either as a JSON string (`"49.99"`) or
/// a JSON number (`49.99`, `1e2`).
pub(crate) fn parse_amount(value: &Value) -> Result<Money, CoreError> {
    let money = match value {
        Value::String(s) => Money::parse(s)?,
        Value::Number(n) => {
            let raw = n.to_string();
            match Money::parse(&raw) {
                Ok(m) => m,
                Err(_) => rust_decimal::Decimal::from_scientific(&raw)
                    .map_err(|_| CoreError::MalformedAmount(raw.clone()))
                    .and_then(Money::from_decimal)?,
            }
        }
        other => return Err(CoreError::MalformedAmount(other.to_string())),
    };

    if money.is_negative() {
        return Err(CoreError::MalformedAmount(value.to_string()));
    }
    Ok(money)
}
