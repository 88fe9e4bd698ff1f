//! # Checkout
//!
//! Turns a paid cart into a completed order. The only place a coupon is
//! redeemed.
//!
//! ## Flow
//! ```text
//! POST /checkout { cart_id, user_id, payment_order_id, coupon_code? }
//!     │
//!     ├── 1. cart_summary(cart_id)          404 unknown cart, 400 empty cart
//!     ├── 2. apply_coupon(code, total)      400/404 before touching payment
//!     ├── 3. payments.confirm(order_id)     502 unless COMPLETED
//!     ├── 4. coupons().redeem(...)          one transaction, 409 if repeated
//!     └── 5. carts().remove_lines(lines)   only the rows that were charged
//! ```

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use storefront_core::{Money, ValidationError};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub cart_id: String,
    pub user_id: String,
    pub payment_order_id: String,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub cart_id: String,
    pub payment_order_id: String,
    pub items_count: usize,
    pub order_total: Decimal,
    pub discount_amount: Decimal,
    pub final_total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/checkout", post(checkout))
}

async fn checkout(
    State(state): State<AppState>,
    body: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let Json(req) = body?;

    let user_id = req.user_id.trim();
    if user_id.is_empty() {
        return Err(ValidationError::Required {
            field: "user_id".to_string(),
        }
        .into());
    }

    let coupon_code = req
        .coupon_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty());

    let (lines, summary) = state.pricing.cart_summary(&req.cart_id).await?;
    if summary.is_empty() {
        return Err(ApiError::cart("Cart is empty"));
    }

    // Reject a bad coupon before asking the provider about the payment
    if let Some(code) = coupon_code {
        state.pricing.apply_coupon(code, summary.total).await??;
    }

    state.payments.confirm(&req.payment_order_id).await?;

    let (discount_amount, final_total, applied_code) = match coupon_code {
        Some(code) => {
            let redemption = state
                .db
                .coupons()
                .redeem(code, user_id, summary.total, Utc::now())
                .await
                .map_err(|e| {
                    warn!(
                        cart_id = %req.cart_id,
                        payment_order_id = %req.payment_order_id,
                        error = %e,
                        "Coupon redemption failed after payment confirmation"
                    );
                    ApiError::from(e)
                })?;
            let application = redemption.application;
            (application.discount_amount, application.final_total, Some(application.code))
        }
        None => (Money::zero(), summary.total, None),
    };

    let removed = state.db.carts().remove_lines(&req.cart_id, &lines).await?;
    if removed as usize != lines.len() {
        warn!(
            cart_id = %req.cart_id,
            charged = lines.len(),
            removed,
            "Cart changed during checkout; unpaid rows kept"
        );
    }

    info!(
        cart_id = %req.cart_id,
        user_id = %user_id,
        total_cents = summary.total.cents(),
        final_cents = final_total.cents(),
        "Checkout complete"
    );

    Ok(Json(CheckoutResponse {
        cart_id: req.cart_id,
        payment_order_id: req.payment_order_id,
        items_count: summary.count,
        order_total: summary.total.to_decimal(),
        discount_amount: discount_amount.to_decimal(),
        final_total: final_total.to_decimal(),
        coupon_code: applied_code,
    }))
}
