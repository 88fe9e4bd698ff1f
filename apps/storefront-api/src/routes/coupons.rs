//! # Coupon Routes
//!
//! Creating coupons and checking them against a cart total. The two check
//! endpoints are read-only; redemption happens at checkout.
//!
//! ## Check Responses
//! ```text
//! ┌───────────────────────────┬────────┬──────────────────────────────────┐
//! │ Outcome                   │ Status │ Body                             │
//! ├───────────────────────────┼────────┼──────────────────────────────────┤
//! │ applicable                │  200   │ valid, discount_amount,          │
//! │                           │        │ final_total, message             │
//! │ unknown code              │  404   │ valid:false, "Coupon not found"  │
//! │ rule failure              │  400   │ valid:false, rejection message   │
//! │ malformed body or total   │  400   │ valid:false                      │
//! │ storage failure           │  400   │ "Error processing coupon"        │
//! └───────────────────────────┴────────┴──────────────────────────────────┘
//! ```
//! These endpoints never answer 500.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use storefront_core::coupon::CouponApplication;
use storefront_core::{Coupon, CouponRejection, Money};
use storefront_db::NewCoupon;

use crate::error::ApiError;
use crate::routes::parse_amount;
use crate::AppState;

const MSG_APPLIED: &str = "Coupon applied successfully";
const MSG_VALID: &str = "Coupon is valid";
const MSG_INVALID_TOTAL: &str = "Invalid cart total";
const MSG_INVALID_BODY: &str = "Invalid request body";
const MSG_CODE_REQUIRED: &str = "Coupon code is required";
const MSG_ERROR: &str = "Error processing coupon";

// =============================================================================
// Bodies
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CouponCheckRequest {
    #[serde(default)]
    pub code: String,
    /// String or number; parsed exactly.
    pub cart_total: Option<Value>,
}

/// Result of a coupon check.
#[derive(Debug, Clone, Serialize)]
pub struct CouponCheckResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_total: Option<Decimal>,
    pub message: String,
}

impl CouponCheckResponse {
    fn applied(application: &CouponApplication) -> Self {
        CouponCheckResponse {
            valid: true,
            discount_amount: Some(application.discount_amount.to_decimal()),
            final_total: Some(application.final_total.to_decimal()),
            message: MSG_APPLIED.to_string(),
        }
    }

    fn valid() -> Self {
        CouponCheckResponse {
            valid: true,
            discount_amount: None,
            final_total: None,
            message: MSG_VALID.to_string(),
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        CouponCheckResponse {
            valid: false,
            discount_amount: None,
            final_total: None,
            message: message.into(),
        }
    }
}

type CheckReply = (StatusCode, Json<CouponCheckResponse>);

fn reject(status: StatusCode, message: impl Into<String>) -> CheckReply {
    (status, Json(CouponCheckResponse::invalid(message)))
}

fn rejection_reply(rejection: CouponRejection) -> CheckReply {
    let status = match rejection {
        CouponRejection::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };
    reject(status, rejection.to_string())
}

#[derive(Debug, Deserialize)]
pub struct CreateCouponRequest {
    pub code: String,
    #[serde(default)]
    pub description: String,
    pub discount_value: Decimal,
    #[serde(default = "default_true")]
    pub is_percentage: bool,
    #[serde(default)]
    pub minimum_purchase: Decimal,
    #[serde(default = "default_true")]
    pub active: bool,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub max_uses: Option<i64>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct CouponResponse {
    pub id: i64,
    pub code: String,
    pub description: String,
    pub discount_value: Decimal,
    pub is_percentage: bool,
    pub minimum_purchase: Decimal,
    pub active: bool,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub max_uses: Option<i64>,
    pub current_uses: i64,
}

impl From<Coupon> for CouponResponse {
    fn from(c: Coupon) -> Self {
        CouponResponse {
            id: c.id,
            discount_value: Decimal::new(c.discount_value, 2),
            minimum_purchase: c.minimum_purchase().to_decimal(),
            code: c.code,
            description: c.description,
            is_percentage: c.is_percentage,
            active: c.active,
            valid_from: c.valid_from,
            valid_to: c.valid_to,
            max_uses: c.max_uses,
            current_uses: c.current_uses,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/coupons", post(create_coupon))
        .route("/coupons/validate", post(validate_coupon))
        .route("/cart/apply_coupon", post(apply_coupon))
}

async fn create_coupon(
    State(state): State<AppState>,
    body: Result<Json<CreateCouponRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CouponResponse>), ApiError> {
    let Json(req) = body?;

    let coupon = state
        .db
        .coupons()
        .insert(&NewCoupon {
            code: req.code,
            description: req.description,
            discount_value: Money::from_decimal(req.discount_value)?.cents(),
            is_percentage: req.is_percentage,
            minimum_purchase_cents: Money::from_decimal(req.minimum_purchase)?.cents(),
            active: req.active,
            valid_from: req.valid_from,
            valid_to: req.valid_to,
            max_uses: req.max_uses,
        })
        .await?;

    info!(coupon_id = coupon.id, code = %coupon.code, "Coupon created");
    Ok((StatusCode::CREATED, Json(coupon.into())))
}

/// Read-only check. Without `cart_total` the minimum purchase is not
/// checked and no amounts are returned.
async fn validate_coupon(
    State(state): State<AppState>,
    body: Result<Json<CouponCheckRequest>, JsonRejection>,
) -> CheckReply {
    let req = match read_check(body) {
        Ok(req) => req,
        Err(reply) => return reply,
    };

    let cart_total = match req.cart_total.as_ref().map(parse_amount).transpose() {
        Ok(total) => total,
        Err(_) => return reject(StatusCode::BAD_REQUEST, MSG_INVALID_TOTAL),
    };

    match state.pricing.check_coupon(&req.code, cart_total).await {
        Ok(Ok(Some(application))) => (StatusCode::OK, Json(CouponCheckResponse::applied(&application))),
        Ok(Ok(None)) => (StatusCode::OK, Json(CouponCheckResponse::valid())),
        Ok(Err(rejection)) => {
            debug!(code = %req.code, reason = %rejection, "Coupon rejected");
            rejection_reply(rejection)
        }
        Err(e) => {
            error!(code = %req.code, error = %e, "Coupon validation failed");
            reject(StatusCode::BAD_REQUEST, MSG_ERROR)
        }
    }
}

/// Applies a coupon to a cart total (`0` when omitted) without recording it.
async fn apply_coupon(
    State(state): State<AppState>,
    body: Result<Json<CouponCheckRequest>, JsonRejection>,
) -> CheckReply {
    let req = match read_check(body) {
        Ok(req) => req,
        Err(reply) => return reply,
    };

    let cart_total = match req.cart_total.as_ref() {
        Some(raw) => match parse_amount(raw) {
            Ok(total) => total,
            Err(_) => return reject(StatusCode::BAD_REQUEST, MSG_INVALID_TOTAL),
        },
        None => Money::zero(),
    };

    match state.pricing.apply_coupon(&req.code, cart_total).await {
        Ok(Ok(application)) => {
            debug!(code = %application.code, discount_cents = application.discount_amount.cents(), "Coupon applies");
            (StatusCode::OK, Json(CouponCheckResponse::applied(&application)))
        }
        Ok(Err(rejection)) => {
            debug!(code = %req.code, reason = %rejection, "Coupon rejected");
            rejection_reply(rejection)
        }
        Err(e) => {
            error!(code = %req.code, error = %e, "Coupon application failed");
            reject(StatusCode::BAD_REQUEST, MSG_ERROR)
        }
    }
}

/// Unwraps the body and requires a non-blank code.
fn read_check(
    body: Result<Json<CouponCheckRequest>, JsonRejection>,
) -> Result<CouponCheckRequest, CheckReply> {
    let Json(req) = body.map_err(|rejection| {
        debug!(error = %rejection.body_text(), "Malformed coupon request");
        reject(StatusCode::BAD_REQUEST, MSG_INVALID_BODY)
    })?;

    if req.code.trim().is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, MSG_CODE_REQUIRED));
    }
    Ok(req)
}
