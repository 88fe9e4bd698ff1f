//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront API                     │
//! │                                                                         │
//! │  handler -> Result<Json<T>, ApiError>                                  │
//! │         │                                                               │
//! │         ├── DbError ─────────────┐                                      │
//! │         ├── CoreError ───────────┤                                      │
//! │         ├── ValidationError ─────┼──► ApiError { code, message }        │
//! │         ├── PaymentError ────────┤          │                           │
//! │         └── JsonRejection ───────┘          ▼                           │
//! │                                   IntoResponse: status + JSON body      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Coupon endpoints do not use this type for rule failures; they answer with
//! a `{valid: false, message}` body instead (see `routes::coupons`).

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use storefront_core::{CoreError, CouponRejection, ValidationError};
use storefront_db::DbError;

use crate::services::payment::PaymentError;

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: espresso-beans"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Uniqueness conflict, including a repeated coupon redemption (409)
    Conflict,

    /// Coupon not applicable (400)
    CouponRejected,

    /// Cart operation failed (400)
    CartError,

    /// Payment provider failure or unpaid order (502)
    PaymentError,

    /// Database operation failed (500)
    DatabaseError,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError | ErrorCode::CouponRejected | ErrorCode::CartError => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::PaymentError => StatusCode::BAD_GATEWAY,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::Invalid(e) => e.into(),
            DbError::CouponRejected(rejection) => rejection.into(),
            DbError::AlreadyRedeemed => {
                ApiError::new(ErrorCode::Conflict, DbError::AlreadyRedeemed.to_string())
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::CheckViolation(message) => {
                tracing::warn!("Constraint violated: {}", message);
                ApiError::validation("Value out of range")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MalformedAmount(_) | CoreError::AmountOverflow => {
                ApiError::validation(err.to_string())
            }
            CoreError::Coupon(rejection) => rejection.into(),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CouponRejection> for ApiError {
    fn from(rejection: CouponRejection) -> Self {
        let code = match rejection {
            CouponRejection::NotFound => ErrorCode::NotFound,
            _ => ErrorCode::CouponRejected,
        };
        ApiError::new(code, rejection.to_string())
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::InvalidOrderId => ApiError::validation(err.to_string()),
            PaymentError::NotConfigured | PaymentError::Http(_) | PaymentError::Provider { .. } => {
                tracing::error!(error = %err, "Payment verification failed");
                ApiError::new(ErrorCode::PaymentError, "Payment verification failed")
            }
            PaymentError::NotCompleted { .. } => {
                ApiError::new(ErrorCode::PaymentError, err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::Money;

    #[test]
    fn test_db_errors_map_to_codes() {
        let err: ApiError = DbError::not_found("Product", "mug").into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found: mug");

        let err: ApiError = DbError::duplicate("slug", "mugs").into();
        assert_eq!(err.code, ErrorCode::Conflict);

        let err: ApiError = DbError::AlreadyRedeemed.into();
        assert_eq!(err.code.status(), StatusCode::CONFLICT);

        let err: ApiError = DbError::QueryFailed("syntax error near SELEC".to_string()).into();
        assert_eq!(err.message, "Database operation failed");
    }

    #[test]
    fn test_coupon_rejections() {
        let err: ApiError = CouponRejection::NotFound.into();
        assert_eq!(err.code.status(), StatusCode::NOT_FOUND);

        let err: ApiError = CouponRejection::BelowMinimumPurchase {
            minimum: Money::from_cents(5000),
        }
        .into();
        assert_eq!(err.code, ErrorCode::CouponRejected);
        assert!(err.message.contains("$50.00"));
    }

    #[test]
    fn test_amount_overflow_is_a_client_error() {
        let err: ApiError = CoreError::AmountOverflow.into();
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Amount exceeds the supported range");
    }

    #[test]
    fn test_serializes_screaming_snake_case() {
        let json = serde_json::to_value(ApiError::validation("bad")).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "bad");
    }
}
