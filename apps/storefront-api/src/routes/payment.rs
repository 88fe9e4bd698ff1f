//! Payment confirmation endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(alias = "orderID")]
    pub order_id: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub status: &'static str,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/payment/verify", post(verify_payment))
}

/// `{status: "success"}` only when the provider reports the order COMPLETED.
async fn verify_payment(
    State(state): State<AppState>,
    body: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> Result<Json<VerifyPaymentResponse>, ApiError> {
    let Json(req) = body?;

    state.payments.confirm(&req.order_id).await?;

    info!(order_id = %req.order_id, "Payment verified");
    Ok(Json(VerifyPaymentResponse { status: "success" }))
}
