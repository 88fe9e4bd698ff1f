//! # Discount Routes
//!
//! Product-level promotions. Values are sent and returned with two
//! decimals: `"15.00"` is 15% for a percentage discount and $15.00 for a
//! fixed one.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use storefront_core::{Discount, DiscountKind, Money};
use storefront_db::NewDiscount;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct DiscountResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub active: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub products: Vec<i64>,
}

impl From<Discount> for DiscountResponse {
    fn from(d: Discount) -> Self {
        DiscountResponse {
            id: d.id,
            name: d.name,
            description: d.description,
            kind: d.kind,
            value: Decimal::new(d.value, 2),
            active: d.active,
            start_date: d.start_date,
            end_date: d.end_date,
            products: d.product_ids,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DiscountQuery {
    pub product: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDiscountRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    #[serde(default = "default_active")]
    pub active: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub products: Vec<i64>,
}

fn default_active() -> bool {
    true
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/discounts", get(list_discounts).post(create_discount))
}

async fn list_discounts(
    State(state): State<AppState>,
    Query(query): Query<DiscountQuery>,
) -> Result<Json<Vec<DiscountResponse>>, ApiError> {
    let discounts = state.db.discounts().list(query.product).await?;
    Ok(Json(discounts.into_iter().map(DiscountResponse::from).collect()))
}

async fn create_discount(
    State(state): State<AppState>,
    body: Result<Json<CreateDiscountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DiscountResponse>), ApiError> {
    let Json(req) = body?;

    let discount = state
        .db
        .discounts()
        .insert(&NewDiscount {
            name: req.name,
            description: req.description,
            kind: req.kind,
            value: Money::from_decimal(req.value)?.cents(),
            active: req.active,
            start_date: req.start_date,
            end_date: req.end_date,
            product_ids: req.products,
        })
        .await?;

    info!(discount_id = discount.id, name = %discount.name, "Discount created");
    Ok((StatusCode::CREATED, Json(discount.into())))
}
