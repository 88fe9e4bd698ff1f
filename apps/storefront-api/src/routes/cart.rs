//! # Cart Routes
//!
//! Carts are opened anonymously and addressed by the returned token. Totals
//! are computed from base prices; product discounts are display-only and
//! never enter the cart total.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use storefront_core::cart::CartSummary;
use storefront_core::{CartItem, CartLine, CoreError};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct OpenCartResponse {
    pub cart_id: String,
}

#[derive(Debug, Serialize)]
pub struct CartLineResponse {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i64,
    pub line_total: Decimal,
}

impl TryFrom<CartLine> for CartLineResponse {
    type Error = CoreError;

    fn try_from(line: CartLine) -> Result<Self, CoreError> {
        Ok(CartLineResponse {
            id: line.item_id,
            product_id: line.product_id,
            unit_price: line.unit_price().to_decimal(),
            line_total: line.line_total()?.to_decimal(),
            product_name: line.product_name,
            quantity: line.quantity,
        })
    }
}

/// `items_count` is the number of rows, not units.
#[derive(Debug, Serialize)]
pub struct CartTotalResponse {
    pub total: Decimal,
    pub items_count: usize,
}

impl From<&CartSummary> for CartTotalResponse {
    fn from(summary: &CartSummary) -> Self {
        CartTotalResponse {
            total: summary.total.to_decimal(),
            items_count: summary.count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub cart_id: String,
    pub items: Vec<CartLineResponse>,
    pub total: Decimal,
    pub items_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cart", post(open_cart))
        .route("/cart/{cart_id}", get(get_cart))
        .route("/cart/{cart_id}/total", get(cart_total))
        .route("/cart/{cart_id}/items", post(add_item))
        .route(
            "/cart/{cart_id}/items/{item_id}",
            patch(update_item).delete(remove_item),
        )
}

async fn open_cart(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<OpenCartResponse>), ApiError> {
    let cart_id = state.db.carts().open().await?;
    Ok((StatusCode::CREATED, Json(OpenCartResponse { cart_id })))
}

async fn get_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let (lines, summary) = state.pricing.cart_summary(&cart_id).await?;
    let items = lines
        .into_iter()
        .map(CartLineResponse::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(CartResponse {
        cart_id,
        total: summary.total.to_decimal(),
        items_count: summary.count,
        items,
    }))
}

async fn cart_total(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
) -> Result<Json<CartTotalResponse>, ApiError> {
    let (_, summary) = state.pricing.cart_summary(&cart_id).await?;
    Ok(Json(CartTotalResponse::from(&summary)))
}

async fn add_item(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
    body: Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CartItem>), ApiError> {
    let Json(req) = body?;

    let item = state
        .db
        .carts()
        .add_item(&cart_id, req.product_id, req.quantity)
        .await?;

    info!(cart_id = %cart_id, product_id = req.product_id, quantity = req.quantity, "Added to cart");
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_item(
    State(state): State<AppState>,
    Path((cart_id, item_id)): Path<(String, i64)>,
    body: Result<Json<UpdateItemRequest>, JsonRejection>,
) -> Result<Json<CartItem>, ApiError> {
    let Json(req) = body?;
    let item = state
        .db
        .carts()
        .update_quantity(&cart_id, item_id, req.quantity)
        .await?;
    Ok(Json(item))
}

async fn remove_item(
    State(state): State<AppState>,
    Path((cart_id, item_id)): Path<(String, i64)>,
) -> Result<StatusCode, ApiError> {
    state.db.carts().remove_item(&cart_id, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
