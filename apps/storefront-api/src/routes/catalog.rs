//! # Catalog Routes
//!
//! Categories and products. Every product leaving this module is priced:
//!
//! ```text
//! ProductRepository ──► PricingService::price_products ──► ProductResponse
//!                                                          { price, current_price,
//!                                                            applied_discount,
//!                                                            active_discounts }
//! ```

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use storefront_core::pricing::ProductPricing;
use storefront_core::{Category, Money, Product};
use storefront_db::{NewCategory, NewProduct};

use crate::error::ApiError;
use crate::routes::discounts::DiscountResponse;
use crate::AppState;

// =============================================================================
// Bodies
// =============================================================================

/// A product with its display pricing.
#[derive(Debug, Clone, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    /// Base price.
    pub price: Decimal,
    /// Base price minus the best in-effect discount.
    pub current_price: Decimal,
    pub applied_discount: Option<i64>,
    pub active_discounts: Vec<DiscountResponse>,
    pub stock: i64,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<(Product, ProductPricing)> for ProductResponse {
    fn from((product, pricing): (Product, ProductPricing)) -> Self {
        ProductResponse {
            id: product.id,
            category_id: product.category_id,
            name: product.name,
            slug: product.slug,
            description: product.description,
            price: pricing.base_price.to_decimal(),
            current_price: pricing.current_price.to_decimal(),
            applied_discount: pricing.applied_discount,
            active_discounts: pricing
                .active_discounts
                .into_iter()
                .map(DiscountResponse::from)
                .collect(),
            stock: product.stock,
            available: product.available,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub category_id: i64,
    pub name: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

// =============================================================================
// Handlers
// =============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{slug}/products", get(category_products))
        .route("/products", get(list_products).post(create_product))
        .route("/products/{slug}", get(get_product))
}

async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.db.categories().list().await?))
}

async fn create_category(
    State(state): State<AppState>,
    body: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let Json(req) = body?;

    let category = state
        .db
        .categories()
        .insert(&NewCategory {
            name: req.name,
            slug: req.slug,
            description: req.description,
        })
        .await?;

    info!(category_id = category.id, slug = %category.slug, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

async fn category_products(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    if state.db.categories().get_by_slug(&slug).await?.is_none() {
        return Err(ApiError::not_found("Category", &slug));
    }
    priced_listing(&state, Some(&slug)).await
}

async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    priced_listing(&state, query.category.as_deref()).await
}

async fn priced_listing(
    state: &AppState,
    category: Option<&str>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.db.products().list_available(category).await?;
    debug!(count = products.len(), category = ?category, "Listing products");

    let priced = state.pricing.price_products(products).await?;
    Ok(Json(priced.into_iter().map(ProductResponse::from).collect()))
}

async fn get_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .db
        .products()
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &slug))?;

    let priced = state.pricing.price_product(product).await?;
    Ok(Json(priced.into()))
}

async fn create_product(
    State(state): State<AppState>,
    body: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let Json(req) = body?;

    let product = state
        .db
        .products()
        .insert(&NewProduct {
            category_id: req.category_id,
            name: req.name,
            slug: req.slug,
            description: req.description,
            price_cents: Money::from_decimal(req.price)?.cents(),
            stock: req.stock,
            available: req.available,
        })
        .await?;

    info!(product_id = product.id, slug = %product.slug, "Product created");

    let priced = state.pricing.price_product(product).await?;
    Ok((StatusCode::CREATED, Json(priced.into())))
}
