//! # storefront-api
//!
//! HTTP JSON API over `storefront-core` pricing rules and `storefront-db`
//! storage.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TimeoutLayer ──► TraceLayer ──► CorsLayer ──► Router<AppState>        │
//! │                                                    │                    │
//! │                                  ┌─────────────────┼─────────────────┐  │
//! │                                  ▼                 ▼                 ▼  │
//! │                          PricingService       Database     PaymentGateway│
//! │                       (clock + core rules)   (repositories)   (reqwest) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The binary in `main.rs` only loads configuration and serves [`app`];
//! integration tests build the same router over an in-memory database.

pub mod config;
pub mod error;
pub mod routes;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use storefront_db::Database;

use crate::services::payment::PaymentGateway;
use crate::services::pricing::PricingService;

/// Shared handler state. Cloned per request; every field is a handle.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub pricing: PricingService,
    pub payments: Arc<dyn PaymentGateway>,
}

impl AppState {
    pub fn new(db: Database, payments: Arc<dyn PaymentGateway>) -> Self {
        AppState {
            pricing: PricingService::new(db.clone()),
            db,
            payments,
        }
    }
}

/// Builds the full application router.
pub fn app(state: AppState, request_timeout: Duration) -> Router {
    routes::router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}
