//! Liveness endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::warn;

use storefront_db::migrations::migration_status;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub migrations_applied: usize,
    pub migrations_total: usize,
    pub version: &'static str,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// `200` when the database answers and is fully migrated, `503` otherwise.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.db.health_check().await;
    let (total, applied, migrated) = match migration_status(state.db.pool()).await {
        Ok((total, applied)) => (total, applied, total == applied),
        Err(_) => (0, 0, false),
    };

    let healthy = database && migrated;
    if !healthy {
        warn!(database, applied, total, "Health check failed");
    }

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" },
            database,
            migrations_applied: applied,
            migrations_total: total,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
