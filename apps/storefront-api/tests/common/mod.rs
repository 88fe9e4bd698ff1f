//! Shared helpers for the API integration tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

use storefront_api::services::payment::{PaymentError, PaymentGateway};
use storefront_api::{app, AppState};
use storefront_core::{DiscountKind, Product};
use storefront_db::{Database, DbConfig, NewCategory, NewCoupon, NewDiscount, NewProduct};

/// Payment provider stand-in reporting a fixed order status.
pub struct StubGateway(pub &'static str);

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn order_status(&self, _order_id: &str) -> Result<String, PaymentError> {
        Ok(self.0.to_string())
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: Database,
}

impl TestApp {
    /// Router over a fresh in-memory database, paid orders always COMPLETED.
    pub async fn new() -> Self {
        Self::with_payment_status("COMPLETED").await
    }

    pub async fn with_payment_status(status: &'static str) -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = AppState::new(db.clone(), Arc::new(StubGateway(status)));
        TestApp {
            router: app(state, Duration::from_secs(5)),
            db,
        }
    }

    /// Sends a request and returns the status with the parsed JSON body
    /// (`Value::Null` when the body is empty).
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send_request(builder.body(body).unwrap()).await
    }

    /// Sends a raw body with a JSON content type.
    pub async fn send_raw(&self, method: &str, uri: &str, raw: &'static str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(raw))
            .unwrap();
        self.send_request(request).await
    }

    async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn product(&self, category: &str, name: &str, price_cents: i64) -> Product {
        let category = match self.db.categories().get_by_slug(&category.to_lowercase()).await.unwrap() {
            Some(existing) => existing,
            None => self
                .db
                .categories()
                .insert(&NewCategory {
                    name: category.to_string(),
                    slug: None,
                    description: String::new(),
                })
                .await
                .unwrap(),
        };

        self.db
            .products()
            .insert(&NewProduct {
                category_id: category.id,
                name: name.to_string(),
                slug: None,
                description: String::new(),
                price_cents,
                stock: 20,
                available: true,
            })
            .await
            .unwrap()
    }

    /// Running discount (one day either side of now).
    pub async fn discount(&self, kind: DiscountKind, value: i64, product_ids: Vec<i64>) -> i64 {
        let now = Utc::now();
        self.db
            .discounts()
            .insert(&NewDiscount {
                name: format!("{:?} {}", kind, value),
                description: String::new(),
                kind,
                value,
                active: true,
                start_date: now - chrono::Duration::days(1),
                end_date: now + chrono::Duration::days(1),
                product_ids,
            })
            .await
            .unwrap()
            .id
    }

    /// Running percentage coupon; `value` in hundredths of a percent.
    pub async fn coupon(&self, code: &str, value: i64, minimum_cents: i64, max_uses: Option<i64>) -> i64 {
        let now = Utc::now();
        self.db
            .coupons()
            .insert(&NewCoupon {
                code: code.to_string(),
                description: String::new(),
                discount_value: value,
                is_percentage: true,
                minimum_purchase_cents: minimum_cents,
                active: true,
                valid_from: now - chrono::Duration::days(1),
                valid_to: now + chrono::Duration::days(1),
                max_uses,
            })
            .await
            .unwrap()
            .id
    }

    /// Opens a cart and adds one row per `(product_id, quantity)`.
    pub async fn cart_with(&self, rows: &[(i64, i64)]) -> String {
        let cart_id = self.db.carts().open().await.unwrap();
        for (product_id, quantity) in rows {
            self.db
                .carts()
                .add_item(&cart_id, *product_id, *quantity)
                .await
                .unwrap();
        }
        cart_id
    }
}
