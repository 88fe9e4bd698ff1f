//! # Payment Collaborator
//!
//! Confirms that an order agreed with the payment provider reached the
//! `COMPLETED` state. Nothing else about payments lives here.
//!
//! ## PayPal Flow
//! ```text
//! verify(order_id)
//!     │
//!     ├──► POST {base}/v1/oauth2/token          (basic auth: client id/secret)
//!     │         └── access_token
//!     │
//!     └──► GET  {base}/v2/checkout/orders/{id}  (bearer access_token)
//!               └── status == "COMPLETED" ? Ok : PaymentError::NotCompleted
//! ```
//!
//! Every call is bounded by the client timeout from [`PaymentConfig`]. A
//! failure is returned to the caller as a recoverable [`PaymentError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Provider status of a paid order.
pub const STATUS_COMPLETED: &str = "COMPLETED";

/// Settings for the payment provider, injected at construction.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub base_url: String,
    pub client_id: String,
    pub secret_key: String,
    pub timeout: Duration,
}

impl PaymentConfig {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.secret_key.is_empty()
    }
}

/// Payment verification failures.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment provider credentials are not configured")]
    NotConfigured,

    #[error("Invalid payment order id")]
    InvalidOrderId,

    #[error("Payment provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payment provider returned HTTP {status}")]
    Provider { status: u16 },

    #[error("Payment order is {status}, not COMPLETED")]
    NotCompleted { status: String },
}

/// Anything that can report the status of a provider order.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Returns the provider's status string for `order_id`.
    async fn order_status(&self, order_id: &str) -> Result<String, PaymentError>;

    /// Succeeds only when the order is `COMPLETED`.
    async fn confirm(&self, order_id: &str) -> Result<(), PaymentError> {
        let status = self.order_status(order_id).await?;
        if status == STATUS_COMPLETED {
            Ok(())
        } else {
            Err(PaymentError::NotCompleted { status })
        }
    }
}

/// Order ids are provider tokens; anything else is refused before it can
/// reach a URL path.
fn validate_order_id(order_id: &str) -> Result<(), PaymentError> {
    let valid = !order_id.is_empty()
        && order_id.len() <= 64
        && order_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(PaymentError::InvalidOrderId)
    }
}

// =============================================================================
// PayPal
// =============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    status: String,
}

/// PayPal REST implementation of [`PaymentGateway`].
#[derive(Debug, Clone)]
pub struct PayPalGateway {
    client: reqwest::Client,
    config: PaymentConfig,
}

impl PayPalGateway {
    pub fn new(config: PaymentConfig) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(PayPalGateway { client, config })
    }

    async fn access_token(&self) -> Result<String, PaymentError> {
        let response = self
            .client
            .post(format!("{}/v1/oauth2/token", self.config.base_url))
            .basic_auth(&self.config.client_id, Some(&self.config.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Payment provider rejected credentials");
            return Err(PaymentError::Provider {
                status: response.status().as_u16(),
            });
        }

        Ok(response.json::<TokenResponse>().await?.access_token)
    }
}

#[async_trait]
impl PaymentGateway for PayPalGateway {
    async fn order_status(&self, order_id: &str) -> Result<String, PaymentError> {
        if !self.config.is_configured() {
            return Err(PaymentError::NotConfigured);
        }
        validate_order_id(order_id)?;

        let token = self.access_token().await?;

        let response = self
            .client
            .get(format!("{}/v2/checkout/orders/{}", self.config.base_url, order_id))
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(order_id, status = %response.status(), "Order lookup failed");
            return Err(PaymentError::Provider {
                status: response.status().as_u16(),
            });
        }

        let order = response.json::<OrderResponse>().await?;
        debug!(order_id, status = %order.status, "Fetched payment order status");
        Ok(order.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedStatus(&'static str);

    #[async_trait]
    impl PaymentGateway for FixedStatus {
        async fn order_status(&self, _order_id: &str) -> Result<String, PaymentError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_confirm_requires_completed() {
        assert!(FixedStatus("COMPLETED").confirm("ORDER-1").await.is_ok());

        let err = FixedStatus("APPROVED").confirm("ORDER-1").await.unwrap_err();
        assert!(matches!(err, PaymentError::NotCompleted { ref status } if status == "APPROVED"));
    }

    #[test]
    fn test_validate_order_id() {
        assert!(validate_order_id("5O190127TN364715T").is_ok());
        assert!(validate_order_id("").is_err());
        assert!(validate_order_id("../v1/identity").is_err());
        assert!(validate_order_id(&"A".repeat(65)).is_err());
    }

    #[tokio::test]
    async fn test_unconfigured_gateway_fails_without_network() {
        let gateway = PayPalGateway::new(PaymentConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            client_id: String::new(),
            secret_key: String::new(),
            timeout: Duration::from_millis(100),
        })
        .unwrap();

        assert!(matches!(
            gateway.order_status("ORDER-1").await,
            Err(PaymentError::NotConfigured)
        ));
    }
}
