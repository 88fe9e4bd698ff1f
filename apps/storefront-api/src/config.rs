//! Storefront API configuration.
//!
//! Configuration is loaded from environment variables (a `.env` file is
//! read first by `main`) with fallback to defaults. It is loaded once and
//! passed down explicitly; nothing below `main` reads the environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::services::payment::PaymentConfig;

const DEFAULT_PAYPAL_BASE_URL: &str = "https://api-m.sandbox.paypal.com";

/// Storefront API configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// HTTP port (`STOREFRONT_PORT`, default 8000)
    pub port: u16,

    /// SQLite file (`STOREFRONT_DB_PATH`, default `storefront.db`)
    pub database_path: PathBuf,

    /// Pool size (`STOREFRONT_DB_MAX_CONNECTIONS`, default 5)
    pub db_max_connections: u32,

    /// Whole-request timeout (`STOREFRONT_REQUEST_TIMEOUT_SECS`, default 30)
    pub request_timeout: Duration,

    /// Payment provider settings (`PAYPAL_*`)
    pub payment: PaymentConfig,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = StorefrontConfig {
            port: parse_or(&lookup, "STOREFRONT_PORT", 8000)?,

            database_path: lookup("STOREFRONT_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("storefront.db")),

            db_max_connections: parse_or(&lookup, "STOREFRONT_DB_MAX_CONNECTIONS", 5)?,

            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "STOREFRONT_REQUEST_TIMEOUT_SECS",
                30,
            )?),

            payment: PaymentConfig {
                base_url: lookup("PAYPAL_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_PAYPAL_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                client_id: lookup("PAYPAL_CLIENT_ID").unwrap_or_default(),
                secret_key: lookup("PAYPAL_SECRET_KEY").unwrap_or_default(),
                timeout: Duration::from_secs(parse_or(&lookup, "PAYPAL_TIMEOUT_SECS", 10)?),
            },
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "STOREFRONT_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
