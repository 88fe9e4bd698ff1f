//! # Database Errors
//!
//! ```text
//! sqlx::Error ──────────┐
//! ValidationError ──────┼──► DbError ──► ApiError (storefront-api)
//! CouponRejection ──────┘
//! ```
//!
//! Constraint failures are classified by SQLite's error kind, so callers can
//! tell a duplicate slug or a second redemption apart from a broken query.

use sqlx::error::ErrorKind;
use storefront_core::{CouponRejection, ValidationError};
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the write.
    ///
    /// `field` holds SQLite's `table.column` list until a repository
    /// replaces it with the user-facing field name.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A referenced category, product or cart does not exist.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A CHECK constraint rejected the row.
    #[error("Constraint violated: {0}")]
    CheckViolation(String),

    /// Input rejected before reaching SQL.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Coupon failed re-validation inside a redemption.
    #[error(transparent)]
    CouponRejected(#[from] CouponRejection),

    /// The user already has a usage row for this coupon.
    #[error("Coupon already redeemed by this user")]
    AlreadyRedeemed,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// No connection became free within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Checks whether this is a UNIQUE violation naming `table_column`.
    ///
    /// A prefix such as `"coupon_usages."` matches any column of a
    /// composite key on that table.
    pub fn is_unique_violation_on(&self, table_column: &str) -> bool {
        matches!(self, DbError::UniqueViolation { field, .. } if field.contains(table_column))
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    // SQLite: "UNIQUE constraint failed: coupons.code"
                    ErrorKind::UniqueViolation => DbError::UniqueViolation {
                        field: message
                            .split_once(": ")
                            .map(|(_, columns)| columns.to_string())
                            .unwrap_or(message),
                        value: "unknown".to_string(),
                    },
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message },
                    ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                        DbError::CheckViolation(message)
                    }
                    _ => DbError::QueryFailed(message),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),
            other => DbError::QueryFailed(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
