//! # storefront-db: Database Layer for the Storefront
//!
//! SQLite persistence for the catalog, promotions and carts, using sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Data Flow                             │
//! │                                                                         │
//! │  axum handler (POST /checkout)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  storefront-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐   ┌────────────┐ │   │
//! │  │   │   Database    │    │    Repositories    │   │ Migrations │ │   │
//! │  │   │   (pool.rs)   │    │                    │   │ (embedded) │ │   │
//! │  │   │               │◄───│ CategoryRepository │   │            │ │   │
//! │  │   │  SqlitePool   │    │ ProductRepository  │   │ 001_init   │ │   │
//! │  │   │               │    │ DiscountRepository │   │            │ │   │
//! │  │   │               │    │ CouponRepository   │   │            │ │   │
//! │  │   │               │    │ CartRepository     │   │            │ │   │
//! │  │   └───────────────┘    └────────────────────┘   └────────────┘ │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (storefront.db)                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - `Database` handle and `DbConfig`
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("storefront.db")).await?;
//! let coupon = db.coupons().find_by_code(" save10 ").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, DbLocation};

pub use repository::cart::CartRepository;
pub use repository::catalog::{CategoryRepository, NewCategory, NewProduct, ProductRepository};
pub use repository::coupon::{CouponRepository, NewCoupon, Redemption};
pub use repository::discount::{DiscountRepository, NewDiscount};
