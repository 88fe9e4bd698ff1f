//! # Repository Module
//!
//! Database repository implementations for the storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  axum handler / PricingService                                         │
//! │       │                                                                 │
//! │       │  db.coupons().find_by_code(" save10 ")                         │
//! │       ▼                                                                 │
//! │  CouponRepository                                                      │
//! │  ├── find_by_code(&self, code)                                         │
//! │  ├── insert(&self, new)                                                │
//! │  └── redeem(&self, code, user, total, now)                             │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CategoryRepository`](catalog::CategoryRepository) / [`ProductRepository`](catalog::ProductRepository) - catalog reads and admin inserts
//! - [`DiscountRepository`](discount::DiscountRepository) - discounts with product links
//! - [`CouponRepository`](coupon::CouponRepository) - coupons and atomic redemption
//! - [`CartRepository`](cart::CartRepository) - cart rows

pub mod cart;
pub mod catalog;
pub mod coupon;
pub mod discount;

#[cfg(test)]
pub(crate) mod test_support {
    use storefront_core::{Category, Product};

    use super::catalog::{NewCategory, NewProduct};
    use crate::Database;

    pub async fn category(db: &Database, name: &str) -> Category {
        db.categories()
            .insert(&NewCategory {
                name: name.to_string(),
                slug: None,
                description: String::new(),
            })
            .await
            .unwrap()
    }

    /// Available product with 50 units in stock.
    pub async fn product(db: &Database, category_id: i64, name: &str, price_cents: i64) -> Product {
        db.products()
            .insert(&NewProduct {
                category_id,
                name: name.to_string(),
                slug: None,
                description: String::new(),
                price_cents,
                stock: 50,
                available: true,
            })
            .await
            .unwrap()
    }
}
