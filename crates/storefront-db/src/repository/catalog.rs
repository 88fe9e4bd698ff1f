//! # Catalog Repository
//!
//! Database operations for categories and products.
//!
//! Slugs are unique per table. When a caller omits one it is derived from
//! the name with [`slugify`].

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use storefront_core::validation::{
    slugify, validate_name, validate_price_cents, validate_slug, validate_stock,
};
use storefront_core::{Category, Product};

const PRODUCT_COLUMNS: &str = "id, category_id, name, slug, description, price_cents, stock, \
                               available, created_at, updated_at";

/// Input for creating a category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: Option<String>,
    pub description: String,
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category_id: i64,
    pub name: String,
    pub slug: Option<String>,
    pub description: String,
    pub price_cents: i64,
    pub stock: i64,
    pub available: bool,
}

/// Resolves the slug to store: explicit one if given, else derived from `name`.
fn resolve_slug(name: &str, slug: Option<&str>) -> DbResult<String> {
    let slug = match slug {
        Some(s) => s.trim().to_string(),
        None => slugify(name),
    };
    validate_slug(&slug)?;
    Ok(slug)
}

/// Maps a slug UNIQUE failure to a duplicate error carrying the value.
fn map_slug_conflict(err: sqlx::Error, table: &str, slug: &str) -> DbError {
    let err = DbError::from(err);
    if err.is_unique_violation_on(&format!("{table}.slug")) {
        DbError::duplicate("slug", slug)
    } else {
        err
    }
}

// =============================================================================
// Categories
// =============================================================================

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists all categories ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, slug, description, created_at, updated_at
            FROM categories
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn get_by_slug(&self, slug: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, slug, description, created_at, updated_at
            FROM categories
            WHERE slug = ?1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Creates a category. The slug is derived from the name when omitted.
    pub async fn insert(&self, new: &NewCategory) -> DbResult<Category> {
        validate_name(&new.name)?;
        let name = new.name.trim();
        let slug = resolve_slug(name, new.slug.as_deref())?;
        let now = Utc::now();

        debug!(name = %name, slug = %slug, "Inserting category");

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, slug, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            RETURNING id, name, slug, description, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(&slug)
        .bind(&new.description)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_slug_conflict(e, "categories", &slug))?;

        Ok(category)
    }
}

// =============================================================================
// Products
// =============================================================================

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists available products, newest first, optionally restricted to a
    /// category slug.
    pub async fn list_available(&self, category_slug: Option<&str>) -> DbResult<Vec<Product>> {
        debug!(category = ?category_slug, "Listing available products");

        let products = match category_slug {
            Some(slug) => {
                sqlx::query_as::<_, Product>(&format!(
                    r#"
                    SELECT {PRODUCT_COLUMNS}
                    FROM products
                    WHERE available = 1
                      AND category_id = (SELECT id FROM categories WHERE slug = ?1)
                    ORDER BY created_at DESC, id DESC
                    "#
                ))
                .bind(slug)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Product>(&format!(
                    r#"
                    SELECT {PRODUCT_COLUMNS}
                    FROM products
                    WHERE available = 1
                    ORDER BY created_at DESC, id DESC
                    "#
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(products)
    }

    /// Gets an available product by slug.
    pub async fn get_by_slug(&self, slug: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE slug = ?1 AND available = 1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by id regardless of availability.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Creates a product in an existing category.
    pub async fn insert(&self, new: &NewProduct) -> DbResult<Product> {
        validate_name(&new.name)?;
        validate_price_cents(new.price_cents)?;
        validate_stock(new.stock)?;
        let name = new.name.trim();
        let slug = resolve_slug(name, new.slug.as_deref())?;
        let now = Utc::now();

        debug!(name = %name, slug = %slug, price_cents = new.price_cents, "Inserting product");

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (
                category_id, name, slug, description,
                price_cents, stock, available, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(new.category_id)
        .bind(name)
        .bind(&slug)
        .bind(&new.description)
        .bind(new.price_cents)
        .bind(new.stock)
        .bind(new.available)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match map_slug_conflict(e, "products", &slug) {
            DbError::ForeignKeyViolation { .. } => DbError::not_found("Category", new.category_id),
            other => other,
        })?;

        Ok(product)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
