//! # Seed Data Generator
//!
//! Populates the database with a demo catalog and promotions.
//!
//! ## Usage
//! ```bash
//! # Seed ./storefront.db
//! cargo run -p storefront-db --bin seed
//!
//! # Specify database path
//! cargo run -p storefront-db --bin seed -- --db ./data/storefront.db
//! ```
//!
//! ## Generated Data
//! - Categories: Coffee, Tea, Brewing Gear
//! - A handful of products per category
//! - Two product discounts (percentage and fixed) running for 30 days
//! - Coupons: `SAVE10` (10%), `WELCOME5` ($5 off from $25), `LIMITED1`
//!   (one use), `EXPIRED`

use chrono::{Duration, Utc};
use std::env;
use storefront_core::DiscountKind;
use storefront_db::{Database, DbConfig, NewCategory, NewCoupon, NewDiscount, NewProduct};

/// (category, [(product, price_cents, stock)])
const CATALOG: &[(&str, &[(&str, i64, i64)])] = &[
    (
        "Coffee",
        &[
            ("Espresso Blend 250g", 1290, 40),
            ("Ethiopia Yirgacheffe 250g", 1650, 25),
            ("Colombia Huila 1kg", 4200, 10),
            ("Decaf Swiss Water 250g", 1390, 15),
        ],
    ),
    (
        "Tea",
        &[
            ("Sencha 100g", 990, 30),
            ("Ceremonial Matcha 30g", 2450, 12),
            ("Earl Grey 100g", 850, 35),
        ],
    ),
    (
        "Brewing Gear",
        &[
            ("French Press 1L", 3400, 8),
            ("Pour Over Dripper", 2200, 14),
            ("Burr Grinder", 8900, 5),
            ("Gooseneck Kettle", 5600, 6),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = "storefront.db".to_string();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Usage: seed [--db PATH]");
                println!();
                println!("Options:");
                println!("  --db, -d     Database path (default: storefront.db)");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Storefront Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Database connected and migrated");

    let mut product_ids = Vec::new();
    for (category_name, products) in CATALOG {
        let category = match db
            .categories()
            .insert(&NewCategory {
                name: category_name.to_string(),
                slug: None,
                description: format!("All things {}", category_name.to_lowercase()),
            })
            .await
        {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Skipping category {}: {}", category_name, e);
                continue;
            }
        };

        for (name, price_cents, stock) in products.iter() {
            match db
                .products()
                .insert(&NewProduct {
                    category_id: category.id,
                    name: name.to_string(),
                    slug: None,
                    description: String::new(),
                    price_cents: *price_cents,
                    stock: *stock,
                    available: true,
                })
                .await
            {
                Ok(p) => product_ids.push(p.id),
                Err(e) => eprintln!("Failed to insert {}: {}", name, e),
            }
        }
        println!("  {} → {} products", category.slug, products.len());
    }

    let now = Utc::now();

    let discounts = [
        NewDiscount {
            name: "Spring Coffee Week".to_string(),
            description: "15% off selected coffee".to_string(),
            kind: DiscountKind::Percentage,
            value: 1500,
            active: true,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(30),
            product_ids: product_ids.iter().take(3).copied().collect(),
        },
        NewDiscount {
            name: "Gear Markdown".to_string(),
            description: "$5.00 off brewing gear".to_string(),
            kind: DiscountKind::Fixed,
            value: 500,
            active: true,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(30),
            product_ids: product_ids.iter().rev().take(4).copied().collect(),
        },
    ];
    for discount in &discounts {
        match db.discounts().insert(discount).await {
            Ok(d) => println!("✓ Discount '{}' on {} products", d.name, d.product_ids.len()),
            Err(e) => eprintln!("Failed to insert discount {}: {}", discount.name, e),
        }
    }

    let coupon = |code: &str, value: i64, is_percentage: bool, minimum: i64| NewCoupon {
        code: code.to_string(),
        description: String::new(),
        discount_value: value,
        is_percentage,
        minimum_purchase_cents: minimum,
        active: true,
        valid_from: now - Duration::days(1),
        valid_to: now + Duration::days(90),
        max_uses: None,
    };

    let coupons = [
        coupon("SAVE10", 1000, true, 0),
        coupon("WELCOME5", 500, false, 2500),
        NewCoupon {
            max_uses: Some(1),
            ..coupon("LIMITED1", 2000, true, 0)
        },
        NewCoupon {
            valid_from: now - Duration::days(60),
            valid_to: now - Duration::days(30),
            ..coupon("EXPIRED", 5000, true, 0)
        },
    ];
    for new in &coupons {
        match db.coupons().insert(new).await {
            Ok(c) => println!("✓ Coupon {}", c.code),
            Err(e) => eprintln!("Failed to insert coupon {}: {}", new.code, e),
        }
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
