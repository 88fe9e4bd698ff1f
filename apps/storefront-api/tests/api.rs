//! End-to-end tests of the HTTP surface over an in-memory database.

use axum::http::StatusCode;
use serde_json::json;

use storefront_core::DiscountKind;

mod common;
use common::TestApp;

mod health {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_database() {
        let app = TestApp::new().await;
        let (status, body) = app.send("GET", "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], true);
    }
}

mod catalog {
    use super::*;

    #[tokio::test]
    async fn test_products_are_priced_with_best_discount() {
        let app = TestApp::new().await;
        let beans = app.product("Coffee", "House Blend", 10_000).await;
        let ten_pct = app.discount(DiscountKind::Percentage, 1000, vec![beans.id]).await;
        app.discount(DiscountKind::Fixed, 500, vec![beans.id]).await;

        let (status, body) = app.send("GET", "/products", None).await;
        assert_eq!(status, StatusCode::OK);

        let product = &body[0];
        assert_eq!(product["price"], "100.00");
        assert_eq!(product["current_price"], "90.00");
        assert_eq!(product["applied_discount"], ten_pct);
        assert_eq!(product["active_discounts"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_product_without_discounts_keeps_base_price() {
        let app = TestApp::new().await;
        app.product("Tea", "Sencha", 1290).await;

        let (status, body) = app.send("GET", "/products/sencha", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["price"], "12.90");
        assert_eq!(body["current_price"], "12.90");
        assert!(body["applied_discount"].is_null());
    }

    #[tokio::test]
    async fn test_category_filter_and_unknown_slugs() {
        let app = TestApp::new().await;
        app.product("Coffee", "House Blend", 1000).await;
        app.product("Tea", "Sencha", 900).await;

        let (_, body) = app.send("GET", "/products?category=tea", None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["slug"], "sencha");

        let (status, body) = app.send("GET", "/categories/coffee/products", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["slug"], "house-blend");

        let (status, body) = app.send("GET", "/categories/juice/products", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        let (status, _) = app.send("GET", "/products/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_category_and_product() {
        let app = TestApp::new().await;

        let (status, category) = app
            .send("POST", "/categories", Some(json!({"name": "Brewing Gear"})))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(category["slug"], "brewing-gear");

        let (status, product) = app
            .send(
                "POST",
                "/products",
                Some(json!({
                    "category_id": category["id"],
                    "name": "French Press",
                    "price": "34.00",
                    "stock": 8
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(product["price"], "34.00");

        let (status, body) = app
            .send("POST", "/categories", Some(json!({"name": "Brewing Gear"})))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_price_beyond_supported_range_is_rejected() {
        let app = TestApp::new().await;
        let (_, category) = app
            .send("POST", "/categories", Some(json!({"name": "Teapots"})))
            .await;

        let (status, body) = app
            .send(
                "POST",
                "/products",
                Some(json!({
                    "category_id": category["id"],
                    "name": "Gold Teapot",
                    "price": "50000000000000000",
                    "stock": 1
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (_, products) = app.send("GET", "/products", None).await;
        assert_eq!(products.as_array().unwrap().len(), 0);
    }
}

mod discounts {
    use super::*;

    #[tokio::test]
    async fn test_create_and_filter_by_product() {
        let app = TestApp::new().await;
        let mug = app.product("Gear", "Mug", 1500).await;
        let cup = app.product("Gear", "Cup", 900).await;

        let (status, body) = app
            .send(
                "POST",
                "/discounts",
                Some(json!({
                    "name": "Mug Week",
                    "kind": "fixed",
                    "value": "2.50",
                    "start_date": "2026-01-01T00:00:00Z",
                    "end_date": "2026-12-31T23:59:59Z",
                    "products": [mug.id]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["value"], "2.50");
        assert_eq!(body["products"], json!([mug.id]));

        let (_, listed) = app.send("GET", &format!("/discounts?product={}", mug.id), None).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (_, listed) = app.send("GET", &format!("/discounts?product={}", cup.id), None).await;
        assert!(listed.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_bad_value_and_inverted_window() {
        let app = TestApp::new().await;
        let mug = app.product("Gear", "Mug", 1500).await;

        let (status, body) = app
            .send(
                "POST",
                "/discounts",
                Some(json!({
                    "name": "Too Much",
                    "kind": "percentage",
                    "value": 150,
                    "start_date": "2026-01-01T00:00:00Z",
                    "end_date": "2026-12-31T00:00:00Z",
                    "products": [mug.id]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, _) = app
            .send(
                "POST",
                "/discounts",
                Some(json!({
                    "name": "Backwards",
                    "kind": "percentage",
                    "value": 10,
                    "start_date": "2026-12-31T00:00:00Z",
                    "end_date": "2026-01-01T00:00:00Z",
                    "products": [mug.id]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send(
                "POST",
                "/discounts",
                Some(json!({
                    "name": "Ghost",
                    "kind": "percentage",
                    "value": 10,
                    "start_date": "2026-01-01T00:00:00Z",
                    "end_date": "2026-12-31T00:00:00Z",
                    "products": [9999]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

mod coupons {
    use super::*;

    #[tokio::test]
    async fn test_apply_ten_percent() {
        let app = TestApp::new().await;
        app.coupon("SAVE10", 1000, 0, None).await;

        let (status, body) = app
            .send(
                "POST",
                "/cart/apply_coupon",
                Some(json!({"code": " save10 ", "cart_total": "100"})),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);
        assert_eq!(body["discount_amount"], "10.00");
        assert_eq!(body["final_total"], "90.00");
        assert_eq!(body["message"], "Coupon applied successfully");
    }

    #[tokio::test]
    async fn test_numeric_total_is_accepted() {
        let app = TestApp::new().await;
        app.coupon("SAVE10", 1000, 0, None).await;

        let (status, body) = app
            .send(
                "POST",
                "/cart/apply_coupon",
                Some(json!({"code": "SAVE10", "cart_total": 49.99})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["discount_amount"], "5.00");
        assert_eq!(body["final_total"], "44.99");
    }

    #[tokio::test]
    async fn test_unknown_code_is_404() {
        let app = TestApp::new().await;
        let (status, body) = app
            .send(
                "POST",
                "/cart/apply_coupon",
                Some(json!({"code": "NOPE", "cart_total": "10"})),
            )
            .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["valid"], false);
        assert_eq!(body["message"], "Coupon not found");
    }

    #[tokio::test]
    async fn test_minimum_purchase_message_names_the_minimum() {
        let app = TestApp::new().await;
        app.coupon("BIG", 1000, 5000, None).await;

        let (status, body) = app
            .send(
                "POST",
                "/cart/apply_coupon",
                Some(json!({"code": "BIG", "cart_total": "49.99"})),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["valid"], false);
        assert!(body["message"].as_str().unwrap().contains("50"));
        assert!(body.get("discount_amount").is_none());
    }

    #[tokio::test]
    async fn test_exhausted_coupon() {
        let app = TestApp::new().await;
        app.coupon("ONCE", 1000, 0, Some(1)).await;
        app.db
            .coupons()
            .redeem("ONCE", "someone", storefront_core::Money::from_cents(1000), chrono::Utc::now())
            .await
            .unwrap();

        let (status, body) = app
            .send(
                "POST",
                "/cart/apply_coupon",
                Some(json!({"code": "ONCE", "cart_total": "10"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Coupon has reached its usage limit");
    }

    #[tokio::test]
    async fn test_malformed_input_never_500s() {
        let app = TestApp::new().await;
        app.coupon("SAVE10", 1000, 0, None).await;

        let (status, body) = app
            .send(
                "POST",
                "/cart/apply_coupon",
                Some(json!({"code": "SAVE10", "cart_total": "abc"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid cart total");

        let (status, body) = app.send_raw("POST", "/coupons/validate", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["valid"], false);

        let (status, body) = app
            .send("POST", "/coupons/validate", Some(json!({"code": "  "})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Coupon code is required");
    }

    #[tokio::test]
    async fn test_validate_without_total_skips_minimum() {
        let app = TestApp::new().await;
        app.coupon("BIG", 1000, 5000, None).await;

        let (status, body) = app
            .send("POST", "/coupons/validate", Some(json!({"code": "big"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);
        assert!(body.get("final_total").is_none());

        let (status, _) = app
            .send(
                "POST",
                "/coupons/validate",
                Some(json!({"code": "big", "cart_total": "10"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_validate_does_not_consume_uses() {
        let app = TestApp::new().await;
        let id = app.coupon("ONCE", 1000, 0, Some(1)).await;

        for _ in 0..3 {
            let (status, _) = app
                .send(
                    "POST",
                    "/coupons/validate",
                    Some(json!({"code": "ONCE", "cart_total": "20"})),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
        }
        assert!(app.db.coupons().usages(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_coupon_canonicalizes_code() {
        let app = TestApp::new().await;
        let body = json!({
            "code": " spring25 ",
            "discount_value": "25",
            "valid_from": "2026-01-01T00:00:00Z",
            "valid_to": "2026-12-31T00:00:00Z"
        });

        let (status, coupon) = app.send("POST", "/coupons", Some(body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(coupon["code"], "SPRING25");
        assert_eq!(coupon["discount_value"], "25.00");
        assert_eq!(coupon["minimum_purchase"], "0.00");

        let (status, _) = app.send("POST", "/coupons", Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}

mod cart {
    use super::*;

    #[tokio::test]
    async fn test_cart_lifecycle() {
        let app = TestApp::new().await;
        let sencha = app.product("Tea", "Sencha", 1200).await;
        let matcha = app.product("Tea", "Matcha", 2450).await;
        // Display discounts never reach the cart total
        app.discount(DiscountKind::Percentage, 5000, vec![sencha.id]).await;

        let (status, opened) = app.send("POST", "/cart", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let cart_id = opened["cart_id"].as_str().unwrap().to_string();

        let (status, _) = app
            .send(
                "POST",
                &format!("/cart/{cart_id}/items"),
                Some(json!({"product_id": sencha.id, "quantity": 2})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, item) = app
            .send(
                "POST",
                &format!("/cart/{cart_id}/items"),
                Some(json!({"product_id": matcha.id})),
            )
            .await;
        assert_eq!(item["quantity"], 1);

        let (status, total) = app.send("GET", &format!("/cart/{cart_id}/total"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(total["total"], "48.50");
        assert_eq!(total["items_count"], 2);

        let item_id = item["id"].as_i64().unwrap();
        let (status, _) = app
            .send(
                "PATCH",
                &format!("/cart/{cart_id}/items/{item_id}"),
                Some(json!({"quantity": 2})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, cart) = app.send("GET", &format!("/cart/{cart_id}"), None).await;
        assert_eq!(cart["total"], "73.00");
        assert_eq!(cart["items"][1]["line_total"], "49.00");

        let (status, _) = app
            .send("DELETE", &format!("/cart/{cart_id}/items/{item_id}"), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, total) = app.send("GET", &format!("/cart/{cart_id}/total"), None).await;
        assert_eq!(total["total"], "24.00");
        assert_eq!(total["items_count"], 1);
    }

    #[tokio::test]
    async fn test_bad_quantities_and_unknown_carts() {
        let app = TestApp::new().await;
        let sencha = app.product("Tea", "Sencha", 1200).await;
        let cart_id = app.cart_with(&[]).await;

        let (status, body) = app
            .send(
                "POST",
                &format!("/cart/{cart_id}/items"),
                Some(json!({"product_id": sencha.id, "quantity": 0})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, _) = app
            .send("GET", "/cart/3f1c7c3e-0000-4000-8000-000000000000/total", None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.send("GET", "/cart/not-a-cart", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_quantity_change_respects_stock() {
        let app = TestApp::new().await;
        // seeded with 20 units
        let sencha = app.product("Tea", "Sencha", 1200).await;
        let cart_id = app.cart_with(&[(sencha.id, 1)]).await;
        let (_, cart) = app.send("GET", &format!("/cart/{cart_id}"), None).await;
        let item_id = cart["items"][0]["id"].as_i64().unwrap();

        let (status, body) = app
            .send(
                "PATCH",
                &format!("/cart/{cart_id}/items/{item_id}"),
                Some(json!({"quantity": 21})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, item) = app
            .send(
                "PATCH",
                &format!("/cart/{cart_id}/items/{item_id}"),
                Some(json!({"quantity": 20})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(item["quantity"], 20);
    }
}

mod payment {
    use super::*;

    #[tokio::test]
    async fn test_verify_completed_order() {
        let app = TestApp::new().await;
        let (status, body) = app
            .send("POST", "/payment/verify", Some(json!({"orderID": "5O190127TN364715T"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
    }

    #[tokio::test]
    async fn test_unpaid_order_is_upstream_error() {
        let app = TestApp::with_payment_status("APPROVED").await;
        let (status, body) = app
            .send("POST", "/payment/verify", Some(json!({"order_id": "ORDER-1"})))
            .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "PAYMENT_ERROR");
    }
}

mod checkout {
    use super::*;

    #[tokio::test]
    async fn test_checkout_redeems_coupon_once_per_user() {
        let app = TestApp::new().await;
        let beans = app.product("Coffee", "House Blend", 5000).await;
        let coupon_id = app.coupon("SAVE10", 1000, 0, None).await;

        let cart_id = app.cart_with(&[(beans.id, 2)]).await;
        let (status, body) = app
            .send(
                "POST",
                "/checkout",
                Some(json!({
                    "cart_id": cart_id,
                    "user_id": "user-1",
                    "payment_order_id": "ORDER-1",
                    "coupon_code": "save10"
                })),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["order_total"], "100.00");
        assert_eq!(body["discount_amount"], "10.00");
        assert_eq!(body["final_total"], "90.00");
        assert_eq!(body["coupon_code"], "SAVE10");

        let (_, total) = app.send("GET", &format!("/cart/{cart_id}/total"), None).await;
        assert_eq!(total["items_count"], 0);

        let usages = app.db.coupons().usages(coupon_id).await.unwrap();
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].discount_amount_cents, 1000);

        let cart_id = app.cart_with(&[(beans.id, 1)]).await;
        let (status, body) = app
            .send(
                "POST",
                "/checkout",
                Some(json!({
                    "cart_id": cart_id,
                    "user_id": "user-1",
                    "payment_order_id": "ORDER-2",
                    "coupon_code": "SAVE10"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");

        let coupon = app.db.coupons().find_by_code("SAVE10").await.unwrap().unwrap();
        assert_eq!(coupon.current_uses, 1);
    }

    #[tokio::test]
    async fn test_checkout_without_coupon() {
        let app = TestApp::new().await;
        let beans = app.product("Coffee", "House Blend", 1250).await;
        let cart_id = app.cart_with(&[(beans.id, 1)]).await;

        let (status, body) = app
            .send(
                "POST",
                "/checkout",
                Some(json!({
                    "cart_id": cart_id,
                    "user_id": "user-1",
                    "payment_order_id": "ORDER-1"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["discount_amount"], "0.00");
        assert_eq!(body["final_total"], "12.50");
        assert!(body.get("coupon_code").is_none());
    }

    #[tokio::test]
    async fn test_unpaid_checkout_changes_nothing() {
        let app = TestApp::with_payment_status("PAYER_ACTION_REQUIRED").await;
        let beans = app.product("Coffee", "House Blend", 5000).await;
        let coupon_id = app.coupon("SAVE10", 1000, 0, None).await;
        let cart_id = app.cart_with(&[(beans.id, 1)]).await;

        let (status, _) = app
            .send(
                "POST",
                "/checkout",
                Some(json!({
                    "cart_id": cart_id,
                    "user_id": "user-1",
                    "payment_order_id": "ORDER-1",
                    "coupon_code": "SAVE10"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        assert!(app.db.coupons().usages(coupon_id).await.unwrap().is_empty());
        let (_, total) = app.send("GET", &format!("/cart/{cart_id}/total"), None).await;
        assert_eq!(total["items_count"], 1);
    }

    #[tokio::test]
    async fn test_empty_cart_and_rejected_coupon() {
        let app = TestApp::new().await;
        let beans = app.product("Coffee", "House Blend", 1000).await;
        app.coupon("BIG", 1000, 5000, None).await;

        let empty = app.cart_with(&[]).await;
        let (status, body) = app
            .send(
                "POST",
                "/checkout",
                Some(json!({"cart_id": empty, "user_id": "u", "payment_order_id": "O"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "CART_ERROR");

        let cart_id = app.cart_with(&[(beans.id, 1)]).await;
        let (status, body) = app
            .send(
                "POST",
                "/checkout",
                Some(json!({
                    "cart_id": cart_id,
                    "user_id": "u",
                    "payment_order_id": "O",
                    "coupon_code": "BIG"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "COUPON_REJECTED");
    }
}
