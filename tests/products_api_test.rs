mod common;

use axum::http::Method;
use rust_decimal_macros::dec;
use serde_json::json;

use common::{decimal_field, response_json, TestApp};

#[tokio::test]
async fn product_crud_lifecycle() {
    let app = TestApp::new().await;

    let category = app.seed_category("Eau de Parfum").await;
    let category_id = category["id"].as_str().unwrap().to_string();

    // Create with defaults for the optional fields
    let created = app
        .seed_product(json!({
            "name": "Amber Noir",
            "purchase_price": "10",
            "sale_price": "20",
            "category_id": category_id,
        }))
        .await;

    assert_eq!(created["name"], "Amber Noir");
    assert_eq!(created["stock"], 0);
    assert_eq!(created["active"], true);
    assert_eq!(created["discount_active"], false);
    assert_eq!(decimal_field(&created["discount_percent"]), dec!(0));
    assert_eq!(decimal_field(&created["effective_price"]), dec!(20));
    let id = created["id"].as_str().unwrap().to_string();

    // Fetch joins the category name
    let response = app
        .request(Method::GET, &format!("/api/v1/products/{id}"), None)
        .await;
    assert_eq!(response.status(), 200);
    let fetched = response_json(response).await;
    assert_eq!(fetched["data"]["category"]["name"], "Eau de Parfum");

    // Sparse update: only the provided fields change
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/products/{id}"),
            Some(json!({ "stock": 7, "discount_percent": "25", "discount_active": true })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let updated = response_json(response).await;
    assert_eq!(updated["data"]["name"], "Amber Noir");
    assert_eq!(updated["data"]["stock"], 7);
    assert_eq!(decimal_field(&updated["data"]["effective_price"]), dec!(15));

    // Soft delete flips the active flag but keeps the row
    let response = app
        .request(Method::DELETE, &format!("/api/v1/products/{id}"), None)
        .await;
    assert_eq!(response.status(), 200);
    let deleted = response_json(response).await;
    assert_eq!(deleted["data"]["active"], false);

    let response = app
        .request(Method::GET, &format!("/api/v1/products/{id}"), None)
        .await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn listing_filters_by_active_flag_and_category() {
    let app = TestApp::new().await;

    let category = app.seed_category("Citrus").await;
    let category_id = category["id"].as_str().unwrap().to_string();

    let in_category = app
        .seed_product(json!({
            "name": "Citrus Bloom",
            "purchase_price": "5",
            "sale_price": "12",
            "category_id": category_id,
        }))
        .await;
    let other = app
        .seed_product(json!({
            "name": "Leather Oud",
            "purchase_price": "15",
            "sale_price": "30",
        }))
        .await;

    // Soft-delete the second product
    let other_id = other["id"].as_str().unwrap();
    let response = app
        .request(Method::DELETE, &format!("/api/v1/products/{other_id}"), None)
        .await;
    assert_eq!(response.status(), 200);

    // Unfiltered listing returns both, newest first
    let response = app.request(Method::GET, "/api/v1/products", None).await;
    assert_eq!(response.status(), 200);
    let all = response_json(response).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 2);

    // Active filter drops the soft-deleted product
    let response = app
        .request(Method::GET, "/api/v1/products?active=true", None)
        .await;
    let active = response_json(response).await;
    let names: Vec<&str> = active["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Citrus Bloom"]);

    // Category filter
    let category_id = in_category["category_id"].as_str().unwrap();
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/products?category_id={category_id}"),
            None,
        )
        .await;
    let by_category = response_json(response).await;
    assert_eq!(by_category["data"].as_array().unwrap().len(), 1);
    assert_eq!(by_category["data"][0]["name"], "Citrus Bloom");
}

#[tokio::test]
async fn create_rejects_out_of_range_fields() {
    let app = TestApp::new().await;

    // Missing required fields
    let response = app
        .request(Method::POST, "/api/v1/products", Some(json!({})))
        .await;
    assert_eq!(response.status(), 400);
    let body = response_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("required"));

    // Blank name
    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({ "name": "   ", "purchase_price": "1", "sale_price": "2" })),
        )
        .await;
    assert_eq!(response.status(), 400);

    // Negative price
    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({ "name": "X", "purchase_price": "-1", "sale_price": "2" })),
        )
        .await;
    assert_eq!(response.status(), 400);

    // Discount out of range
    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "X",
                "purchase_price": "1",
                "sale_price": "2",
                "discount_percent": "150",
            })),
        )
        .await;
    assert_eq!(response.status(), 400);
    let body = response_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("discount_percent"));

    // Negative stock
    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({ "name": "X", "purchase_price": "1", "sale_price": "2", "stock": -3 })),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn update_rejects_invalid_patches_and_missing_products() {
    let app = TestApp::new().await;

    let created = app
        .seed_product(json!({ "name": "Amber Noir", "purchase_price": "10", "sale_price": "20" }))
        .await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/products/{id}"),
            Some(json!({ "sale_price": "-5" })),
        )
        .await;
    assert_eq!(response.status(), 400);

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/products/{}", uuid::Uuid::new_v4()),
            Some(json!({ "stock": 1 })),
        )
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn missing_product_returns_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/products/{}", uuid::Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(response.status(), 404);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Not Found");
}
