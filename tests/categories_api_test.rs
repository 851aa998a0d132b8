mod common;

use axum::http::Method;
use serde_json::json;

use common::{response_json, TestApp};

#[tokio::test]
async fn categories_list_alphabetically() {
    let app = TestApp::new().await;

    app.seed_category("Woody").await;
    app.seed_category("Citrus").await;
    app.seed_category("Floral").await;

    let response = app.request(Method::GET, "/api/v1/categories", None).await;
    assert_eq!(response.status(), 200);

    let body = response_json(response).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Citrus", "Floral", "Woody"]);
}

#[tokio::test]
async fn duplicate_category_name_conflicts() {
    let app = TestApp::new().await;

    app.seed_category("Citrus").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/categories",
            Some(json!({ "name": "Citrus" })),
        )
        .await;
    assert_eq!(response.status(), 409);

    let body = response_json(response).await;
    assert_eq!(body["error"], "Conflict");
    assert!(body["message"].as_str().unwrap().contains("Citrus"));
}

#[tokio::test]
async fn blank_category_name_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/categories",
            Some(json!({ "name": "   " })),
        )
        .await;
    assert_eq!(response.status(), 400);

    let response = app
        .request(Method::POST, "/api/v1/categories", Some(json!({})))
        .await;
    assert_eq!(response.status(), 400);
}
