mod common;

use axum::http::Method;
use wiremock::matchers::{bearer_token, method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{response_json, TestApp};

fn multipart_body(boundary: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

#[tokio::test]
async fn uploading_an_image_stores_it_and_returns_the_public_url() {
    let storage = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/product-images/.+\.png$"))
        .and(bearer_token("test-service-key"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&storage)
        .await;

    let app = TestApp::with_storage(&storage.uri()).await;

    let boundary = "nova-test-boundary";
    let body = multipart_body(boundary, "scent.png", "image/png", &[0x89, b'P', b'N', b'G']);
    let response = app
        .request_raw(
            Method::POST,
            "/api/v1/upload",
            &format!("multipart/form-data; boundary={boundary}"),
            body,
        )
        .await;
    assert_eq!(response.status(), 201);

    let payload = response_json(response).await;
    let file_name = payload["data"]["file_name"].as_str().unwrap();
    assert!(file_name.ends_with(".png"));
    let url = payload["data"]["url"].as_str().unwrap();
    assert!(url.starts_with(&storage.uri()));
    assert!(url.contains("/storage/v1/object/public/product-images/"));
}

#[tokio::test]
async fn uploads_reject_disallowed_content_types() {
    let storage = MockServer::start().await;
    let app = TestApp::with_storage(&storage.uri()).await;

    let boundary = "nova-test-boundary";
    let body = multipart_body(boundary, "notes.txt", "text/plain", b"hello");
    let response = app
        .request_raw(
            Method::POST,
            "/api/v1/upload",
            &format!("multipart/form-data; boundary={boundary}"),
            body,
        )
        .await;
    assert_eq!(response.status(), 400);

    let payload = response_json(response).await;
    assert!(payload["message"].as_str().unwrap().contains("file type"));
    // The storage backend was never called
    assert!(storage.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn uploads_reject_oversized_files() {
    let storage = MockServer::start().await;
    let app = TestApp::with_storage(&storage.uri()).await;

    let boundary = "nova-test-boundary";
    let oversized = vec![0u8; 5 * 1024 * 1024 + 1];
    let body = multipart_body(boundary, "big.png", "image/png", &oversized);
    let response = app
        .request_raw(
            Method::POST,
            "/api/v1/upload",
            &format!("multipart/form-data; boundary={boundary}"),
            body,
        )
        .await;
    assert_eq!(response.status(), 400);

    let payload = response_json(response).await;
    assert!(payload["message"].as_str().unwrap().contains("too large"));
}

#[tokio::test]
async fn uploads_fail_closed_when_storage_is_not_configured() {
    let app = TestApp::new().await;

    let boundary = "nova-test-boundary";
    let body = multipart_body(boundary, "scent.png", "image/png", &[1, 2, 3]);
    let response = app
        .request_raw(
            Method::POST,
            "/api/v1/upload",
            &format!("multipart/form-data; boundary={boundary}"),
            body,
        )
        .await;
    assert_eq!(response.status(), 500);
}

#[tokio::test]
async fn deleting_an_image_removes_it_from_storage() {
    let storage = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/storage/v1/object/product-images/123-abc\.png$"))
        .and(bearer_token("test-service-key"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&storage)
        .await;

    let app = TestApp::with_storage(&storage.uri()).await;

    let response = app
        .request(
            Method::DELETE,
            "/api/v1/upload?file_name=123-abc.png",
            None,
        )
        .await;
    assert_eq!(response.status(), 200);

    let payload = response_json(response).await;
    assert_eq!(payload["data"]["file_name"], "123-abc.png");
}

#[tokio::test]
async fn deleting_requires_a_file_name() {
    let storage = MockServer::start().await;
    let app = TestApp::with_storage(&storage.uri()).await;

    let response = app
        .request(Method::DELETE, "/api/v1/upload?file_name=", None)
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn storage_backend_failures_surface_as_internal_errors() {
    let storage = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/product-images/.+$"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&storage)
        .await;

    let app = TestApp::with_storage(&storage.uri()).await;

    let boundary = "nova-test-boundary";
    let body = multipart_body(boundary, "scent.png", "image/png", &[1, 2, 3]);
    let response = app
        .request_raw(
            Method::POST,
            "/api/v1/upload",
            &format!("multipart/form-data; boundary={boundary}"),
            body,
        )
        .await;
    assert_eq!(response.status(), 500);

    let payload = response_json(response).await;
    // Generic message, no backend details leaked
    assert_eq!(payload["message"], "Internal server error");
}
