use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    Router,
};
use nova_api::{config::AppConfig, db, handlers::AppServices, AppState};
use serde_json::Value;
use tower::ServiceExt;

/// Helper harness spinning up the application against a throwaway SQLite
/// database, with the router exercised in-process.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _db_dir: tempfile::TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        Self::build(None).await
    }

    /// Construct a test application with object storage pointed at the given
    /// base URL (a wiremock server in tests).
    pub async fn with_storage(storage_url: &str) -> Self {
        Self::build(Some(storage_url.to_string())).await
    }

    async fn build(storage_url: Option<String>) -> Self {
        let db_dir = tempfile::tempdir().expect("create temp dir for test database");
        let db_path = db_dir.path().join("nova_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1",
            18_080,
            "test",
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        if let Some(url) = storage_url {
            cfg.storage_url = Some(url);
            cfg.storage_service_key = Some("test-service-key".to_string());
        }

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let services = AppServices::new(db_arc.clone(), &cfg);

        let state = AppState {
            db: db_arc,
            config: cfg,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", nova_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            _db_dir: db_dir,
        }
    }

    /// Send a JSON request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Send a raw request (used for multipart uploads).
    pub async fn request_raw(
        &self,
        method: Method,
        uri: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> axum::response::Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", content_type)
            .body(Body::from(body))
            .expect("failed to build request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Create a product through the API and return its response data.
    pub async fn seed_product(&self, payload: Value) -> Value {
        let response = self
            .request(Method::POST, "/api/v1/products", Some(payload))
            .await;
        assert_eq!(response.status(), 201, "seeding product failed");
        response_json(response).await["data"].clone()
    }

    /// Create a category through the API and return its response data.
    pub async fn seed_category(&self, name: &str) -> Value {
        let response = self
            .request(
                Method::POST,
                "/api/v1/categories",
                Some(serde_json::json!({ "name": name })),
            )
            .await;
        assert_eq!(response.status(), 201, "seeding category failed");
        response_json(response).await["data"].clone()
    }
}

/// Collect a response body into JSON.
pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Parse a decimal field that may serialize as a JSON string or number.
pub fn decimal_field(value: &Value) -> rust_decimal::Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string"),
        Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("expected decimal, got {other:?}"),
    }
}
