//! Integration tests for Minimart.
//!
//! # Running Tests
//!
//! ```bash
//! # HTTP flows against the in-memory store
//! cargo test -p minimart-integration-tests
//!
//! # Postgres adapter tests (need a migrated, disposable database)
//! MINIMART_TEST_DATABASE_URL=postgres://... \
//!     cargo test -p minimart-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `auth_flow` - Registration, login, logout, bearer handling
//! - `catalog_flow` - Admin product management and the cached listing
//! - `order_flow` - Placement, stock, payment and order privacy
//! - `comment_flow` - Product comments
//! - `health` - Liveness, readiness and request ids
//! - `postgres_store` - `PgStore` against a real database

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use minimart_core::UserLevel;
use minimart_server::cache::MokaCacheStore;
use minimart_server::db::MemoryStore;
use minimart_server::services::AuthService;
use minimart_server::state::AppState;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Password used for every account created by the helpers.
pub const PASSWORD: &str = "correct-horse";

/// A router wired to a fresh in-memory store.
pub struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
}

/// Status, headers and parsed body of one response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub text: String,
}

impl TestResponse {
    /// The `data` field of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The `error` field of an error envelope.
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    /// App with the default five second catalog TTL.
    pub fn new() -> Self {
        Self::with_catalog_ttl(Duration::from_secs(5))
    }

    /// App with a custom catalog TTL.
    pub fn with_catalog_ttl(ttl: Duration) -> Self {
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(MokaCacheStore::new(16));
        let state = AppState::new(store.clone(), cache, ttl);
        Self {
            router: minimart_server::app(state),
            store,
        }
    }

    /// Send a request, optionally with a bearer token and a JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    /// Send a prebuilt request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Register `username` (email derived from it) and return the token.
    pub async fn register(&self, username: &str) -> String {
        let response = self
            .post(
                "/register",
                None,
                json!({
                    "username": username,
                    "password": PASSWORD,
                    "email": format!("{username}@example.com"),
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);
        response.data().as_str().unwrap().to_owned()
    }

    /// Register `username` and promote it out of band, as `mm-cli` would.
    pub async fn register_admin(&self, username: &str) -> String {
        let token = self.register(username).await;
        AuthService::new(&*self.store)
            .set_level(username, UserLevel::Admin)
            .await
            .unwrap();
        token
    }

    /// Create a product as `admin_token` and return its id.
    pub async fn create_product(&self, admin_token: &str, price: &str, stock: i32) -> i64 {
        let response = self
            .post(
                "/admin/product",
                Some(admin_token),
                json!({ "name": "Widget", "category": "tools", "price": price, "stock": stock }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);
        response.data()["id"].as_i64().unwrap()
    }

    /// Current stock of a product, read through the admin endpoint.
    pub async fn stock(&self, admin_token: &str, product_id: i64) -> i64 {
        let response = self
            .get(&format!("/admin/product/{product_id}"), Some(admin_token))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);
        response.data()["stock"].as_i64().unwrap()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
