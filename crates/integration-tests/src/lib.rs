//! Integration tests for TechMart.
//!
//! The storefront and admin routers are driven in-process with
//! `tower::ServiceExt::oneshot`, over one shared in-memory store and
//! in-memory session stores. No database or network is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p techmart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_cart` - guest carts, quantities, cart transfer
//! - `storefront_checkout` - checkout, order tracking, customer lifecycle
//! - `storefront_auth` - registration, login, profile
//! - `admin_api` - admin login, product and order management, reporting

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, HeaderValue, Method, Request, StatusCode, header},
};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use techmart_core::catalog::{Product, sample_products};
use techmart_core::user::NewUser;
use techmart_core::Email;
use techmart_store::{MemoryStore, SharedStore, Store};

pub use serde_json::json;

// ============================================================================
// Applications
// ============================================================================

/// A fresh, empty in-memory store.
#[must_use]
pub fn new_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// The storefront router over `store`, without rate limiting.
#[must_use]
pub fn storefront(store: SharedStore) -> Router {
    use techmart_storefront::{config::StorefrontConfig, middleware, state::AppState};

    let config = StorefrontConfig::local();
    let sessions =
        middleware::create_session_layer(tower_sessions::MemoryStore::default(), &config);
    techmart_storefront::app(AppState::new(config, store), sessions, None)
}

/// The admin router over `store`.
#[must_use]
pub fn admin(store: SharedStore) -> Router {
    use techmart_admin::{config::AdminConfig, middleware, state::AppState};

    let config = AdminConfig::local();
    let sessions =
        middleware::create_session_layer(tower_sessions::MemoryStore::default(), &config);
    techmart_admin::app(AppState::new(config, store), sessions)
}

// ============================================================================
// Fixtures
// ============================================================================

/// Insert the sample catalog and return it.
pub async fn seed_catalog(store: &dyn Store) -> Vec<Product> {
    let mut products = Vec::new();
    for sample in sample_products() {
        products.push(store.create_product(sample).await.unwrap());
    }
    products
}

/// The seeded product with this SKU.
#[must_use]
pub fn by_sku<'a>(products: &'a [Product], sku: &str) -> &'a Product {
    products
        .iter()
        .find(|p| p.sku == sku)
        .unwrap_or_else(|| panic!("no sample product with sku {sku}"))
}

/// Create an admin account directly in the store.
pub async fn create_admin_user(store: &dyn Store, email: &str, password: &str) {
    store
        .create_user(NewUser {
            email: Email::parse(email).unwrap(),
            name: "Store Admin".to_string(),
            password_hash: techmart_admin::services::auth::hash_password(password).unwrap(),
            is_admin: true,
        })
        .await
        .unwrap();
}

/// A checkout body with complete customer details.
#[must_use]
pub fn checkout_body(email: &str) -> Value {
    json!({
        "customerName": "Ada Lovelace",
        "customerEmail": email,
        "customerPhone": "555-0100",
        "shippingAddress": {
            "address": "12 Analytical Way",
            "city": "London",
            "state": "LDN",
            "zipCode": "N1 9GU"
        },
        "paymentMethod": "cod"
    })
}

/// Read a decimal that may be serialized as a string or a number.
#[must_use]
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).unwrap(),
        other => panic!("not a decimal: {other}"),
    }
}

// ============================================================================
// Test Client
// ============================================================================

/// A response with its body decoded.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// JSON body, `Null` when empty or not JSON.
    pub json: Value,
    pub text: String,
}

/// A browser-like client: remembers the session cookie between requests.
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
    default_headers: HeaderMap,
}

impl TestClient {
    #[must_use]
    pub fn new(app: Router) -> Self {
        Self {
            app,
            cookie: None,
            default_headers: HeaderMap::new(),
        }
    }

    /// Send `name: value` with every request.
    #[must_use]
    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.default_headers
            .insert(name, HeaderValue::from_str(value).unwrap());
        self
    }

    /// Forget the session cookie.
    pub fn clear_cookies(&mut self) {
        self.cookie = None;
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    /// POST without a body.
    pub async fn post_empty(&mut self, uri: &str) -> TestResponse {
        self.send(Method::POST, uri, None).await
    }

    pub async fn put(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in &self.default_headers {
            builder = builder.header(name, value);
        }
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        self.remember_cookie(response.headers());

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            json,
            text,
        }
    }

    /// Keep the `name=value` part of the session cookie. An emptied or
    /// expired cookie ends the session.
    fn remember_cookie(&mut self, headers: &HeaderMap) {
        let Some(set_cookie) = headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        else {
            return;
        };
        let pair = set_cookie.split(';').next().unwrap_or_default().trim();
        let expired = pair.ends_with('=') || set_cookie.to_ascii_lowercase().contains("max-age=0");
        self.cookie = (!expired).then(|| pair.to_string());
    }
}
