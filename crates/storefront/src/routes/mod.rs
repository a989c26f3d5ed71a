//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness
//! GET  /health/ready                        - Readiness (store reachable)
//!
//! # Catalog
//! GET  /api/products                        - Filtered product listing
//! GET  /api/products/{id}                   - Product detail
//! GET  /api/categories                      - Category list
//! GET  /api/brands                          - Brands of active products
//!
//! # Cart (current shopper)
//! GET    /api/cart                          - Cart summary
//! POST   /api/cart                          - Add product
//! DELETE /api/cart                          - Clear cart
//! PUT    /api/cart/{id}                     - Set quantity (0 removes)
//! DELETE /api/cart/{id}                     - Remove line
//! POST   /api/cart/transfer                 - Merge a guest cart (auth)
//!
//! # Auth
//! POST /api/auth/register                   - Create account and sign in
//! POST /api/auth/login                      - Sign in
//! POST /api/auth/logout                     - Sign out
//! GET  /api/auth/me                         - Current user (auth)
//!
//! # Profile (auth)
//! GET  /api/profile                         - Profile
//! PUT  /api/profile                         - Update name/phone
//! PUT  /api/profile/address                 - Update shipping address
//! GET  /api/user/orders                     - Order history
//!
//! # Orders
//! POST /api/checkout                        - Place order from cart
//! POST /api/orders                          - Alias of /api/checkout
//! GET  /api/orders/{id}                     - Order tracking
//! POST /api/orders/{id}/confirm-receipt     - Delivered -> received
//! POST /api/orders/{id}/refund-request      - Ask for a refund
//! POST /api/orders/{id}/rating              - Rate a received order
//!
//! # Recommendations
//! POST /api/browsing-history                - Record a product view
//! GET  /api/browsing-history                - Recently viewed products
//! GET  /api/recommendations                 - Recommended products
//! GET  /api/frequently-bought-together      - Companion products
//! ```

pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;
pub mod profile;
pub mod recommendations;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};

use crate::middleware::RateLimiterLayer;
use crate::state::AppState;

/// Create the auth routes router, optionally rate limited.
pub fn auth_routes(limiter: Option<RateLimiterLayer>) -> Router<AppState> {
    let credential_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));
    let credential_routes = match limiter {
        Some(layer) => credential_routes.layer(layer),
        None => credential_routes,
    };

    credential_routes
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the catalog routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add).delete(cart::clear))
        .route("/transfer", post(cart::transfer))
        .route("/{id}", put(cart::update).delete(cart::remove))
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::show).put(profile::update))
        .route("/address", put(profile::update_address))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::checkout))
        .route("/{id}", get(orders::show))
        .route("/{id}/confirm-receipt", post(orders::confirm_receipt))
        .route("/{id}/refund-request", post(orders::request_refund))
        .route("/{id}/rating", post(orders::rate))
}

/// Create all API routes for the storefront.
pub fn routes(auth_limiter: Option<RateLimiterLayer>) -> Router<AppState> {
    let api = Router::new()
        .nest("/products", product_routes())
        .route("/categories", get(products::categories))
        .route("/brands", get(products::brand_list))
        .nest("/cart", cart_routes())
        .nest("/auth", auth_routes(auth_limiter))
        .nest("/profile", profile_routes())
        .route("/user/orders", get(profile::orders))
        .route("/checkout", post(orders::checkout))
        .nest("/orders", order_routes())
        .route(
            "/browsing-history",
            get(recommendations::history).post(recommendations::record_view),
        )
        .route("/recommendations", get(recommendations::recommendations))
        .route(
            "/frequently-bought-together",
            get(recommendations::frequently_bought),
        );

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
