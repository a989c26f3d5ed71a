//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness
//! GET  /health/ready                    - Readiness (store reachable)
//!
//! # Pages
//! GET  /                                - Dashboard overview
//! GET  /login                           - Login page
//!
//! # Auth (email + password, admin accounts only)
//! POST /api/auth/login                  - Sign in
//! POST /api/auth/logout                 - Sign out
//! GET  /api/auth/me                     - Current admin
//!
//! # Products (all, including inactive)
//! GET    /api/products                  - Product listing
//! POST   /api/products                  - Create product
//! GET    /api/products/{id}             - Product detail
//! PUT    /api/products/{id}             - Patch product
//! DELETE /api/products/{id}             - Delete product
//!
//! # Orders
//! GET    /api/orders                    - Order listing (?status=)
//! GET    /api/orders/{id}               - Order detail
//! PUT    /api/orders/{id}/status        - Set any status
//! POST   /api/orders/{id}/refund        - Refund (full or partial)
//! DELETE /api/orders/{id}               - Delete order
//!
//! # Reporting
//! GET  /api/admin/stats                 - Headline numbers
//! GET  /api/admin/analytics             - Analytics report (cached)
//! GET  /api/admin/users                 - All user accounts
//! ```

pub mod analytics;
pub mod auth;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the product management routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
}

/// Create the order management routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show).delete(orders::destroy))
        .route("/{id}/status", put(orders::update_status))
        .route("/{id}/refund", post(orders::refund))
}

/// Create the reporting routes router.
pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(analytics::stats))
        .route("/analytics", get(analytics::report))
        .route("/users", get(users::index))
}

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
        .nest("/admin", report_routes());

    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/login", get(auth::login_page))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api)
}

/// Liveness health check endpoint.
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
