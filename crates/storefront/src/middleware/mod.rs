//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (SPA origins)
//! 5. Session layer (tower-sessions)
//! 6. Rate limiting on auth endpoints (governor, binary only)
//!
//! Extractors: [`RequireAuth`], [`OptionalAuth`] and [`Shopper`] (cart owner).

pub mod auth;
pub mod cart_owner;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
pub use cart_owner::Shopper;
pub use rate_limit::{RateLimiterLayer, auth_rate_limiter};
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
