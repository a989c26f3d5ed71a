//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (binary only)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions, `SameSite=Strict`)
//! 4. Auth extractors in handlers ([`RequireAdmin`], [`OptionalAdmin`])

pub mod auth;
pub mod session;

pub use auth::{OptionalAdmin, RequireAdmin, clear_current_admin, set_current_admin};
pub use session::create_session_layer;
