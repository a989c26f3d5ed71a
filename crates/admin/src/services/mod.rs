//! Business logic services for admin.

pub mod analytics;
pub mod auth;

pub use analytics::AnalyticsCache;
pub use auth::{AdminAuthError, AdminAuthService};
