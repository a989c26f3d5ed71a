//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Customer registration and password login
//! - `fulfillment` - Background worker that marks old orders delivered
//! - `history` - Per-viewer browsing history cache

pub mod auth;
pub mod fulfillment;
pub mod history;

pub use auth::{AuthError, AuthService};
pub use fulfillment::spawn_fulfillment_worker;
pub use history::HistoryCache;
