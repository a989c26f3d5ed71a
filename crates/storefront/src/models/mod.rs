//! Storefront-local models.
//!
//! Domain types live in `techmart-core`; this module only holds what the
//! storefront keeps in the session.

pub mod session;

pub use session::{CurrentUser, keys as session_keys};
