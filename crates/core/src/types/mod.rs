//! Core types for TechMart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod owner;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{format_money, round_money};
pub use owner::{CartOwner, GuestId, GuestIdError};
pub use status::*;
