//! TechMart Core - Shared domain library.
//!
//! This crate provides the domain model used across all TechMart components:
//! - `storefront` - Public JSON API consumed by the shop frontend
//! - `admin` - Store administration API and dashboard
//! - `cli` - Command-line tools for migrations, seeding and admin users
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Anything time-dependent takes `now` as an argument so the
//! logic stays deterministic under test.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, guest keys, money and statuses
//! - [`catalog`] - Products, product validation and catalog filtering
//! - [`cart`] - Cart lines, cart summaries and guest-to-user transfer planning
//! - [`order`] - Orders, checkout drafting and the customer order lifecycle
//! - [`analytics`] - Dashboard statistics and the analytics report
//! - [`recommend`] - Browsing history and product recommendations
//! - [`user`] - Accounts and profile updates

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod analytics;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod recommend;
pub mod types;
pub mod user;

pub use types::*;
