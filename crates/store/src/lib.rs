//! TechMart storage layer.
//!
//! The [`Store`] trait is the only way the services touch persistent state.
//! Two backends implement it:
//!
//! - [`MemoryStore`] - unindexed lists behind a lock; used by tests and local
//!   demos
//! - [`PgStore`] - `PostgreSQL` via `sqlx` (feature `postgres`)
//!
//! # Tables
//!
//! - `products` - Catalog
//! - `users` - Customers and admins (argon2 password hashes)
//! - `cart_items` - Cart lines keyed by [`CartOwner::storage_key`]
//! - `orders` - Placed orders with item snapshots (JSONB)
//!
//! Sessions live in the `tower_sessions` schema managed by
//! `tower-sessions-sqlx-store`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/store/migrations/` and run via:
//! ```bash
//! cargo run -p techmart-cli -- migrate
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use techmart_core::cart::CartLine;
use techmart_core::catalog::{NewProduct, Product, ProductFilter, ProductPatch};
use techmart_core::order::{Order, OrderDraft, OrderQuery, OrderUpdate, ShippingAddress};
use techmart_core::user::{NewUser, ProfileUpdate, User};
use techmart_core::{CartItemId, CartOwner, Email, OrderId, ProductId, UserId};

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::{MIGRATOR, PgStore, create_pool};

/// A user together with their stored password hash.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Outcome of setting a cart line's quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartUpdate {
    /// The line now has the new quantity.
    Updated(CartLine),
    /// A quantity of zero removed the line.
    Removed,
    /// The owner has no such line.
    NotFound,
}

/// Shared handle to a store backend.
pub type SharedStore = Arc<dyn Store>;

/// Persistent state for the storefront and the admin panel.
#[async_trait]
pub trait Store: Send + Sync {
    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// Active products matching `filter`, oldest first.
    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>>;

    /// Every product, including inactive ones, oldest first.
    async fn all_products(&self) -> StoreResult<Vec<Product>>;

    async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>>;

    /// Insert a validated product. Duplicate SKUs are a [`StoreError::Conflict`].
    async fn create_product(&self, input: NewProduct) -> StoreResult<Product>;

    /// Apply a validated patch. `None` when the product does not exist.
    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> StoreResult<Option<Product>>;

    /// Delete a product and any cart lines holding it.
    async fn delete_product(&self, id: ProductId) -> StoreResult<bool>;

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    /// Duplicate emails are a [`StoreError::Conflict`].
    async fn create_user(&self, input: NewUser) -> StoreResult<User>;

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &Email) -> StoreResult<Option<UserCredentials>>;

    /// Every user, newest first.
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn count_users(&self) -> StoreResult<i64>;

    async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
    ) -> StoreResult<Option<User>>;

    async fn update_shipping_address(
        &self,
        id: UserId,
        address: ShippingAddress,
    ) -> StoreResult<Option<User>>;

    /// Grant or revoke admin rights. `false` when no user has this email.
    async fn set_admin(&self, email: &Email, is_admin: bool) -> StoreResult<bool>;

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    /// The owner's cart lines, oldest first.
    async fn cart_lines(&self, owner: &CartOwner) -> StoreResult<Vec<CartLine>>;

    /// Add units of a product, merging into an existing line for it.
    ///
    /// Returns [`StoreError::NotFound`] when the product does not exist.
    async fn add_to_cart(
        &self,
        owner: &CartOwner,
        product_id: ProductId,
        quantity: i32,
    ) -> StoreResult<CartLine>;

    /// Set a line's quantity; zero removes it.
    async fn set_cart_quantity(
        &self,
        owner: &CartOwner,
        line_id: CartItemId,
        quantity: i32,
    ) -> StoreResult<CartUpdate>;

    async fn remove_cart_line(&self, owner: &CartOwner, line_id: CartItemId)
    -> StoreResult<bool>;

    /// Remove every line. Returns how many were removed.
    async fn clear_cart(&self, owner: &CartOwner) -> StoreResult<u64>;

    /// Merge `from`'s lines into `to`'s cart and empty `from`.
    ///
    /// Returns the number of lines moved. Transferring a cart to itself does
    /// nothing and returns 0.
    async fn transfer_cart(&self, from: &CartOwner, to: &CartOwner) -> StoreResult<usize>;

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------

    /// Place an order atomically: re-check and decrement stock, insert the
    /// order and clear the owner's cart.
    ///
    /// Returns [`StoreError::InsufficientStock`] and changes nothing when any
    /// item can no longer be covered.
    async fn place_order(&self, owner: &CartOwner, draft: OrderDraft) -> StoreResult<Order>;

    async fn get_order(&self, id: OrderId) -> StoreResult<Option<Order>>;

    /// Orders matching `query`, newest first.
    async fn list_orders(&self, query: OrderQuery) -> StoreResult<Vec<Order>>;

    async fn update_order(&self, id: OrderId, update: OrderUpdate) -> StoreResult<Option<Order>>;

    async fn delete_order(&self, id: OrderId) -> StoreResult<bool>;

    /// Move `processing` orders placed before `placed_before` to `delivered`.
    async fn mark_delivered(&self, placed_before: DateTime<Utc>) -> StoreResult<Vec<OrderId>>;

    // -------------------------------------------------------------------------
    // Health
    // -------------------------------------------------------------------------

    async fn ping(&self) -> StoreResult<()>;
}
