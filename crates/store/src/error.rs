//! Storage errors.

use techmart_core::ProductId;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email or SKU).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Not enough units left to place an order.
    #[error("insufficient stock for product {product_id}: {available} available, {requested} requested")]
    InsufficientStock {
        product_id: ProductId,
        available: i32,
        requested: i32,
    },
}

/// Result alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
