//! Shopping carts.
//!
//! A cart is the set of [`CartLine`]s sharing one [`CartOwner`]. There is at
//! most one line per product per owner; adding a product that is already in
//! the cart increases that line's quantity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{CartItemId, CartOwner, ProductId};

/// A single product line in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: CartItemId,
    #[serde(skip)]
    pub owner: Option<CartOwner>,
    pub product_id: ProductId,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// A cart line joined with its product.
///
/// `product` is `None` when the product was deleted after being carted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    #[serde(flatten)]
    pub line: CartLine,
    pub product: Option<Product>,
}

impl CartLineView {
    /// `price × quantity`, or zero when the product is gone.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product
            .as_ref()
            .map_or(Decimal::ZERO, |p| p.price * Decimal::from(self.line.quantity))
    }
}

/// The cart as returned to the shopper.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub items: Vec<CartLineView>,
    pub total_items: i64,
    pub subtotal: Decimal,
}

impl CartSummary {
    /// Join lines with their products and compute totals.
    #[must_use]
    pub fn build(lines: Vec<CartLine>, products: &[Product]) -> Self {
        let items: Vec<CartLineView> = lines
            .into_iter()
            .map(|line| {
                let product = products.iter().find(|p| p.id == line.product_id).cloned();
                CartLineView { line, product }
            })
            .collect();
        let total_items = items.iter().map(|i| i64::from(i.line.quantity)).sum();
        let subtotal = items.iter().map(CartLineView::line_total).sum();
        Self {
            items,
            total_items,
            subtotal,
        }
    }
}

/// Most units of one product a single cart line may hold.
pub const MAX_LINE_QUANTITY: i32 = 99;

/// Quantity validation errors.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// Adding requires at least one unit.
    #[error("quantity must be at least 1")]
    TooSmall,
    /// Quantities are never negative.
    #[error("quantity must not be negative")]
    Negative,
    /// A line holds at most [`MAX_LINE_QUANTITY`] units.
    #[error("quantity must not exceed {}", MAX_LINE_QUANTITY)]
    TooLarge,
}

/// Validate a quantity being added to a cart (default 1).
///
/// # Errors
///
/// Returns [`QuantityError::TooSmall`] when the quantity is below 1 and
/// [`QuantityError::TooLarge`] above [`MAX_LINE_QUANTITY`].
pub const fn quantity_to_add(quantity: Option<i32>) -> Result<i32, QuantityError> {
    match quantity {
        None => Ok(1),
        Some(q) if q > MAX_LINE_QUANTITY => Err(QuantityError::TooLarge),
        Some(q) if q >= 1 => Ok(q),
        Some(_) => Err(QuantityError::TooSmall),
    }
}

/// Validate a quantity a line is being set to. Zero means "remove".
///
/// # Errors
///
/// Returns [`QuantityError::Negative`] for negative quantities and
/// [`QuantityError::TooLarge`] above [`MAX_LINE_QUANTITY`].
pub const fn quantity_to_set(quantity: i32) -> Result<i32, QuantityError> {
    if quantity < 0 {
        Err(QuantityError::Negative)
    } else if quantity > MAX_LINE_QUANTITY {
        Err(QuantityError::TooLarge)
    } else {
        Ok(quantity)
    }
}

/// Quantity of a line after adding `more` units to its `current` ones.
///
/// # Errors
///
/// Returns [`QuantityError::TooLarge`] when the sum would exceed
/// [`MAX_LINE_QUANTITY`], and [`QuantityError::TooSmall`] when `more` is
/// below 1.
pub const fn merged_quantity(current: i32, more: i32) -> Result<i32, QuantityError> {
    if more < 1 {
        return Err(QuantityError::TooSmall);
    }
    match current.checked_add(more) {
        Some(total) if total <= MAX_LINE_QUANTITY => Ok(total),
        _ => Err(QuantityError::TooLarge),
    }
}

// =============================================================================
// Guest-to-User Transfer
// =============================================================================

/// One step of merging a cart into another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStep {
    /// The destination already has this product: set its line to the
    /// combined quantity.
    Increase { line_id: CartItemId, quantity: i32 },
    /// The destination lacks this product: create a line.
    Insert { product_id: ProductId, quantity: i32 },
}

/// Plan merging the `from` cart into the `to` cart.
///
/// Every `from` line produces exactly one step, so the number of transferred
/// lines is `from.len()`. Merged quantities are capped at
/// [`MAX_LINE_QUANTITY`] so signing in never fails on a full cart.
#[must_use]
pub fn plan_transfer(from: &[CartLine], to: &[CartLine]) -> Vec<TransferStep> {
    from.iter()
        .map(|line| {
            to.iter().find(|t| t.product_id == line.product_id).map_or(
                TransferStep::Insert {
                    product_id: line.product_id,
                    quantity: line.quantity.clamp(1, MAX_LINE_QUANTITY),
                },
                |existing| TransferStep::Increase {
                    line_id: existing.id,
                    quantity: existing
                        .quantity
                        .saturating_add(line.quantity)
                        .clamp(1, MAX_LINE_QUANTITY),
                },
            )
        })
        .collect()
}
