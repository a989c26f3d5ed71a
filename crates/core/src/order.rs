//! Orders: checkout drafting and the order lifecycle.
//!
//! Checkout is server-authoritative. [`draft_order`] prices the cart from the
//! catalog, never from client-supplied totals, and snapshots each product's
//! name, category and price into the order so later catalog edits do not
//! rewrite history.
//!
//! Customer actions ([`Order::confirm_receipt`], [`Order::request_refund`],
//! [`Order::rate`]) are validated against the current status. Admin status
//! changes ([`OrderUpdate::status_change`]) are not: any status may be set
//! from any other.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::{CartLineView, MAX_LINE_QUANTITY};
use crate::catalog::ValidationError;
use crate::types::{Email, OrderId, OrderStatus, PaymentMethod, ProductId, UserId};
use crate::user::User;

/// Lowest and highest order rating.
pub const RATING_RANGE: core::ops::RangeInclusive<i16> = 1..=5;

fn default_country() -> String {
    "United States".to_owned()
}

/// Where an order ships to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default = "default_country")]
    pub country: String,
}

impl ShippingAddress {
    /// Trim every field and require each to be non-empty.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming each blank field.
    pub fn validate(self) -> Result<Self, ValidationError> {
        let address = Self {
            address: self.address.trim().to_owned(),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_owned(),
            zip_code: self.zip_code.trim().to_owned(),
            country: self.country.trim().to_owned(),
        };
        let mut errors = ValidationError::default();
        for (field, value) in [
            ("address", &address.address),
            ("city", &address.city),
            ("state", &address.state),
            ("zipCode", &address.zip_code),
            ("country", &address.country),
        ] {
            if value.is_empty() {
                errors.push(field, "must not be empty");
            }
        }
        errors.into_result()?;
        Ok(address)
    }
}

/// A purchased product, priced when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub category: String,
    pub price: Decimal,
    pub quantity: i32,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub customer_name: String,
    pub customer_email: Email,
    pub customer_phone: Option<String>,
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub refund_reason: Option<String>,
    pub refund_amount: Option<Decimal>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub rating: Option<i16>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Nothing to check out.
    #[error("cart is empty")]
    EmptyCart,

    /// A carted product was deleted or deactivated.
    #[error("product {0} is no longer available")]
    ProductUnavailable(ProductId),

    /// A line asks for more units than are in stock.
    #[error("only {available} of {name} left in stock")]
    InsufficientStock {
        product_id: ProductId,
        name: String,
        available: i32,
        requested: i32,
    },

    /// A line's quantity is not a sellable amount.
    #[error("invalid quantity for product {0}")]
    InvalidQuantity(ProductId),

    /// Customer details are missing or malformed.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The action is not allowed in the order's current status.
    #[error("cannot {action} an order that is {current}")]
    InvalidTransition {
        current: OrderStatus,
        action: &'static str,
    },

    /// A refund request needs a reason.
    #[error("refund reason is required")]
    MissingRefundReason,

    /// Ratings are whole stars from 1 to 5.
    #[error("rating must be between 1 and 5")]
    InvalidRating,

    /// Refund amounts are positive and at most the order total.
    #[error("refund amount must be greater than 0 and at most the order total")]
    InvalidRefundAmount,
}

// =============================================================================
// Checkout
// =============================================================================

/// Customer details submitted at checkout.
///
/// Missing name, email or address fall back to the signed-in user's profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutRequest {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub shipping_address: Option<ShippingAddress>,
    pub payment_method: Option<PaymentMethod>,
}

/// A validated, priced order ready to be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub user_id: Option<UserId>,
    pub customer_name: String,
    pub customer_email: Email,
    pub customer_phone: Option<String>,
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
}

impl OrderDraft {
    /// Build the stored order. New orders start out `processing`.
    #[must_use]
    pub fn into_order(self, id: OrderId, now: DateTime<Utc>) -> Order {
        Order {
            id,
            user_id: self.user_id,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            customer_phone: self.customer_phone,
            shipping_address: self.shipping_address,
            items: self.items,
            total_amount: self.total_amount,
            payment_method: self.payment_method,
            status: OrderStatus::Processing,
            refund_reason: None,
            refund_amount: None,
            refunded_at: None,
            rating: None,
            delivered_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Turn a cart into an order draft.
///
/// # Errors
///
/// - [`OrderError::EmptyCart`] when there are no lines
/// - [`OrderError::ProductUnavailable`] when a product is gone or inactive
/// - [`OrderError::InvalidQuantity`] when a line is outside 1..=[`MAX_LINE_QUANTITY`]
/// - [`OrderError::InsufficientStock`] when a line exceeds stock
/// - [`OrderError::Invalid`] when customer details are missing or malformed
pub fn draft_order(
    request: CheckoutRequest,
    user: Option<&User>,
    lines: &[CartLineView],
) -> Result<OrderDraft, OrderError> {
    if lines.is_empty() {
        return Err(OrderError::EmptyCart);
    }

    let mut items = Vec::with_capacity(lines.len());
    for view in lines {
        let product = view
            .product
            .as_ref()
            .filter(|p| p.is_active)
            .ok_or(OrderError::ProductUnavailable(view.line.product_id))?;
        if !(1..=MAX_LINE_QUANTITY).contains(&view.line.quantity) {
            return Err(OrderError::InvalidQuantity(product.id));
        }
        if view.line.quantity > product.stock {
            return Err(OrderError::InsufficientStock {
                product_id: product.id,
                name: product.name.clone(),
                available: product.stock,
                requested: view.line.quantity,
            });
        }
        items.push(OrderItem {
            product_id: product.id,
            product_name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            quantity: view.line.quantity,
        });
    }
    let total_amount = items.iter().map(OrderItem::line_total).sum();

    let mut errors = ValidationError::default();

    let customer_name = request
        .customer_name
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty())
        .or_else(|| user.map(|u| u.name.clone()).filter(|n| !n.is_empty()));
    if customer_name.is_none() {
        errors.push("customerName", "is required");
    }

    let customer_email = match request.customer_email.as_deref() {
        Some(raw) => Email::parse(raw)
            .map_err(|e| errors.push("customerEmail", e.to_string()))
            .ok(),
        None => user.map(|u| u.email.clone()),
    };
    if customer_email.is_none() && !errors.has("customerEmail") {
        errors.push("customerEmail", "is required");
    }

    let shipping_address = match request
        .shipping_address
        .or_else(|| user.and_then(|u| u.shipping_address.clone()))
    {
        Some(address) => match address.validate() {
            Ok(address) => Some(address),
            Err(invalid) => {
                errors.errors.extend(invalid.errors);
                None
            }
        },
        None => {
            errors.push("shippingAddress", "is required");
            None
        }
    };

    let customer_phone = request
        .customer_phone
        .map(|p| p.trim().to_owned())
        .filter(|p| !p.is_empty())
        .or_else(|| user.and_then(|u| u.phone.clone()));

    match (customer_name, customer_email, shipping_address) {
        (Some(customer_name), Some(customer_email), Some(shipping_address))
            if errors.errors.is_empty() =>
        {
            Ok(OrderDraft {
                user_id: user.map(|u| u.id),
                customer_name,
                customer_email,
                customer_phone,
                shipping_address,
                items,
                total_amount,
                payment_method: request.payment_method.unwrap_or_default(),
            })
        }
        _ => Err(OrderError::Invalid(errors)),
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Partial order update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub refund_amount: Option<Decimal>,
    pub refund_reason: Option<String>,
    pub rating: Option<i16>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
}

impl OrderUpdate {
    /// Admin status change. No transition rules apply.
    ///
    /// Moving to `delivered` stamps `delivered_at` if it was never set.
    #[must_use]
    pub fn status_change(order: &Order, status: OrderStatus, now: DateTime<Utc>) -> Self {
        Self {
            status: Some(status),
            delivered_at: (status == OrderStatus::Delivered && order.delivered_at.is_none())
                .then_some(now),
            ..Self::default()
        }
    }

    /// Apply the update, bumping `updated_at`.
    pub fn apply(self, order: &mut Order, now: DateTime<Utc>) {
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(amount) = self.refund_amount {
            order.refund_amount = Some(amount);
        }
        if let Some(reason) = self.refund_reason {
            order.refund_reason = Some(reason);
        }
        if let Some(rating) = self.rating {
            order.rating = Some(rating);
        }
        if let Some(at) = self.delivered_at {
            order.delivered_at = Some(at);
        }
        if let Some(at) = self.refunded_at {
            order.refunded_at = Some(at);
        }
        order.updated_at = now;
    }
}

impl Order {
    fn require(
        &self,
        allowed: &[OrderStatus],
        action: &'static str,
    ) -> Result<(), OrderError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(OrderError::InvalidTransition {
                current: self.status,
                action,
            })
        }
    }

    /// Customer confirms the parcel arrived: `delivered` → `received`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] unless the order is delivered.
    pub fn confirm_receipt(&self) -> Result<OrderUpdate, OrderError> {
        self.require(&[OrderStatus::Delivered], "confirm receipt of")?;
        Ok(OrderUpdate {
            status: Some(OrderStatus::Received),
            ..OrderUpdate::default()
        })
    }

    /// Customer asks for a refund after delivery.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::MissingRefundReason`] for a blank reason and
    /// [`OrderError::InvalidTransition`] unless delivered or received.
    pub fn request_refund(&self, reason: &str) -> Result<OrderUpdate, OrderError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(OrderError::MissingRefundReason);
        }
        self.require(
            &[OrderStatus::Delivered, OrderStatus::Received],
            "request a refund for",
        )?;
        Ok(OrderUpdate {
            status: Some(OrderStatus::RefundRequested),
            refund_reason: Some(reason.to_owned()),
            ..OrderUpdate::default()
        })
    }

    /// Customer rates a received order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidRating`] outside 1..=5 and
    /// [`OrderError::InvalidTransition`] unless received or completed.
    pub fn rate(&self, rating: i16) -> Result<OrderUpdate, OrderError> {
        if !RATING_RANGE.contains(&rating) {
            return Err(OrderError::InvalidRating);
        }
        self.require(&[OrderStatus::Received, OrderStatus::Completed], "rate")?;
        Ok(OrderUpdate {
            rating: Some(rating),
            ..OrderUpdate::default()
        })
    }

    /// Admin refund. Defaults to the full order total.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidRefundAmount`] when the amount is not
    /// positive or exceeds the total.
    pub fn refund(
        &self,
        amount: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Result<OrderUpdate, OrderError> {
        let amount = amount.unwrap_or(self.total_amount);
        if amount <= Decimal::ZERO || amount > self.total_amount {
            return Err(OrderError::InvalidRefundAmount);
        }
        Ok(OrderUpdate {
            status: Some(OrderStatus::Refunded),
            refund_amount: Some(amount),
            refunded_at: Some(now),
            ..OrderUpdate::default()
        })
    }
}

/// Order listing filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderQuery {
    pub user_id: Option<UserId>,
    pub status: Option<OrderStatus>,
}

impl OrderQuery {
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        self.user_id.is_none_or(|id| order.user_id == Some(id))
            && self.status.is_none_or(|s| order.status == s)
    }
}
