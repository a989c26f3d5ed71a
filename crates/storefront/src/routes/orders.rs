//! Checkout and order tracking route handlers.
//!
//! Order ids are unguessable, so tracking an order only needs its id. Orders
//! placed by a registered customer can only be acted on by that customer.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use techmart_core::OrderId;
use techmart_core::order::{CheckoutRequest, Order, OrderUpdate, draft_order};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{OptionalAuth, Shopper};
use crate::models::CurrentUser;
use crate::routes::cart::load_cart;
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RefundRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub rating: i16,
}

fn order_not_found() -> AppError {
    AppError::NotFound("Order".to_string())
}

fn parse_order_id(raw: &str) -> Result<OrderId> {
    raw.parse().map_err(|_| order_not_found())
}

async fn load_order(state: &AppState, id: &str) -> Result<Order> {
    let id = parse_order_id(id)?;
    state.store().get_order(id).await?.ok_or_else(order_not_found)
}

/// Load an order the caller may change: guest orders are open to whoever
/// holds the id, customer orders only to their owner.
async fn owned_order(state: &AppState, id: &str, user: Option<&CurrentUser>) -> Result<Order> {
    let order = load_order(state, id).await?;
    match order.user_id {
        Some(owner) if user.map(|u| u.id) != Some(owner) => Err(order_not_found()),
        _ => Ok(order),
    }
}

async fn save(state: &AppState, order: &Order, update: OrderUpdate) -> Result<Json<Order>> {
    let updated = state
        .store()
        .update_order(order.id, update)
        .await?
        .ok_or_else(order_not_found)?;
    Ok(Json(updated))
}

/// `POST /api/checkout` (also `POST /api/orders`)
///
/// Prices the cart server-side, re-checks stock and places the order. The
/// cart is emptied as part of placing it.
#[instrument(skip(state, shopper, body), fields(owner = %shopper.owner.storage_key()))]
pub async fn checkout(
    State(state): State<AppState>,
    shopper: Shopper,
    Json(body): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let user = match &shopper.user {
        Some(current) => state.store().get_user(current.id).await?,
        None => None,
    };
    let cart = load_cart(state.store(), &shopper.owner).await?;

    let draft = draft_order(body, user.as_ref(), &cart.items)?;
    let order = state.store().place_order(&shopper.owner, draft).await?;

    add_breadcrumb(
        "checkout",
        "Order placed",
        &[
            ("order_id", order.id.to_string()),
            ("total", order.total_amount.to_string()),
        ],
    );
    tracing::info!(order_id = %order.id, total = %order.total_amount, items = order.items.len(), "Order placed");
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /api/orders/{id}` - order tracking.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Order>> {
    Ok(Json(load_order(&state, &id).await?))
}

/// `POST /api/orders/{id}/confirm-receipt`
#[instrument(skip(state, user))]
pub async fn confirm_receipt(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    let order = owned_order(&state, &id, user.as_ref()).await?;
    let update = order.confirm_receipt()?;
    save(&state, &order, update).await
}

/// `POST /api/orders/{id}/refund-request`
#[instrument(skip(state, user, body))]
pub async fn request_refund(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<String>,
    Json(body): Json<RefundRequest>,
) -> Result<Json<Order>> {
    let order = owned_order(&state, &id, user.as_ref()).await?;
    let update = order.request_refund(&body.reason)?;
    tracing::info!(order_id = %order.id, "Refund requested");
    save(&state, &order, update).await
}

/// `POST /api/orders/{id}/rating`
#[instrument(skip(state, user, body))]
pub async fn rate(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<String>,
    Json(body): Json<RatingRequest>,
) -> Result<Json<Order>> {
    let order = owned_order(&state, &id, user.as_ref()).await?;
    let update = order.rate(body.rating)?;
    save(&state, &order, update).await
}
