//! Order management routes.
//!
//! Admins may move an order to any status; the customer-facing lifecycle
//! rules do not apply here.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use techmart_core::order::{Order, OrderQuery, OrderUpdate};
use techmart_core::{OrderId, OrderStatus};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RefundRequest {
    /// Defaults to the order total.
    pub amount: Option<Decimal>,
}

fn parse_id(raw: &str) -> Result<OrderId> {
    raw.parse().map_err(|_| AppError::NotFound("Order".to_string()))
}

async fn load(state: &AppState, id: OrderId) -> Result<Order> {
    state
        .store()
        .get_order(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))
}

async fn save(state: &AppState, id: OrderId, update: OrderUpdate) -> Result<Order> {
    let order = state
        .store()
        .update_order(id, update)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;
    state.analytics().invalidate().await;
    Ok(order)
}

/// `GET /api/orders?status=` - newest first.
#[instrument(skip(_admin, state))]
pub async fn index(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<Order>>> {
    let orders = state
        .store()
        .list_orders(OrderQuery {
            user_id: None,
            status: query.status,
        })
        .await?;
    Ok(Json(orders))
}

/// `GET /api/orders/{id}`
#[instrument(skip(_admin, state))]
pub async fn show(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    let id = parse_id(&id)?;
    Ok(Json(load(&state, id).await?))
}

/// `PUT /api/orders/{id}/status`
#[instrument(skip(admin, state, body))]
pub async fn update_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<StatusRequest>, JsonRejection>,
) -> Result<Json<Order>> {
    let id = parse_id(&id)?;
    let Json(StatusRequest { status }) = body?;

    let order = load(&state, id).await?;
    let previous = order.status;
    let order = save(&state, id, OrderUpdate::status_change(&order, status, Utc::now())).await?;

    tracing::info!(
        admin_id = %admin.id,
        order_id = %id,
        from = previous.as_str(),
        to = status.as_str(),
        terminal = status.is_terminal(),
        "Order status changed"
    );
    Ok(Json(order))
}

/// `POST /api/orders/{id}/refund` - refund the whole order or `amount` of it.
///
/// The body is optional; an empty body refunds the full total.
#[instrument(skip(admin, state, body))]
pub async fn refund(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Order>> {
    let id = parse_id(&id)?;
    let RefundRequest { amount } = if body.is_empty() {
        RefundRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid refund request: {e}")))?
    };

    let order = load(&state, id).await?;
    let update = order.refund(amount, Utc::now())?;
    let order = save(&state, id, update).await?;

    tracing::info!(
        admin_id = %admin.id,
        order_id = %id,
        amount = ?order.refund_amount,
        "Order refunded"
    );
    Ok(Json(order))
}

/// `DELETE /api/orders/{id}`
#[instrument(skip(admin, state))]
pub async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id)?;
    if !state.store().delete_order(id).await? {
        return Err(AppError::NotFound("Order".to_string()));
    }
    state.analytics().invalidate().await;

    tracing::warn!(admin_id = %admin.id, order_id = %id, "Order deleted");
    Ok(StatusCode::NO_CONTENT)
}
