//! Cart route handlers.
//!
//! Carts belong to the [`Shopper`]'s [`CartOwner`]: the logged-in user, or a
//! guest identified by `x-session-id` or a session-generated id.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use techmart_core::cart::{CartLine, CartSummary, quantity_to_add, quantity_to_set};
use techmart_core::{CartItemId, CartOwner, GuestId, ProductId};
use techmart_store::{CartUpdate, Store};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{RequireAuth, Shopper};
use crate::routes::products::active_product;
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: Option<ProductId>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub from_session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub success: bool,
    pub transferred: usize,
}

// =============================================================================
// Helpers
// =============================================================================

/// Load the owner's cart joined with current product data.
pub(crate) async fn load_cart(store: &dyn Store, owner: &CartOwner) -> Result<CartSummary> {
    let lines = store.cart_lines(owner).await?;
    let mut products = Vec::with_capacity(lines.len());
    for line in &lines {
        if let Some(product) = store.get_product(line.product_id).await? {
            products.push(product);
        }
    }
    Ok(CartSummary::build(lines, &products))
}

fn parse_line_id(raw: &str) -> Result<CartItemId> {
    raw.parse()
        .map_err(|_| AppError::NotFound("Cart item".to_string()))
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/cart`
#[instrument(skip(state, shopper), fields(owner = %shopper.owner.storage_key()))]
pub async fn show(State(state): State<AppState>, shopper: Shopper) -> Result<Json<CartSummary>> {
    Ok(Json(load_cart(state.store(), &shopper.owner).await?))
}

/// `POST /api/cart` - add units of a product, merging into an existing line.
#[instrument(skip(state, shopper, body), fields(owner = %shopper.owner.storage_key()))]
pub async fn add(
    State(state): State<AppState>,
    shopper: Shopper,
    Json(body): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartLine>)> {
    let product_id = body
        .product_id
        .ok_or_else(|| AppError::BadRequest("productId required".to_string()))?;
    let quantity = quantity_to_add(body.quantity)?;
    active_product(&state, product_id).await?;

    let line = state
        .store()
        .add_to_cart(&shopper.owner, product_id, quantity)
        .await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        &[
            ("product_id", product_id.to_string()),
            ("quantity", quantity.to_string()),
        ],
    );
    Ok((StatusCode::CREATED, Json(line)))
}

/// `PUT /api/cart/{id}` - set a line's quantity; zero removes the line.
#[instrument(skip(state, shopper, body), fields(owner = %shopper.owner.storage_key()))]
pub async fn update(
    State(state): State<AppState>,
    shopper: Shopper,
    Path(id): Path<String>,
    Json(body): Json<UpdateQuantityRequest>,
) -> Result<Response> {
    let line_id = parse_line_id(&id)?;
    let quantity = quantity_to_set(body.quantity)?;

    match state
        .store()
        .set_cart_quantity(&shopper.owner, line_id, quantity)
        .await?
    {
        CartUpdate::Updated(line) => Ok(Json(line).into_response()),
        CartUpdate::Removed => Ok(StatusCode::NO_CONTENT.into_response()),
        CartUpdate::NotFound => Err(AppError::NotFound("Cart item".to_string())),
    }
}

/// `DELETE /api/cart/{id}`
#[instrument(skip(state, shopper), fields(owner = %shopper.owner.storage_key()))]
pub async fn remove(
    State(state): State<AppState>,
    shopper: Shopper,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let line_id = parse_line_id(&id)?;
    if state.store().remove_cart_line(&shopper.owner, line_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Cart item".to_string()))
    }
}

/// `DELETE /api/cart`
#[instrument(skip(state, shopper), fields(owner = %shopper.owner.storage_key()))]
pub async fn clear(State(state): State<AppState>, shopper: Shopper) -> Result<StatusCode> {
    let removed = state.store().clear_cart(&shopper.owner).await?;
    tracing::debug!(removed, "Cart cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/cart/transfer` - merge a guest cart into the logged-in user's.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn transfer(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<TransferRequest>,
) -> Result<Json<TransferResponse>> {
    let from = body
        .from_session_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("fromSessionId is required".to_string()))?;
    let guest = GuestId::parse(from)
        .map_err(|e| AppError::BadRequest(format!("Invalid fromSessionId: {e}")))?;

    let transferred = state
        .store()
        .transfer_cart(&CartOwner::Guest(guest), &CartOwner::User(user.id))
        .await?;

    tracing::info!(transferred, "Guest cart transferred");
    Ok(Json(TransferResponse {
        success: true,
        transferred,
    }))
}
