//! Customer profile route handlers. All require a logged-in customer.

use axum::{Json, extract::State};
use tracing::instrument;

use techmart_core::order::{Order, OrderQuery, ShippingAddress};
use techmart_core::user::{ProfileUpdate, User};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

fn user_not_found() -> AppError {
    AppError::NotFound("User".to_string())
}

/// `GET /api/profile`
#[instrument(skip(state, current), fields(user_id = %current.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<User>> {
    let user = state
        .store()
        .get_user(current.id)
        .await?
        .ok_or_else(user_not_found)?;
    Ok(Json(user))
}

/// `PUT /api/profile` - change name and/or phone. A blank phone clears it.
#[instrument(skip(state, current, body), fields(user_id = %current.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<User>> {
    let user = state
        .store()
        .update_profile(current.id, body.normalized())
        .await?
        .ok_or_else(user_not_found)?;
    Ok(Json(user))
}

/// `PUT /api/profile/address` - replace the saved shipping address.
#[instrument(skip(state, current, body), fields(user_id = %current.id))]
pub async fn update_address(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<ShippingAddress>,
) -> Result<Json<User>> {
    let address = body.validate()?;
    let user = state
        .store()
        .update_shipping_address(current.id, address)
        .await?
        .ok_or_else(user_not_found)?;
    Ok(Json(user))
}

/// `GET /api/user/orders` - the customer's orders, newest first.
#[instrument(skip(state, current), fields(user_id = %current.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders = state
        .store()
        .list_orders(OrderQuery {
            user_id: Some(current.id),
            status: None,
        })
        .await?;
    Ok(Json(orders))
}
