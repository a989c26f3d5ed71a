//! Authentication route handlers.
//!
//! Successful registration and login put the user in the session and merge
//! any guest cart the browser was using into the user's cart.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use techmart_core::user::User;
use techmart_core::{CartOwner, GuestId};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::cart_owner::GUEST_ID_HEADER;
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::services::AuthService;
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

// =============================================================================
// Helpers
// =============================================================================

/// Guest carts this browser used before signing in: the `x-session-id`
/// header's and the session cookie's, when they differ.
async fn prior_guests(session: &Session, headers: &HeaderMap) -> Result<Vec<GuestId>> {
    let mut guests: Vec<GuestId> = headers
        .get(GUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| GuestId::parse(s.trim()).ok())
        .into_iter()
        .collect();
    let remembered = session.get::<GuestId>(session_keys::GUEST_ID).await?;
    if let Some(remembered) = remembered.filter(|g| !guests.contains(g)) {
        guests.push(remembered);
    }
    Ok(guests)
}

/// Put `user` in the session and fold the guest carts into theirs.
async fn sign_in(state: &AppState, session: &Session, headers: &HeaderMap, user: &User) -> Result<()> {
    let guests = prior_guests(session, headers).await?;

    set_current_user(session, &CurrentUser::from(user)).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    for guest in guests {
        let transferred = state
            .store()
            .transfer_cart(&CartOwner::Guest(guest.clone()), &CartOwner::User(user.id))
            .await?;
        if transferred > 0 {
            tracing::info!(user_id = %user.id, guest_id = %guest, transferred, "Merged guest cart on sign-in");
        }
    }
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/auth/register`
#[instrument(skip(state, session, headers, body))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    if body.email.trim().is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()));
    }
    if body.password.is_empty() {
        return Err(AppError::BadRequest("Password is required".to_string()));
    }

    let user = AuthService::new(state.store())
        .register(&body.email, &body.password, &body.name)
        .await?;
    sign_in(&state, &session, &headers, &user).await?;

    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

/// `POST /api/auth/login`
#[instrument(skip(state, session, headers, body))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<Json<UserResponse>> {
    if body.email.trim().is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()));
    }
    if body.password.is_empty() {
        return Err(AppError::BadRequest("Password is required".to_string()));
    }

    let user = AuthService::new(state.store())
        .login(&body.email, &body.password)
        .await?;
    sign_in(&state, &session, &headers, &user).await?;

    tracing::info!(user_id = %user.id, "Customer logged in");
    Ok(Json(UserResponse { user }))
}

/// `POST /api/auth/logout`
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<Value>> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Json(json!({ "ok": true })))
}

/// `GET /api/auth/me`
#[instrument(skip(state, current), fields(user_id = %current.id))]
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<UserResponse>> {
    let user = state
        .store()
        .get_user(current.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;
    Ok(Json(UserResponse { user }))
}
