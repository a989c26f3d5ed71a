//! Cart owner resolution.
//!
//! Every cart request acts on behalf of exactly one [`CartOwner`]:
//!
//! 1. the logged-in user, if any
//! 2. otherwise the guest id in the `x-session-id` header, if it is valid
//! 3. otherwise a guest id generated once and remembered in the session

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use techmart_core::{CartOwner, GuestId};

use crate::error::AppError;
use crate::middleware::auth::current_user;
use crate::models::{CurrentUser, session_keys};

/// Header carrying the browser's guest cart id.
pub const GUEST_ID_HEADER: &str = "x-session-id";

/// The shopper behind a request.
#[derive(Debug, Clone)]
pub struct Shopper {
    /// Whose cart the request acts on.
    pub owner: CartOwner,
    /// The logged-in user, when there is one.
    pub user: Option<CurrentUser>,
}

impl<S> FromRequestParts<S> for Shopper
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        if let Some(user) = current_user(session).await? {
            return Ok(Self {
                owner: CartOwner::User(user.id),
                user: Some(user),
            });
        }

        if let Some(guest) = header_guest_id(parts) {
            return Ok(Self {
                owner: CartOwner::Guest(guest),
                user: None,
            });
        }

        let guest = session_guest_id(session).await?;
        Ok(Self {
            owner: CartOwner::Guest(guest),
            user: None,
        })
    }
}

/// The guest id from the `x-session-id` header, ignoring malformed values.
#[must_use]
pub fn header_guest_id(parts: &Parts) -> Option<GuestId> {
    parts
        .headers
        .get(GUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| GuestId::parse(s.trim()).ok())
}

/// The guest id remembered in the session, generating one on first use.
///
/// # Errors
///
/// Returns an error if the session store cannot be read or written.
pub async fn session_guest_id(session: &Session) -> Result<GuestId, tower_sessions::session::Error> {
    if let Some(existing) = session.get::<GuestId>(session_keys::GUEST_ID).await? {
        return Ok(existing);
    }
    let generated = GuestId::generate();
    session.insert(session_keys::GUEST_ID, &generated).await?;
    tracing::debug!(guest_id = %generated, "Generated guest cart id");
    Ok(generated)
}
