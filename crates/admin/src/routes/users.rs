//! User account listing.

use axum::{Json, extract::State};
use tracing::instrument;

use techmart_core::user::User;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// `GET /api/admin/users` - every account, newest first.
#[instrument(skip_all)]
pub async fn index(_admin: RequireAdmin, State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    Ok(Json(state.store().list_users().await?))
}
