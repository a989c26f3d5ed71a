//! Admin authentication routes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use techmart_core::user::User;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{OptionalAdmin, RequireAdmin, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::services::AdminAuthService;
use crate::state::AppState;

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

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate;

/// `GET /login` - sign-in form. Already signed-in admins go to the dashboard.
pub async fn login_page(OptionalAdmin(admin): OptionalAdmin) -> Response {
    if admin.is_some() {
        return Redirect::to("/").into_response();
    }
    LoginTemplate.into_response()
}

/// `POST /api/auth/login`
///
/// Customers with valid credentials get 403; only admin accounts sign in.
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<UserResponse>> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let user = AdminAuthService::new(state.store())
        .login(&body.email, &body.password)
        .await?;

    set_current_admin(&session, &CurrentAdmin::from(&user)).await?;
    tracing::info!(admin_id = %user.id, "Admin signed in");

    Ok(Json(UserResponse { user }))
}

/// `POST /api/auth/logout`
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Json<Value>> {
    clear_current_admin(&session).await?;
    Ok(Json(json!({ "ok": true })))
}

/// `GET /api/auth/me`
///
/// Reloads the account so a revoked admin is turned away.
#[instrument(skip_all)]
pub async fn me(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<UserResponse>> {
    match state.store().get_user(admin.id).await? {
        Some(user) if user.is_admin => Ok(Json(UserResponse { user })),
        _ => {
            clear_current_admin(&session).await?;
            Err(AppError::Unauthorized("Unauthorized".to_string()))
        }
    }
}
