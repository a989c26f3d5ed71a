//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Error bodies are JSON: `{"error": "<message>"}`, plus a `details` array of
//! `{field, message}` objects for validation failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use techmart_core::cart::QuantityError;
use techmart_core::catalog::{FieldError, ValidationError};
use techmart_core::order::OrderError;
use techmart_store::StoreError;

use crate::services::auth::AuthError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Storage operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout or order lifecycle rule violated.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Invalid cart quantity.
    #[error("Quantity error: {0}")]
    Quantity(#[from] QuantityError),

    /// Session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

const INTERNAL: &str = "Internal server error";

fn store_parts(err: &StoreError) -> (StatusCode, String) {
    match err {
        StoreError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
        StoreError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
        StoreError::InsufficientStock { available, .. } => (
            StatusCode::CONFLICT,
            format!("Insufficient stock: only {available} left"),
        ),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string()),
    }
}

impl AppError {
    /// Status code, client-facing message and optional field details.
    fn parts(&self) -> (StatusCode, String, Option<&[FieldError]>) {
        match self {
            Self::Store(err) => {
                let (status, message) = store_parts(err);
                (status, message, None)
            }
            Self::Auth(err) => {
                let (status, message) = match err {
                    AuthError::InvalidCredentials => (
                        StatusCode::UNAUTHORIZED,
                        "Invalid email or password".to_string(),
                    ),
                    AuthError::UserAlreadyExists => (
                        StatusCode::CONFLICT,
                        "User with this email already exists".to_string(),
                    ),
                    AuthError::WeakPassword(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                    AuthError::InvalidEmail(_) => {
                        (StatusCode::BAD_REQUEST, "Invalid email address".to_string())
                    }
                    AuthError::MissingName => {
                        (StatusCode::BAD_REQUEST, "Name is required".to_string())
                    }
                    AuthError::Store(store) => store_parts(store),
                    AuthError::PasswordHash => {
                        (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
                    }
                };
                (status, message, None)
            }
            Self::Order(err) => match err {
                OrderError::Invalid(validation) => (
                    StatusCode::BAD_REQUEST,
                    "Invalid order data".to_string(),
                    Some(validation.errors.as_slice()),
                ),
                OrderError::InsufficientStock { .. } | OrderError::InvalidTransition { .. } => {
                    (StatusCode::CONFLICT, err.to_string(), None)
                }
                _ => (StatusCode::BAD_REQUEST, err.to_string(), None),
            },
            Self::Validation(err) => (
                StatusCode::BAD_REQUEST,
                "Invalid input".to_string(),
                Some(err.errors.as_slice()),
            ),
            Self::Quantity(err) => (StatusCode::BAD_REQUEST, err.to_string(), None),
            Self::Session(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string(), None)
            }
            Self::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found"), None),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = self.parts();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = match details {
            Some(details) => json!({ "error": message, "details": details }),
            None => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, String)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String(value.clone()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}
