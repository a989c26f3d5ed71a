//! Unified error handling for admin.
//!
//! Every handler returns [`Result`]; errors render as
//! `{"error": "<message>"}` with an optional `details` array for
//! validation failures. Server errors are captured to Sentry.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use techmart_core::catalog::ValidationError;
use techmart_core::order::OrderError;
use techmart_store::StoreError;

use crate::services::auth::AdminAuthError;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// Storage operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Login failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AdminAuthError),

    /// Order rule violated (refund amount and similar).
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Request body was not valid JSON for the endpoint.
    #[error("Malformed body: {0}")]
    Json(#[from] JsonRejection),

    /// Session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Template failed to render.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::Conflict(_) | StoreError::InsufficientStock { .. }) => {
                StatusCode::CONFLICT
            }
            Self::Auth(AdminAuthError::InvalidCredentials) | Self::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Auth(AdminAuthError::NotAdmin) | Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Order(_) | Self::Validation(_) | Self::Json(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Store(_)
            | Self::Auth(AdminAuthError::Store(_))
            | Self::Session(_)
            | Self::Template(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        // Don't expose internal error details to clients
        let body = match &self {
            _ if status.is_server_error() => json!({ "error": "Internal server error" }),
            Self::Validation(err) | Self::Order(OrderError::Invalid(err)) => {
                json!({ "error": "Invalid input", "details": err.errors })
            }
            Self::Order(err) => json!({ "error": err.to_string() }),
            Self::Store(StoreError::Conflict(msg)) => json!({ "error": msg }),
            Self::Store(StoreError::NotFound) => json!({ "error": "Not found" }),
            Self::Auth(AdminAuthError::InvalidCredentials) => {
                json!({ "error": "Invalid email or password" })
            }
            Self::Auth(AdminAuthError::NotAdmin) => json!({ "error": "Admin access required" }),
            Self::Json(rejection) => json!({ "error": rejection.body_text() }),
            Self::NotFound(what) => json!({ "error": format!("{what} not found") }),
            Self::Unauthorized(msg) | Self::Forbidden(msg) | Self::BadRequest(msg) => {
                json!({ "error": msg })
            }
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_admin_is_forbidden() {
        let (status, body) = body_of(AppError::Auth(AdminAuthError::NotAdmin)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Admin access required");
    }

    #[tokio::test]
    async fn test_conflict_message_passes_through() {
        let (status, body) = body_of(AppError::Store(StoreError::Conflict(
            "Product with this SKU already exists".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Product with this SKU already exists");
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let (status, body) = body_of(AppError::Internal("pool exhausted".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_refund_amount_is_bad_request() {
        let (status, body) = body_of(AppError::Order(OrderError::InvalidRefundAmount)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().len() > 1);
    }
}
