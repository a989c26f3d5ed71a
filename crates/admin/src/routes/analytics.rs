//! Store statistics and analytics routes.

use axum::{Json, extract::State};
use chrono::Utc;
use tracing::instrument;

use techmart_core::analytics::{AnalyticsReport, StoreStats};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::services::analytics::current_stats;
use crate::state::AppState;

/// `GET /api/admin/stats`
#[instrument(skip_all)]
pub async fn stats(_admin: RequireAdmin, State(state): State<AppState>) -> Result<Json<StoreStats>> {
    Ok(Json(current_stats(state.store(), Utc::now()).await?))
}

/// `GET /api/admin/analytics` - served from a 60 second cache.
#[instrument(skip_all)]
pub async fn report(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<AnalyticsReport>> {
    let report = state.analytics().report(state.store(), Utc::now()).await?;
    Ok(Json(report))
}
