//! Browsing history and recommendation route handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use techmart_core::ProductId;
use techmart_core::catalog::{Product, ProductFilter};
use techmart_core::recommend::{DEFAULT_LIMIT, HISTORY_CAPACITY, frequently_bought_together, recommend};

use crate::error::{AppError, Result};
use crate::middleware::Shopper;
use crate::routes::products::active_product;
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordViewRequest {
    pub product_id: Option<ProductId>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationQuery {
    pub product_id: Option<ProductId>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanionQuery {
    pub product_id: Option<ProductId>,
}

/// A product from the viewer's history with the time it was last viewed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub viewed_at: DateTime<Utc>,
}

fn product_id_required() -> AppError {
    AppError::BadRequest("productId required".to_string())
}

/// `POST /api/browsing-history`
#[instrument(skip(state, shopper, body), fields(viewer = %shopper.owner.storage_key()))]
pub async fn record_view(
    State(state): State<AppState>,
    shopper: Shopper,
    Json(body): Json<RecordViewRequest>,
) -> Result<Json<Value>> {
    let product_id = body.product_id.ok_or_else(product_id_required)?;
    active_product(&state, product_id).await?;

    state
        .history()
        .record(&shopper.owner, product_id, Utc::now())
        .await;
    Ok(Json(json!({ "ok": true })))
}

/// `GET /api/browsing-history?limit=10` - most recently viewed first.
///
/// Products deleted or deactivated since they were viewed are skipped.
#[instrument(skip(state, shopper), fields(viewer = %shopper.owner.storage_key()))]
pub async fn history(
    State(state): State<AppState>,
    shopper: Shopper,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ViewedProduct>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(HISTORY_CAPACITY);
    let history = state.history().get(&shopper.owner).await;

    let mut viewed = Vec::new();
    for entry in history.recent(limit) {
        let product = state.store().get_product(entry.product_id).await?;
        if let Some(product) = product.filter(|p| p.is_active) {
            viewed.push(ViewedProduct {
                product,
                viewed_at: entry.viewed_at,
            });
        }
    }
    Ok(Json(viewed))
}

/// `GET /api/recommendations?productId&limit=6`
#[instrument(skip(state, shopper), fields(viewer = %shopper.owner.storage_key()))]
pub async fn recommendations(
    State(state): State<AppState>,
    shopper: Shopper,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<Vec<Product>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(HISTORY_CAPACITY);
    let current = match query.product_id {
        Some(id) => state.store().get_product(id).await?,
        None => None,
    };
    let history = state.history().get(&shopper.owner).await;
    let catalog = state.store().list_products(&ProductFilter::default()).await?;

    Ok(Json(recommend(current.as_ref(), &history, &catalog, limit)))
}

/// `GET /api/frequently-bought-together?productId`
///
/// Unknown products have no companions.
#[instrument(skip(state))]
pub async fn frequently_bought(
    State(state): State<AppState>,
    Query(query): Query<CompanionQuery>,
) -> Result<Json<Vec<Product>>> {
    let product_id = query.product_id.ok_or_else(product_id_required)?;
    let Some(product) = state.store().get_product(product_id).await? else {
        return Ok(Json(Vec::new()));
    };
    let catalog = state.store().list_products(&ProductFilter::default()).await?;
    Ok(Json(frequently_bought_together(&product, &catalog)))
}
