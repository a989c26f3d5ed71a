//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;

use techmart_core::ProductId;
use techmart_core::catalog::{CATEGORIES, Category, Product, ProductFilter, brands};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Parse a product id from a path segment. Malformed ids are simply unknown.
pub(crate) fn parse_product_id(raw: &str) -> Result<ProductId> {
    raw.parse()
        .map_err(|_| AppError::NotFound("Product".to_string()))
}

/// Load an active product or fail with 404.
pub(crate) async fn active_product(state: &AppState, id: ProductId) -> Result<Product> {
    state
        .store()
        .get_product(id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
}

/// `GET /api/products` - active products matching the query filters.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>> {
    let products = state.store().list_products(&filter.normalized()).await?;
    Ok(Json(products))
}

/// `GET /api/products/{id}`
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    let id = parse_product_id(&id)?;
    Ok(Json(active_product(&state, id).await?))
}

/// `GET /api/categories`
pub async fn categories() -> Json<&'static [Category]> {
    Json(&CATEGORIES)
}

/// `GET /api/brands` - distinct brands of active products, sorted.
#[instrument(skip(state))]
pub async fn brand_list(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let products = state.store().list_products(&ProductFilter::default()).await?;
    Ok(Json(brands(&products)))
}
