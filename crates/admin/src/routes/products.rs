//! Product management routes.
//!
//! Unlike the storefront, these see inactive products too.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::instrument;

use techmart_core::ProductId;
use techmart_core::catalog::{NewProduct, Product, ProductPatch};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

fn parse_id(raw: &str) -> Result<ProductId> {
    raw.parse()
        .map_err(|_| AppError::NotFound("Product".to_string()))
}

/// `GET /api/products` - every product, newest first.
#[instrument(skip_all)]
pub async fn index(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.store().all_products().await?))
}

/// `POST /api/products`
#[instrument(skip_all)]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    body: std::result::Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>)> {
    let Json(input) = body?;
    let product = state.store().create_product(input.validate()?).await?;
    state.analytics().invalidate().await;

    tracing::info!(
        admin_id = %admin.id,
        product_id = %product.id,
        sku = %product.sku,
        "Product created"
    );
    Ok((StatusCode::CREATED, Json(product)))
}

/// `GET /api/products/{id}`
#[instrument(skip(_admin, state))]
pub async fn show(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let id = parse_id(&id)?;
    state
        .store()
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
}

/// `PUT /api/products/{id}` - partial update.
#[instrument(skip(admin, state, body))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<ProductPatch>, JsonRejection>,
) -> Result<Json<Product>> {
    let id = parse_id(&id)?;
    let Json(patch) = body?;

    let product = state
        .store()
        .update_product(id, patch.validate()?)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
    state.analytics().invalidate().await;

    tracing::info!(admin_id = %admin.id, product_id = %product.id, "Product updated");
    Ok(Json(product))
}

/// `DELETE /api/products/{id}`
#[instrument(skip(admin, state))]
pub async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id)?;
    if !state.store().delete_product(id).await? {
        return Err(AppError::NotFound("Product".to_string()));
    }
    state.analytics().invalidate().await;

    tracing::info!(admin_id = %admin.id, product_id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
