//! Catalog product endpoints.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use common::{Product, ProductDraft, ProductId, ProductUpdate, StoreId};
use serde::Deserialize;

use crate::extract::{AdminUser, MaybeUser};
use crate::response::{ApiJson, ApiResponse, ApiResult, parse_id};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub store: Option<StoreId>,
}

/// GET /api/products?store=
#[tracing::instrument(skip(state, _viewer))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    _viewer: MaybeUser,
    Query(query): Query<ProductQuery>,
) -> ApiResult<Vec<Product>> {
    let products = state.catalog.list_products(query.store).await?;
    Ok(ApiResponse::ok(products))
}

/// GET /api/products/{id}
pub async fn get(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<Product> {
    let id: ProductId = parse_id(&id, "product")?;
    Ok(ApiResponse::ok(state.catalog.get_product(id).await?))
}

/// POST /api/products
#[tracing::instrument(skip_all, fields(admin = %admin.id))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    ApiJson(draft): ApiJson<ProductDraft>,
) -> ApiResult<Product> {
    let product = state.catalog.create_product(draft).await?;
    Ok(ApiResponse::created(product).with_message("Product created"))
}

/// PUT /api/products/{id}
#[tracing::instrument(skip_all, fields(admin = %admin.id, product_id = %id))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<ProductUpdate>,
) -> ApiResult<Product> {
    let id: ProductId = parse_id(&id, "product")?;
    let product = state.catalog.update_product(id, update).await?;
    Ok(ApiResponse::ok(product).with_message("Product updated"))
}

/// DELETE /api/products/{id}
#[tracing::instrument(skip_all, fields(admin = %admin.id, product_id = %id))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id: ProductId = parse_id(&id, "product")?;
    state.catalog.delete_product(id).await?;
    Ok(ApiResponse::message("Product deleted"))
}
