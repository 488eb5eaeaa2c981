//! Category endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use common::{Category, CategoryDraft, CategoryId, CategoryUpdate};

use crate::extract::{AdminUser, MaybeUser};
use crate::response::{ApiJson, ApiResponse, ApiResult, parse_id};
use crate::state::AppState;

/// GET /api/categories
pub async fn list(State(state): State<Arc<AppState>>, _viewer: MaybeUser) -> ApiResult<Vec<Category>> {
    Ok(ApiResponse::ok(state.catalog.list_categories().await?))
}

/// GET /api/categories/{id}
pub async fn get(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<Category> {
    let id: CategoryId = parse_id(&id, "category")?;
    Ok(ApiResponse::ok(state.catalog.get_category(id).await?))
}

/// POST /api/categories
#[tracing::instrument(skip_all, fields(admin = %admin.id))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    ApiJson(draft): ApiJson<CategoryDraft>,
) -> ApiResult<Category> {
    let category = state.catalog.create_category(draft).await?;
    Ok(ApiResponse::created(category).with_message("Category created"))
}

/// PUT /api/categories/{id}
#[tracing::instrument(skip_all, fields(admin = %admin.id, category_id = %id))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<CategoryUpdate>,
) -> ApiResult<Category> {
    let id: CategoryId = parse_id(&id, "category")?;
    let category = state.catalog.update_category(id, update).await?;
    Ok(ApiResponse::ok(category).with_message("Category updated"))
}

/// DELETE /api/categories/{id}
///
/// Products keep their category reference.
#[tracing::instrument(skip_all, fields(admin = %admin.id, category_id = %id))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id: CategoryId = parse_id(&id, "category")?;
    state.catalog.delete_category(id).await?;
    Ok(ApiResponse::message("Category deleted"))
}
