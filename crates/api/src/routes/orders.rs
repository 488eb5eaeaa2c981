//! Customer order endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use common::{CheckoutRequest, Order, OrderId};

use crate::extract::AuthUser;
use crate::response::{ApiJson, ApiResponse, ApiResult, parse_id};
use crate::state::AppState;

/// POST /api/orders
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiJson(req): ApiJson<CheckoutRequest>,
) -> ApiResult<Order> {
    let order = state.orders.place_order(&user, req).await?;
    Ok(ApiResponse::created(order).with_message("Order placed"))
}

/// GET /api/orders
pub async fn list(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Vec<Order>> {
    Ok(ApiResponse::ok(state.orders.list_for_user(user.id).await?))
}

/// GET /api/orders/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Order> {
    let id: OrderId = parse_id(&id, "order")?;
    Ok(ApiResponse::ok(state.orders.get_for(&user, id).await?))
}
