//! Public settings.

use std::sync::Arc;

use axum::extract::State;

use crate::response::{ApiResponse, ApiResult};
use crate::routes::admin::DeliveryFee;
use crate::state::AppState;

/// GET /api/settings/delivery-fee
pub async fn delivery_fee(State(state): State<Arc<AppState>>) -> ApiResult<DeliveryFee> {
    let amount = state.orders.delivery_fee().await;
    Ok(ApiResponse::ok(DeliveryFee { amount }))
}
