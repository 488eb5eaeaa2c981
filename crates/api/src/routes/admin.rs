//! Administrator endpoints under `/api/admin`.

use std::sync::Arc;

use axum::extract::{Path, State};
use common::{ContactMessage, Money, Order, OrderId, OrderStatus, Role, User, UserId};
use domain::AdminStats;
use serde::{Deserialize, Serialize};

use crate::extract::AdminUser;
use crate::response::{ApiJson, ApiResponse, ApiResult, parse_id};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeliveryFee {
    pub amount: Money,
}

/// GET /api/admin/orders
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> ApiResult<Vec<Order>> {
    Ok(ApiResponse::ok(state.orders.list_all().await?))
}

/// PUT /api/admin/orders/{id}/status
#[tracing::instrument(skip_all, fields(admin = %admin.id, order_id = %id))]
pub async fn update_order_status(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    ApiJson(change): ApiJson<StatusChange>,
) -> ApiResult<Order> {
    let id: OrderId = parse_id(&id, "order")?;
    let order = state.orders.update_status(id, change.status).await?;
    Ok(ApiResponse::ok(order).with_message("Order status updated"))
}

/// DELETE /api/admin/orders/{id}
#[tracing::instrument(skip_all, fields(admin = %admin.id, order_id = %id))]
pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id: OrderId = parse_id(&id, "order")?;
    state.orders.delete(id).await?;
    Ok(ApiResponse::message("Order deleted"))
}

/// GET /api/admin/stats
pub async fn stats(State(state): State<Arc<AppState>>, _admin: AdminUser) -> ApiResult<AdminStats> {
    Ok(ApiResponse::ok(state.admin.stats().await?))
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> ApiResult<Vec<User>> {
    Ok(ApiResponse::ok(state.admin.list_users().await?))
}

/// PUT /api/admin/users/{id}/role
#[tracing::instrument(skip_all, fields(admin = %admin.id, user_id = %id))]
pub async fn set_user_role(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    ApiJson(change): ApiJson<RoleChange>,
) -> ApiResult<User> {
    let id: UserId = parse_id(&id, "user")?;
    let user = state.admin.set_role(id, change.role).await?;
    Ok(ApiResponse::ok(user).with_message("User role updated"))
}

/// DELETE /api/admin/users/{id}
#[tracing::instrument(skip_all, fields(admin = %admin.id, user_id = %id))]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id: UserId = parse_id(&id, "user")?;
    state.admin.delete_user(&admin, id).await?;
    Ok(ApiResponse::message("User deleted"))
}

/// GET /api/admin/contact
pub async fn list_contact_messages(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> ApiResult<Vec<ContactMessage>> {
    Ok(ApiResponse::ok(state.contact.list().await?))
}

/// PUT /api/admin/settings/delivery-fee
#[tracing::instrument(skip_all, fields(admin = %admin.id))]
pub async fn set_delivery_fee(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    ApiJson(fee): ApiJson<DeliveryFee>,
) -> ApiResult<DeliveryFee> {
    let amount = state.orders.set_delivery_fee(fee.amount).await?;
    Ok(ApiResponse::ok(DeliveryFee { amount }).with_message("Delivery fee updated"))
}
