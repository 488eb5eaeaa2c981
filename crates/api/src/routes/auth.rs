//! Registration, sign-in and profile endpoints.

use std::sync::Arc;

use axum::extract::State;
use common::User;
use domain::{AuthSession, LoginRequest, ProfileUpdate, RegisterRequest};

use crate::extract::AuthUser;
use crate::response::{ApiJson, ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /api/auth/register
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<AuthSession> {
    let session = state.auth.register(req).await?;
    Ok(ApiResponse::created(session).with_message("Account created"))
}

/// POST /api/auth/login
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<AuthSession> {
    let session = state.auth.login(req).await?;
    Ok(ApiResponse::ok(session))
}

/// GET /api/auth/profile
pub async fn profile(AuthUser(user): AuthUser) -> ApiResult<User> {
    Ok(ApiResponse::ok(user))
}

/// PUT /api/auth/profile
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> ApiResult<User> {
    let user = state.auth.update_profile(user.id, update).await?;
    Ok(ApiResponse::ok(user).with_message("Profile updated"))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> ApiResult<AuthSession> {
    let session = state.auth.refresh(user)?;
    Ok(ApiResponse::ok(session))
}

/// POST /api/auth/logout
///
/// Tokens are stateless, so this only confirms the caller was signed in.
pub async fn logout(AuthUser(user): AuthUser) -> ApiResult<()> {
    tracing::debug!(user_id = %user.id, "user signed out");
    Ok(ApiResponse::message("Logged out"))
}
