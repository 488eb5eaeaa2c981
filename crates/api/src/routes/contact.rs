//! Public contact form.

use std::sync::Arc;

use axum::extract::State;
use common::{ContactMessage, ContactMessageDraft};

use crate::response::{ApiJson, ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /api/contact
///
/// The message is stored first; forwarding to the webhook never fails the
/// request.
#[tracing::instrument(skip_all)]
pub async fn submit(
    State(state): State<Arc<AppState>>,
    ApiJson(draft): ApiJson<ContactMessageDraft>,
) -> ApiResult<ContactMessage> {
    let message = state.contact.submit(draft).await?;
    state.notifier.forward_contact(&message).await;
    Ok(ApiResponse::created(message).with_message("Message received"))
}
