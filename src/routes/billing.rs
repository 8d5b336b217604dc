use axum::{extract::State, http::HeaderMap, Json};
use tracing::{info, instrument};

use crate::{
    app_state::AppState,
    error::{ApiError, Result},
    models::billing::{CheckoutWebhookEvent, WebhookAck},
};

const FULFILLED_EVENT: &str = "checkout.session.completed";

/// POST /api/v1/billing/webhook
///
/// Payment-provider fulfillment: appends one pack-size credit pack to the
/// user the checkout was started for. Idempotent on the session id, so
/// provider retries are safe.
#[instrument(skip(state, headers, event))]
pub async fn checkout_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<CheckoutWebhookEvent>,
) -> Result<Json<WebhookAck>> {
    let secret = headers
        .get("x-webhook-secret")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing webhook secret".to_string()))?;

    if secret != state.config.billing.webhook_secret {
        return Err(ApiError::Unauthorized("Invalid webhook secret".to_string()));
    }

    if event.event_type != FULFILLED_EVENT {
        // Unrelated event types are acknowledged and dropped
        info!("Ignoring webhook event type {}", event.event_type);
        return Ok(Json(WebhookAck {
            received: true,
            pack_id: None,
        }));
    }

    let session = event.data.object;
    let external_id = session.client_reference_id.ok_or_else(|| {
        ApiError::BadRequest("Checkout session has no client_reference_id".to_string())
    })?;

    let user = state.user_service.get_or_create(&external_id).await?;

    let pack = state
        .quota_service
        .grant_pack(user.id, state.quota_service.pack_size(), &session.id)
        .await?;

    Ok(Json(WebhookAck {
        received: true,
        pack_id: Some(pack.id),
    }))
}
