use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment-provider fulfillment webhook payload (checkout-session shaped).
#[derive(Debug, Deserialize)]
pub struct CheckoutWebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: CheckoutWebhookData,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutWebhookData {
    pub object: CheckoutSession,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    /// Provider-side session id; used as the idempotency key for the pack.
    pub id: String,
    /// External user id the checkout was started for.
    pub client_reference_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    pub received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pack_id: Option<Uuid>,
}
