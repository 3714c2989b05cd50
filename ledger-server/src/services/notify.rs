//! Completion notification service
//!
//! Fire-and-forget: a failed notification is logged and swallowed, it
//! never blocks or fails the primary mutation. The surrounding deployment
//! is expected to put retry/backoff in front of the real endpoint.

use async_trait::async_trait;
use shared::models::Order;

/// Notification boundary
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Notify that an order completed. Must not fail the caller.
    async fn order_completed(&self, order: &Order);
}

/// No-op notifier (tests / notification disabled)
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn order_completed(&self, _order: &Order) {}
}

/// Webhook-backed notifier
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn order_completed(&self, order: &Order) {
        let payload = serde_json::json!({
            "event": "order_completed",
            "order_id": order.id,
            "branch_id": order.branch_id,
            "total": order.summary.total,
        });
        match self.client.post(&self.url).json(&payload).send().await {
            Ok(response) if !response.status().is_success() => {
                tracing::warn!(
                    order_id = order.id,
                    status = %response.status(),
                    "Completion notification rejected"
                );
            }
            Ok(_) => {
                tracing::debug!(order_id = order.id, "Completion notification sent");
            }
            Err(e) => {
                tracing::warn!(order_id = order.id, error = %e, "Completion notification failed");
            }
        }
    }
}
