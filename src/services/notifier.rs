//! Alert delivery over a JSON webhook.
//!
//! Delivery is best-effort: a failed send never rolls back the signal that
//! triggered it. An unconfigured notifier skips signal delivery silently
//! but reports test sends as failed so the operator sees the gap.

use crate::error::ScanError;
use crate::models::Signal;
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a breakout alert for an already-recorded signal.
    async fn send(&self, signal: &Signal) -> Result<(), ScanError>;

    /// Deliver a test alert to verify the configuration end to end.
    async fn send_test(&self) -> Result<(), ScanError>;

    fn is_configured(&self) -> bool;
}

pub struct WebhookNotifier {
    url: Option<String>,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: Option<String>) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    pub fn with_client(url: Option<String>, client: reqwest::Client) -> Self {
        Self { url, client }
    }

    async fn post(&self, url: &str, body: &serde_json::Value) -> Result<(), ScanError> {
        self.client
            .post(url)
            .json(body)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| ScanError::DeliveryFailed(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, signal: &Signal) -> Result<(), ScanError> {
        let Some(url) = &self.url else {
            debug!("alert webhook not configured, skipping delivery");
            return Ok(());
        };

        let body = json!({
            "event": "signal",
            "direction": signal.direction,
            "price": signal.price,
            "trigger_level": signal.trigger_level,
            "previous_high": signal.session_levels.high,
            "previous_low": signal.session_levels.low,
            "timestamp": signal.timestamp,
        });
        self.post(url, &body).await?;

        info!(
            direction = %signal.direction,
            price = signal.price,
            trigger_level = signal.trigger_level,
            "breakout alert delivered"
        );
        Ok(())
    }

    async fn send_test(&self) -> Result<(), ScanError> {
        let Some(url) = &self.url else {
            return Err(ScanError::DeliveryFailed(
                "alert webhook not configured".to_string(),
            ));
        };

        let body = json!({
            "event": "test",
            "message": "Levelwatch test alert",
            "timestamp": chrono::Utc::now(),
        });
        self.post(url, &body).await?;

        info!("test alert delivered");
        Ok(())
    }

    fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}
