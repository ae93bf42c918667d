use crate::config::AlertingConfig;
use crate::error::AppError;
use crate::models::Fact;
use serde_json::json;
use uuid::Uuid;

/// Operator-channel webhook for situations that need a human: unmatched or
/// ambiguous deposits and malformed bank notifications. Delivery is
/// best-effort; a down channel never fails the calling operation, it only
/// logs.
#[derive(Clone)]
pub struct AlertingClient {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl AlertingClient {
    pub fn new(config: AlertingConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: config.webhook_url,
        }
    }

    pub async fn notify_fact(&self, fact: &Fact) {
        let payload = json!({
            "alert_id": Uuid::new_v4(),
            "kind": fact.kind(),
            "fact": fact,
        });
        self.post("reconciliation fact", payload).await;
    }

    pub async fn malformed_notification(&self, raw: &str, error: &AppError) {
        let payload = json!({
            "alert_id": Uuid::new_v4(),
            "kind": "malformed_notification",
            "raw": raw,
            "error": error.to_string(),
        });
        self.post("malformed notification", payload).await;
    }

    async fn post(&self, what: &str, payload: serde_json::Value) {
        let Some(url) = &self.webhook_url else {
            log::info!("Operator alert ({what}): {payload}");
            return;
        };

        match self.client.post(url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                log::debug!("Operator alert delivered ({what})");
            }
            Ok(response) => {
                log::error!(
                    "Operator channel returned {} for {what}; alert logged instead: {payload}",
                    response.status()
                );
            }
            Err(e) => {
                log::error!("Failed to reach operator channel for {what}: {e}; alert logged instead: {payload}");
            }
        }
    }
}
