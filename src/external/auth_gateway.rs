use crate::config::AuthGatewayConfig;
use crate::error::{AppError, AppResult};

/// Client for the identity subsystem's internal API. Used to invalidate a
/// member's other active sessions after their payment completes, so a stale
/// session cannot keep the pre-promotion role.
#[derive(Clone)]
pub struct AuthGatewayClient {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl AuthGatewayClient {
    pub fn new(config: AuthGatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url,
        }
    }

    /// Ask the gateway to drop the member's other sessions. A gateway
    /// failure is returned to the caller: the triggering fact stays in the
    /// outbox and the call is retried on redelivery.
    pub async fn invalidate_sessions(&self, member_id: i64) -> AppResult<()> {
        let Some(base_url) = &self.base_url else {
            log::info!("No auth gateway configured; skipping session invalidation for member {member_id}");
            return Ok(());
        };

        let url = format!("{base_url}/internal/members/{member_id}/sessions/invalidate");
        let response = self.client.post(&url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApiError(format!(
                "auth gateway returned {} for member {member_id}",
                response.status()
            )));
        }

        log::info!("Requested session invalidation for member {member_id}");
        Ok(())
    }
}
