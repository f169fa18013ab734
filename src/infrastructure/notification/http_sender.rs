//! Email delivery over HTTP

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::EmailConfig;
use crate::domain::action_token::{AccountAction, ActionTokenId};
use crate::domain::{DomainError, NotificationSender};

use super::email::{action_link, EmailMessage};

/// Posts account emails as JSON to a delivery endpoint
///
/// Any non-2xx response or transport error is reported as
/// `NotificationFailed`.
#[derive(Debug, Clone)]
pub struct HttpNotificationSender {
    client: Client,
    endpoint: String,
    config: EmailConfig,
}

impl HttpNotificationSender {
    pub fn new(endpoint: impl Into<String>, config: EmailConfig) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            config,
        })
    }

    fn base_url(&self, action: AccountAction) -> &str {
        match action {
            AccountAction::Confirmation => &self.config.confirmation_base_url,
            AccountAction::PasswordReset => &self.config.password_reset_base_url,
            AccountAction::Deletion => &self.config.deletion_base_url,
        }
    }

    async fn deliver(
        &self,
        action: AccountAction,
        recipient: &str,
        token_id: &ActionTokenId,
    ) -> Result<(), DomainError> {
        let url = action_link(self.base_url(action), &token_id.to_string());
        let message = EmailMessage::for_action(action, recipient, url);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&message)
            .send()
            .await
            .map_err(|e| {
                warn!(action = %action, error = %e, "Email delivery request failed");
                DomainError::notification_failed(format!("Email delivery request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(action = %action, status = status.as_u16(), "Email delivery rejected");
            return Err(DomainError::notification_failed(format!(
                "Email delivery returned status {}",
                status.as_u16()
            )));
        }

        info!(action = %action, status = status.as_u16(), "Email delivered");
        Ok(())
    }
}

#[async_trait]
impl NotificationSender for HttpNotificationSender {
    async fn send_confirmation_email(
        &self,
        recipient: &str,
        token_id: &ActionTokenId,
    ) -> Result<(), DomainError> {
        self.deliver(AccountAction::Confirmation, recipient, token_id)
            .await
    }

    async fn send_password_reset_email(
        &self,
        recipient: &str,
        token_id: &ActionTokenId,
    ) -> Result<(), DomainError> {
        self.deliver(AccountAction::PasswordReset, recipient, token_id)
            .await
    }

    async fn send_deletion_email(
        &self,
        recipient: &str,
        token_id: &ActionTokenId,
    ) -> Result<(), DomainError> {
        self.deliver(AccountAction::Deletion, recipient, token_id)
            .await
    }
}
