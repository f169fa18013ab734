//! Notification sender that only logs

use async_trait::async_trait;
use tracing::info;

use crate::config::EmailConfig;
use crate::domain::action_token::{AccountAction, ActionTokenId};
use crate::domain::{DomainError, NotificationSender};

use super::email::action_link;

/// Writes action links to the log instead of mailing them
///
/// Used when no delivery endpoint is configured.
#[derive(Debug, Clone)]
pub struct LogNotificationSender {
    config: EmailConfig,
}

impl LogNotificationSender {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn log(&self, action: AccountAction, recipient: &str, token_id: &ActionTokenId) {
        let base = match action {
            AccountAction::Confirmation => &self.config.confirmation_base_url,
            AccountAction::PasswordReset => &self.config.password_reset_base_url,
            AccountAction::Deletion => &self.config.deletion_base_url,
        };

        info!(
            recipient = %recipient,
            action = %action,
            url = %action_link(base, &token_id.to_string()),
            "Email delivery not configured, notification logged"
        );
    }
}

#[async_trait]
impl NotificationSender for LogNotificationSender {
    async fn send_confirmation_email(
        &self,
        recipient: &str,
        token_id: &ActionTokenId,
    ) -> Result<(), DomainError> {
        self.log(AccountAction::Confirmation, recipient, token_id);
        Ok(())
    }

    async fn send_password_reset_email(
        &self,
        recipient: &str,
        token_id: &ActionTokenId,
    ) -> Result<(), DomainError> {
        self.log(AccountAction::PasswordReset, recipient, token_id);
        Ok(())
    }

    async fn send_deletion_email(
        &self,
        recipient: &str,
        token_id: &ActionTokenId,
    ) -> Result<(), DomainError> {
        self.log(AccountAction::Deletion, recipient, token_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sender_always_succeeds() {
        let sender = LogNotificationSender::new(EmailConfig::default());
        let token = ActionTokenId::generate();

        assert!(sender.send_confirmation_email("a@test.com", &token).await.is_ok());
        assert!(sender.send_deletion_email("a@test.com", &token).await.is_ok());
    }
}
