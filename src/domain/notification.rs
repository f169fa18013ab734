//! Outbound account notifications

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::action_token::{AccountAction, ActionTokenId};
use crate::domain::DomainError;

/// Delivers action token links to account owners
///
/// Any delivery failure is reported as `DomainError::NotificationFailed`.
#[async_trait]
pub trait NotificationSender: Send + Sync + Debug {
    async fn send_confirmation_email(
        &self,
        recipient: &str,
        token_id: &ActionTokenId,
    ) -> Result<(), DomainError>;

    async fn send_password_reset_email(
        &self,
        recipient: &str,
        token_id: &ActionTokenId,
    ) -> Result<(), DomainError>;

    async fn send_deletion_email(
        &self,
        recipient: &str,
        token_id: &ActionTokenId,
    ) -> Result<(), DomainError>;

    /// Dispatch on the token action
    async fn send_for_action(
        &self,
        action: AccountAction,
        recipient: &str,
        token_id: &ActionTokenId,
    ) -> Result<(), DomainError> {
        match action {
            AccountAction::Confirmation => self.send_confirmation_email(recipient, token_id).await,
            AccountAction::PasswordReset => {
                self.send_password_reset_email(recipient, token_id).await
            }
            AccountAction::Deletion => self.send_deletion_email(recipient, token_id).await,
        }
    }
}
