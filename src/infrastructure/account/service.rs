//! Account lifecycle service
//!
//! Orchestrates account creation, confirmation, password reset and deletion
//! on top of the action token service. Every mutation driven by a mailed link
//! goes through `get_and_validate_token` and then claims the token, so a link
//! completes at most once even when two requests race on it.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::account::{
    validate_email, validate_password, Account, AccountId, AccountRepository, UserRole,
};
use crate::domain::action_token::{AccountAction, ActionToken, ActionTokenId, ActionTokenRepository};
use crate::domain::{DomainError, NotificationSender};
use crate::infrastructure::action_token::ActionTokenService;

use super::password::PasswordHasher;

/// Account lifecycle orchestrator
#[derive(Debug)]
pub struct AccountService<A, T, H>
where
    A: AccountRepository,
    T: ActionTokenRepository,
    H: PasswordHasher,
{
    accounts: Arc<A>,
    tokens: Arc<ActionTokenService<T>>,
    hasher: Arc<H>,
    notifier: Arc<dyn NotificationSender>,
}

impl<A, T, H> AccountService<A, T, H>
where
    A: AccountRepository,
    T: ActionTokenRepository,
    H: PasswordHasher,
{
    pub fn new(
        accounts: Arc<A>,
        tokens: Arc<ActionTokenService<T>>,
        hasher: Arc<H>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            accounts,
            tokens,
            hasher,
            notifier,
        }
    }

    /// Check login credentials
    ///
    /// Unknown email and wrong password are indistinguishable.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account, DomainError> {
        let account = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or(DomainError::BadCredentials)?;

        if !self.hasher.verify(password, account.password_digest()) {
            return Err(DomainError::BadCredentials);
        }

        Ok(account)
    }

    /// Register a new unconfirmed account and mail its confirmation link
    ///
    /// If the confirmation email cannot be delivered the account and its token
    /// are removed again and `NotificationFailed` is returned.
    pub async fn create_account(&self, email: &str, password: &str) -> Result<Account, DomainError> {
        let email = email.trim();
        validate_email(email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(password).map_err(|e| DomainError::validation(e.to_string()))?;

        if self.accounts.email_exists(email).await? {
            return Err(DomainError::duplicate_email(email));
        }

        let digest = self.hasher.hash(password)?;
        let account = self.accounts.insert(Account::new(email, digest)).await?;

        let token = match self
            .tokens
            .create_token(account.id(), AccountAction::Confirmation)
            .await
        {
            Ok(token) => token,
            Err(e) => {
                self.discard_account(account.id()).await;
                return Err(e);
            }
        };

        if let Err(e) = self
            .notifier
            .send_confirmation_email(account.email(), token.id())
            .await
        {
            warn!(
                account_id = %account.id(),
                error = %e,
                "Confirmation email failed, rolling back account creation"
            );
            self.discard_token(token.id()).await;
            self.discard_account(account.id()).await;
            return Err(e);
        }

        info!(account_id = %account.id(), "Account created");
        Ok(account)
    }

    /// Issue and mail a new confirmation link for an unconfirmed account
    pub async fn resend_confirmation(&self, account_id: &AccountId) -> Result<(), DomainError> {
        let account = self.require_account(account_id).await?;

        if account.is_confirmed() {
            return Err(DomainError::validation("Account is already confirmed"));
        }

        self.issue_and_send(&account, AccountAction::Confirmation)
            .await?;

        info!(account_id = %account_id, "Confirmation email resent");
        Ok(())
    }

    /// Confirm the account owning a Confirmation token
    pub async fn confirm_account(&self, token_id: &ActionTokenId) -> Result<Account, DomainError> {
        let token = self.tokens.get_and_validate_token(token_id).await?;
        require_action(&token, AccountAction::Confirmation)?;

        let mut account = self.token_owner(&token).await?;
        self.tokens.claim_token(&token).await?;

        account.confirm();
        let account = self.accounts.update(&account).await?;

        info!(account_id = %account.id(), role = %account.role(), "Account confirmed");
        Ok(account)
    }

    /// Mail a password reset link, `NotFound` when no account has this email
    pub async fn initiate_password_reset(&self, email: &str) -> Result<(), DomainError> {
        let account = self
            .accounts
            .find_by_email(email.trim())
            .await?
            .ok_or_else(|| DomainError::not_found("Account not found"))?;

        self.issue_and_send(&account, AccountAction::PasswordReset)
            .await?;

        info!(account_id = %account.id(), "Password reset initiated");
        Ok(())
    }

    /// Check a reset link without consuming it
    pub async fn check_password_reset_token(
        &self,
        token_id: &ActionTokenId,
    ) -> Result<(), DomainError> {
        let token = self.tokens.get_and_validate_token(token_id).await?;
        require_action(&token, AccountAction::PasswordReset)
    }

    /// Replace the password of the account owning a PasswordReset token
    pub async fn complete_password_reset(
        &self,
        token_id: &ActionTokenId,
        new_password: &str,
    ) -> Result<(), DomainError> {
        validate_password(new_password).map_err(|e| DomainError::validation(e.to_string()))?;

        let token = self.tokens.get_and_validate_token(token_id).await?;
        require_action(&token, AccountAction::PasswordReset)?;

        let mut account = self.token_owner(&token).await?;
        let digest = self.hasher.hash(new_password)?;
        self.tokens.claim_token(&token).await?;

        account.set_password_digest(digest);
        self.accounts.update(&account).await?;

        info!(account_id = %account.id(), "Password reset completed");
        Ok(())
    }

    /// Re-authenticate the caller and mail a deletion link
    ///
    /// Only customer-level accounts may delete themselves.
    pub async fn initiate_deletion(
        &self,
        account_id: &AccountId,
        email: &str,
        password: &str,
    ) -> Result<(), DomainError> {
        let account = self.authenticate(email, password).await?;

        if account.id() != account_id {
            return Err(DomainError::BadCredentials);
        }

        if !account.role().is_customer_or_default() {
            return Err(DomainError::illegal_deletion(account.id()));
        }

        self.issue_and_send(&account, AccountAction::Deletion)
            .await?;

        info!(account_id = %account.id(), "Account deletion initiated");
        Ok(())
    }

    /// Delete the account owning a Deletion token
    pub async fn complete_deletion(
        &self,
        token_id: &ActionTokenId,
        email: &str,
        password: &str,
    ) -> Result<AccountId, DomainError> {
        let account = self.authenticate(email, password).await?;

        let token = self.tokens.get_and_validate_token(token_id).await?;
        require_action(&token, AccountAction::Deletion)?;

        if token.owner_account_id() != account.id() {
            return Err(DomainError::invalid_token(
                "Token does not belong to the authenticated account",
            ));
        }

        if !account.role().is_customer_or_default() {
            return Err(DomainError::illegal_deletion(account.id()));
        }

        self.tokens.claim_token(&token).await?;
        self.accounts.delete(account.id()).await?;
        self.tokens.delete_tokens_for_owner(account.id()).await?;

        info!(account_id = %account.id(), "Account deleted");
        Ok(*account.id())
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>, DomainError> {
        self.accounts.list().await
    }

    pub async fn get_account(&self, id: &AccountId) -> Result<Account, DomainError> {
        self.require_account(id).await
    }

    /// Hard delete without a token, for administrators
    pub async fn delete_account(&self, id: &AccountId) -> Result<(), DomainError> {
        if !self.accounts.delete(id).await? {
            return Err(DomainError::not_found(format!("Account '{}' not found", id)));
        }

        self.tokens.delete_tokens_for_owner(id).await?;

        info!(account_id = %id, "Account deleted by administrator");
        Ok(())
    }

    pub async fn count_accounts(&self) -> Result<usize, DomainError> {
        self.accounts.count().await
    }

    /// Create a confirmed account with an elevated role, bypassing email flows
    pub async fn create_privileged_account(
        &self,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<Account, DomainError> {
        let email = email.trim();
        validate_email(email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(password).map_err(|e| DomainError::validation(e.to_string()))?;

        let digest = self.hasher.hash(password)?;
        let mut account = Account::new(email, digest).with_role(role);
        account.confirm();

        self.accounts.insert(account).await
    }

    async fn require_account(&self, id: &AccountId) -> Result<Account, DomainError> {
        self.accounts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Account '{}' not found", id)))
    }

    /// Owner of a validated token; a token whose owner is gone is unusable
    async fn token_owner(&self, token: &ActionToken) -> Result<Account, DomainError> {
        self.accounts
            .find_by_id(token.owner_account_id())
            .await?
            .ok_or_else(|| DomainError::invalid_token("Token owner no longer exists"))
    }

    async fn issue_and_send(
        &self,
        account: &Account,
        action: AccountAction,
    ) -> Result<ActionToken, DomainError> {
        let token = self.tokens.create_token(account.id(), action).await?;

        if let Err(e) = self
            .notifier
            .send_for_action(action, account.email(), token.id())
            .await
        {
            warn!(
                account_id = %account.id(),
                action = %action,
                error = %e,
                "Notification failed, discarding token"
            );
            self.discard_token(token.id()).await;
            return Err(e);
        }

        Ok(token)
    }

    async fn discard_token(&self, id: &ActionTokenId) {
        if let Err(e) = self.tokens.delete_token(id).await {
            warn!(token_id = %id, error = %e, "Failed to discard action token");
        }
    }

    async fn discard_account(&self, id: &AccountId) {
        match self.accounts.delete(id).await {
            Ok(removed) => debug!(account_id = %id, removed, "Account discarded"),
            Err(e) => warn!(account_id = %id, error = %e, "Failed to discard account"),
        }
    }
}

fn require_action(token: &ActionToken, expected: AccountAction) -> Result<(), DomainError> {
    if token.action() != expected {
        return Err(DomainError::invalid_token(format!(
            "Token is not a {} token",
            expected
        )));
    }
    Ok(())
}
