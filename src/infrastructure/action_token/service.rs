//! Action token lifecycle service

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::TokenTtlConfig;
use crate::domain::account::AccountId;
use crate::domain::action_token::{AccountAction, ActionToken, ActionTokenId, ActionTokenRepository};
use crate::domain::{Clock, DomainError};
use crate::infrastructure::observability::{record_action_token_consumed, record_action_token_issued};

/// Creates, validates and consumes account action tokens
///
/// Validity is `active && now <= created_at + ttl(action)`, evaluated against
/// the injected clock on every call. Nothing sweeps expired tokens.
#[derive(Debug)]
pub struct ActionTokenService<R: ActionTokenRepository> {
    repository: Arc<R>,
    ttl: TokenTtlConfig,
    clock: Arc<dyn Clock>,
}

impl<R: ActionTokenRepository> ActionTokenService<R> {
    pub fn new(repository: Arc<R>, ttl: TokenTtlConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            ttl,
            clock,
        }
    }

    /// Issue a fresh active token for the owner
    ///
    /// Earlier tokens for the same owner and action stay valid.
    pub async fn create_token(
        &self,
        owner: &AccountId,
        action: AccountAction,
    ) -> Result<ActionToken, DomainError> {
        let token = ActionToken::new(*owner, action, self.clock.now());
        let token = self.repository.insert(token).await?;

        record_action_token_issued(action);
        info!(
            token_id = %token.id(),
            owner = %owner,
            action = %action,
            "Action token issued"
        );

        Ok(token)
    }

    pub async fn get_token(&self, id: &ActionTokenId) -> Result<ActionToken, DomainError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Action token not found"))
    }

    /// Check that a token is active and inside its lifetime
    pub fn validate_token(&self, token: &ActionToken) -> Result<(), DomainError> {
        if !token.is_active() {
            return Err(DomainError::invalid_token("Token is no longer active"));
        }

        let ttl = self.ttl.ttl_for(token.action());
        if !token.is_valid_at(self.clock.now(), ttl) {
            return Err(DomainError::invalid_token("Token is expired"));
        }

        Ok(())
    }

    /// Fetch a token and check it is usable
    pub async fn get_and_validate_token(
        &self,
        id: &ActionTokenId,
    ) -> Result<ActionToken, DomainError> {
        let token = self.get_token(id).await?;
        self.validate_token(&token)?;
        Ok(token)
    }

    /// Remove a token; removing a missing token succeeds
    pub async fn delete_token(&self, id: &ActionTokenId) -> Result<(), DomainError> {
        let removed = self.repository.delete(id).await?;
        debug!(token_id = %id, removed, "Action token deleted");
        Ok(())
    }

    /// Deactivate a token while keeping its record
    pub async fn revoke_token(&self, id: &ActionTokenId) -> Result<ActionToken, DomainError> {
        let mut token = self.get_token(id).await?;

        if !token.is_active() {
            return Ok(token);
        }

        token.deactivate();
        let token = self.repository.update(&token).await?;

        info!(token_id = %id, action = %token.action(), "Action token revoked");
        Ok(token)
    }

    /// Take a validated token out of the store before acting on it
    ///
    /// Only one caller can remove a given token; the others get `InvalidToken`.
    pub async fn claim_token(&self, token: &ActionToken) -> Result<(), DomainError> {
        if !self.repository.delete(token.id()).await? {
            debug!(token_id = %token.id(), "Action token already claimed");
            return Err(DomainError::invalid_token("Token was already used"));
        }

        record_action_token_consumed(token.action());
        info!(token_id = %token.id(), action = %token.action(), "Action token consumed");
        Ok(())
    }

    /// Remove every token issued to an account
    pub async fn delete_tokens_for_owner(&self, owner: &AccountId) -> Result<usize, DomainError> {
        let removed = self.repository.delete_by_owner(owner).await?;
        debug!(owner = %owner, removed, "Action tokens of account deleted");
        Ok(removed)
    }
}
