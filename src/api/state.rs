//! Application state for shared services

use std::sync::Arc;

use crate::domain::account::{Account, AccountId, AccountRepository};
use crate::domain::action_token::{ActionTokenId, ActionTokenRepository};
use crate::domain::DomainError;
use crate::infrastructure::account::{AccountService, PasswordHasher};
use crate::infrastructure::auth::JwtGenerator;

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<dyn AccountServiceTrait>,
    pub jwt_service: Arc<dyn JwtGenerator>,
}

impl AppState {
    pub fn new(
        account_service: Arc<dyn AccountServiceTrait>,
        jwt_service: Arc<dyn JwtGenerator>,
    ) -> Self {
        Self {
            account_service,
            jwt_service,
        }
    }
}

/// Trait for account lifecycle operations
#[async_trait::async_trait]
pub trait AccountServiceTrait: Send + Sync {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Account, DomainError>;
    async fn create_account(&self, email: &str, password: &str) -> Result<Account, DomainError>;
    async fn resend_confirmation(&self, account_id: &AccountId) -> Result<(), DomainError>;
    async fn confirm_account(&self, token_id: &ActionTokenId) -> Result<Account, DomainError>;
    async fn initiate_password_reset(&self, email: &str) -> Result<(), DomainError>;
    async fn check_password_reset_token(&self, token_id: &ActionTokenId)
        -> Result<(), DomainError>;
    async fn complete_password_reset(
        &self,
        token_id: &ActionTokenId,
        new_password: &str,
    ) -> Result<(), DomainError>;
    async fn initiate_deletion(
        &self,
        account_id: &AccountId,
        email: &str,
        password: &str,
    ) -> Result<(), DomainError>;
    async fn complete_deletion(
        &self,
        token_id: &ActionTokenId,
        email: &str,
        password: &str,
    ) -> Result<AccountId, DomainError>;
    async fn list_accounts(&self) -> Result<Vec<Account>, DomainError>;
    async fn get_account(&self, id: &AccountId) -> Result<Account, DomainError>;
    async fn delete_account(&self, id: &AccountId) -> Result<(), DomainError>;
    async fn count_accounts(&self) -> Result<usize, DomainError>;
}

#[async_trait::async_trait]
impl<A, T, H> AccountServiceTrait for AccountService<A, T, H>
where
    A: AccountRepository + 'static,
    T: ActionTokenRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn authenticate(&self, email: &str, password: &str) -> Result<Account, DomainError> {
        AccountService::authenticate(self, email, password).await
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<Account, DomainError> {
        AccountService::create_account(self, email, password).await
    }

    async fn resend_confirmation(&self, account_id: &AccountId) -> Result<(), DomainError> {
        AccountService::resend_confirmation(self, account_id).await
    }

    async fn confirm_account(&self, token_id: &ActionTokenId) -> Result<Account, DomainError> {
        AccountService::confirm_account(self, token_id).await
    }

    async fn initiate_password_reset(&self, email: &str) -> Result<(), DomainError> {
        AccountService::initiate_password_reset(self, email).await
    }

    async fn check_password_reset_token(
        &self,
        token_id: &ActionTokenId,
    ) -> Result<(), DomainError> {
        AccountService::check_password_reset_token(self, token_id).await
    }

    async fn complete_password_reset(
        &self,
        token_id: &ActionTokenId,
        new_password: &str,
    ) -> Result<(), DomainError> {
        AccountService::complete_password_reset(self, token_id, new_password).await
    }

    async fn initiate_deletion(
        &self,
        account_id: &AccountId,
        email: &str,
        password: &str,
    ) -> Result<(), DomainError> {
        AccountService::initiate_deletion(self, account_id, email, password).await
    }

    async fn complete_deletion(
        &self,
        token_id: &ActionTokenId,
        email: &str,
        password: &str,
    ) -> Result<AccountId, DomainError> {
        AccountService::complete_deletion(self, token_id, email, password).await
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, DomainError> {
        AccountService::list_accounts(self).await
    }

    async fn get_account(&self, id: &AccountId) -> Result<Account, DomainError> {
        AccountService::get_account(self, id).await
    }

    async fn delete_account(&self, id: &AccountId) -> Result<(), DomainError> {
        AccountService::delete_account(self, id).await
    }

    async fn count_accounts(&self) -> Result<usize, DomainError> {
        AccountService::count_accounts(self).await
    }
}
