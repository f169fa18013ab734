//! Account repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Account, AccountId};
use crate::domain::DomainError;

/// Repository trait for account storage
///
/// Implementations must enforce email uniqueness on `insert` and `update`,
/// reporting a collision as `DomainError::DuplicateEmail`.
#[async_trait]
pub trait AccountRepository: Send + Sync + Debug {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DomainError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError>;

    async fn insert(&self, account: Account) -> Result<Account, DomainError>;

    /// Update an existing account, `NotFound` if it does not exist
    async fn update(&self, account: &Account) -> Result<Account, DomainError>;

    /// Delete an account, returning whether a record was removed
    async fn delete(&self, id: &AccountId) -> Result<bool, DomainError>;

    async fn list(&self) -> Result<Vec<Account>, DomainError>;

    async fn count(&self) -> Result<usize, DomainError>;

    async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.find_by_email(email).await?.is_some())
    }
}
