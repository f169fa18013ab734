//! Action token repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{ActionToken, ActionTokenId};
use crate::domain::account::AccountId;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Persistence for account action tokens
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ActionTokenRepository: Send + Sync + Debug {
    async fn insert(&self, token: ActionToken) -> Result<ActionToken, DomainError>;

    async fn find_by_id(&self, id: &ActionTokenId) -> Result<Option<ActionToken>, DomainError>;

    /// Persist a changed token, `NotFound` if it does not exist
    async fn update(&self, token: &ActionToken) -> Result<ActionToken, DomainError>;

    /// Remove a token, returning whether a record was removed
    async fn delete(&self, id: &ActionTokenId) -> Result<bool, DomainError>;

    /// Remove every token owned by an account, returning how many were removed
    async fn delete_by_owner(&self, owner: &AccountId) -> Result<usize, DomainError>;
}
