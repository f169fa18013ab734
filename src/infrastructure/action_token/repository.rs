//! In-memory action token repository

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::account::AccountId;
use crate::domain::action_token::{ActionToken, ActionTokenId, ActionTokenRepository};
use crate::domain::DomainError;

/// In-memory implementation of ActionTokenRepository
#[derive(Debug, Default)]
pub struct InMemoryActionTokenRepository {
    tokens: Arc<RwLock<HashMap<ActionTokenId, ActionToken>>>,
}

impl InMemoryActionTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens, active or not
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl ActionTokenRepository for InMemoryActionTokenRepository {
    async fn insert(&self, token: ActionToken) -> Result<ActionToken, DomainError> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(token.id()) {
            return Err(DomainError::storage(format!(
                "Action token '{}' already exists",
                token.id()
            )));
        }

        tokens.insert(*token.id(), token.clone());
        Ok(token)
    }

    async fn find_by_id(&self, id: &ActionTokenId) -> Result<Option<ActionToken>, DomainError> {
        Ok(self.tokens.read().await.get(id).cloned())
    }

    async fn update(&self, token: &ActionToken) -> Result<ActionToken, DomainError> {
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(token.id()) {
            Some(existing) => {
                *existing = token.clone();
                Ok(token.clone())
            }
            None => Err(DomainError::not_found("Action token not found")),
        }
    }

    async fn delete(&self, id: &ActionTokenId) -> Result<bool, DomainError> {
        Ok(self.tokens.write().await.remove(id).is_some())
    }

    async fn delete_by_owner(&self, owner: &AccountId) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, token| token.owner_account_id() != owner);
        Ok(before - tokens.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::AccountId;
    use crate::domain::action_token::AccountAction;
    use chrono::Utc;

    fn token() -> ActionToken {
        ActionToken::new(AccountId::generate(), AccountAction::Confirmation, Utc::now())
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = InMemoryActionTokenRepository::new();
        let token = token();

        repo.insert(token.clone()).await.unwrap();

        let found = repo.find_by_id(token.id()).await.unwrap();
        assert_eq!(found, Some(token));
    }

    #[tokio::test]
    async fn test_find_missing() {
        let repo = InMemoryActionTokenRepository::new();
        let found = repo.find_by_id(&ActionTokenId::generate()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_update_persists_deactivation() {
        let repo = InMemoryActionTokenRepository::new();
        let mut token = token();
        repo.insert(token.clone()).await.unwrap();

        token.deactivate();
        repo.update(&token).await.unwrap();

        let stored = repo.find_by_id(token.id()).await.unwrap().unwrap();
        assert!(!stored.is_active());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = InMemoryActionTokenRepository::new();
        let result = repo.update(&token()).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_reports_removal() {
        let repo = InMemoryActionTokenRepository::new();
        let token = token();
        repo.insert(token.clone()).await.unwrap();

        assert!(repo.delete(token.id()).await.unwrap());
        assert!(!repo.delete(token.id()).await.unwrap());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_by_owner_leaves_other_owners() {
        let repo = InMemoryActionTokenRepository::new();
        let owner = AccountId::generate();
        let other = token();

        repo.insert(ActionToken::new(owner, AccountAction::Confirmation, Utc::now()))
            .await
            .unwrap();
        repo.insert(ActionToken::new(owner, AccountAction::Deletion, Utc::now()))
            .await
            .unwrap();
        repo.insert(other.clone()).await.unwrap();

        assert_eq!(repo.delete_by_owner(&owner).await.unwrap(), 2);
        assert_eq!(repo.delete_by_owner(&owner).await.unwrap(), 0);
        assert_eq!(repo.len().await, 1);
        assert!(repo.find_by_id(other.id()).await.unwrap().is_some());
    }
}
