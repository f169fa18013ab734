//! In-memory account repository

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::account::{Account, AccountId, AccountRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Accounts {
    by_id: HashMap<AccountId, Account>,
    /// Lower-cased email -> id
    email_index: HashMap<String, AccountId>,
}

/// In-memory implementation of AccountRepository
///
/// Emails are unique case-insensitively.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    inner: Arc<RwLock<Accounts>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        Ok(self.inner.read().await.by_id.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let inner = self.inner.read().await;

        Ok(inner
            .email_index
            .get(&email_key(email))
            .and_then(|id| inner.by_id.get(id))
            .cloned())
    }

    async fn insert(&self, account: Account) -> Result<Account, DomainError> {
        let mut inner = self.inner.write().await;
        let key = email_key(account.email());

        if inner.email_index.contains_key(&key) {
            return Err(DomainError::duplicate_email(account.email()));
        }

        if inner.by_id.contains_key(account.id()) {
            return Err(DomainError::storage(format!(
                "Account '{}' already exists",
                account.id()
            )));
        }

        inner.email_index.insert(key, *account.id());
        inner.by_id.insert(*account.id(), account.clone());

        Ok(account)
    }

    async fn update(&self, account: &Account) -> Result<Account, DomainError> {
        let mut inner = self.inner.write().await;

        let old_key = match inner.by_id.get(account.id()) {
            Some(existing) => email_key(existing.email()),
            None => {
                return Err(DomainError::not_found(format!(
                    "Account '{}' not found",
                    account.id()
                )))
            }
        };

        let new_key = email_key(account.email());

        if old_key != new_key {
            if inner.email_index.contains_key(&new_key) {
                return Err(DomainError::duplicate_email(account.email()));
            }
            inner.email_index.remove(&old_key);
            inner.email_index.insert(new_key, *account.id());
        }

        inner.by_id.insert(*account.id(), account.clone());
        Ok(account.clone())
    }

    async fn delete(&self, id: &AccountId) -> Result<bool, DomainError> {
        let mut inner = self.inner.write().await;

        match inner.by_id.remove(id) {
            Some(account) => {
                inner.email_index.remove(&email_key(account.email()));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self) -> Result<Vec<Account>, DomainError> {
        let mut accounts: Vec<Account> = self.inner.read().await.by_id.values().cloned().collect();
        accounts.sort_by_key(|a| a.created_at());
        Ok(accounts)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.inner.read().await.by_id.len())
    }
}
