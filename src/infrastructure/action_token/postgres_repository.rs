//! PostgreSQL action token repository

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::account::AccountId;
use crate::domain::action_token::{AccountAction, ActionToken, ActionTokenId, ActionTokenRepository};
use crate::domain::DomainError;

/// PostgreSQL implementation of ActionTokenRepository
#[derive(Debug, Clone)]
pub struct PostgresActionTokenRepository {
    pool: PgPool,
}

impl PostgresActionTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActionTokenRepository for PostgresActionTokenRepository {
    async fn insert(&self, token: ActionToken) -> Result<ActionToken, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO account_action_tokens (id, owner_account_id, action, created_at, active)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(token.id().as_uuid())
        .bind(token.owner_account_id().as_uuid())
        .bind(token.action().as_str())
        .bind(token.created_at())
        .bind(token.is_active())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to insert action token: {}", e)))?;

        Ok(token)
    }

    async fn find_by_id(&self, id: &ActionTokenId) -> Result<Option<ActionToken>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_account_id, action, created_at, active
            FROM account_action_tokens
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get action token: {}", e)))?;

        row.map(|row| row_to_token(&row)).transpose()
    }

    async fn update(&self, token: &ActionToken) -> Result<ActionToken, DomainError> {
        let result = sqlx::query("UPDATE account_action_tokens SET active = $2 WHERE id = $1")
            .bind(token.id().as_uuid())
            .bind(token.is_active())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to update action token: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Action token not found"));
        }

        Ok(token.clone())
    }

    async fn delete(&self, id: &ActionTokenId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM account_action_tokens WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete action token: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_owner(&self, owner: &AccountId) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM account_action_tokens WHERE owner_account_id = $1")
            .bind(owner.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete action tokens: {}", e)))?;

        Ok(result.rows_affected() as usize)
    }
}

fn row_to_token(row: &sqlx::postgres::PgRow) -> Result<ActionToken, DomainError> {
    let id: uuid::Uuid = row.get("id");
    let owner: uuid::Uuid = row.get("owner_account_id");
    let action: String = row.get("action");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
    let active: bool = row.get("active");

    let action: AccountAction = action
        .parse()
        .map_err(|e| DomainError::storage(format!("Invalid action in database: {}", e)))?;

    Ok(ActionToken::restore(
        ActionTokenId::from_uuid(id),
        AccountId::from_uuid(owner),
        action,
        created_at,
        active,
    ))
}
