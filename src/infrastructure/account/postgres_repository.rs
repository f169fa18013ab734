//! PostgreSQL account repository

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::account::{Account, AccountId, AccountRepository, UserRole};
use crate::domain::DomainError;

const SELECT_COLUMNS: &str =
    "SELECT id, email, password_digest, role, confirmed, created_at, updated_at FROM accounts";

/// PostgreSQL implementation of AccountRepository
#[derive(Debug, Clone)]
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get account: {}", e)))?;

        row.map(|row| row_to_account(&row)).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query(&format!("{} WHERE lower(email) = lower($1)", SELECT_COLUMNS))
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get account by email: {}", e)))?;

        row.map(|row| row_to_account(&row)).transpose()
    }

    async fn insert(&self, account: Account) -> Result<Account, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, email, password_digest, role, confirmed, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(account.id().as_uuid())
        .bind(account.email())
        .bind(account.password_digest())
        .bind(account.role().as_str())
        .bind(account.is_confirmed())
        .bind(account.created_at())
        .bind(account.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::duplicate_email(account.email())
            } else {
                DomainError::storage(format!("Failed to create account: {}", e))
            }
        })?;

        Ok(account)
    }

    async fn update(&self, account: &Account) -> Result<Account, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET email = $2, password_digest = $3, role = $4, confirmed = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(account.id().as_uuid())
        .bind(account.email())
        .bind(account.password_digest())
        .bind(account.role().as_str())
        .bind(account.is_confirmed())
        .bind(account.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::duplicate_email(account.email())
            } else {
                DomainError::storage(format!("Failed to update account: {}", e))
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Account '{}' not found",
                account.id()
            )));
        }

        Ok(account.clone())
    }

    async fn delete(&self, id: &AccountId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete account: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<Account>, DomainError> {
        let rows = sqlx::query(&format!("{} ORDER BY created_at", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list accounts: {}", e)))?;

        rows.iter().map(row_to_account).collect()
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count accounts: {}", e)))?;

        Ok(count as usize)
    }
}

fn row_to_account(row: &sqlx::postgres::PgRow) -> Result<Account, DomainError> {
    let id: uuid::Uuid = row.get("id");
    let email: String = row.get("email");
    let password_digest: String = row.get("password_digest");
    let role: String = row.get("role");
    let confirmed: bool = row.get("confirmed");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
    let updated_at: chrono::DateTime<chrono::Utc> = row.get("updated_at");

    let role: UserRole = role
        .parse()
        .map_err(|e| DomainError::storage(format!("Invalid role in database: {}", e)))?;

    Ok(Account::restore(
        AccountId::from_uuid(id),
        email,
        password_digest,
        role,
        confirmed,
        created_at,
        updated_at,
    ))
}
