//! Account action token entity

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::account::AccountId;
use crate::domain::DomainError;

/// Opaque action token identifier, the value mailed to the account owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionTokenId(Uuid);

impl ActionTokenId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse a token id from a link or request body
    ///
    /// A malformed id can never match a stored token, so it is reported as
    /// `NotFound` rather than as a validation failure.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| DomainError::not_found("Action token not found"))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for ActionTokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The account mutation a token authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountAction {
    PasswordReset,
    Confirmation,
    Deletion,
}

impl AccountAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PasswordReset => "PASSWORD_RESET",
            Self::Confirmation => "CONFIRMATION",
            Self::Deletion => "DELETION",
        }
    }
}

impl std::fmt::Display for AccountAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PASSWORD_RESET" => Ok(Self::PasswordReset),
            "CONFIRMATION" => Ok(Self::Confirmation),
            "DELETION" => Ok(Self::Deletion),
            other => Err(DomainError::validation(format!(
                "Unknown account action '{}'",
                other
            ))),
        }
    }
}

/// Single-use token gating a sensitive account mutation
///
/// `created_at` is fixed at creation. `active` starts true and only ever
/// transitions to false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionToken {
    id: ActionTokenId,
    owner_account_id: AccountId,
    action: AccountAction,
    created_at: DateTime<Utc>,
    active: bool,
}

impl ActionToken {
    /// Create a new active token
    pub fn new(owner_account_id: AccountId, action: AccountAction, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ActionTokenId::generate(),
            owner_account_id,
            action,
            created_at,
            active: true,
        }
    }

    /// Rebuild a token from persisted fields
    pub fn restore(
        id: ActionTokenId,
        owner_account_id: AccountId,
        action: AccountAction,
        created_at: DateTime<Utc>,
        active: bool,
    ) -> Self {
        Self {
            id,
            owner_account_id,
            action,
            created_at,
            active,
        }
    }

    pub fn id(&self) -> &ActionTokenId {
        &self.id
    }

    pub fn owner_account_id(&self) -> &AccountId {
        &self.owner_account_id
    }

    pub fn action(&self) -> AccountAction {
        self.action
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `None` when `created_at + ttl` is past the last representable instant
    pub fn expires_at(&self, ttl: Duration) -> Option<DateTime<Utc>> {
        self.created_at.checked_add_signed(ttl)
    }

    /// `active && now <= created_at + ttl`; an unrepresentable expiry is never valid
    pub fn is_valid_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.active && self.expires_at(ttl).is_some_and(|expiry| now <= expiry)
    }

    /// Mark the token as used or revoked
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}
