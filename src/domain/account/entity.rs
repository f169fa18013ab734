//! Account entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Account identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generate a new random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse an identifier from its string form
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| DomainError::validation(format!("Invalid account id '{}'", value)))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of an account
///
/// Token flows only ever promote `Default` to `Customer`. The remaining roles
/// are assigned by administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[default]
    Default,
    Customer,
    TravelAgent,
    Employee,
    Admin,
    Service,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::Customer => "CUSTOMER",
            Self::TravelAgent => "TRAVEL_AGENT",
            Self::Employee => "EMPLOYEE",
            Self::Admin => "ADMIN",
            Self::Service => "SERVICE",
        }
    }

    /// Only customer-level accounts may delete themselves
    pub fn is_customer_or_default(&self) -> bool {
        matches!(self, Self::Default | Self::Customer)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEFAULT" => Ok(Self::Default),
            "CUSTOMER" => Ok(Self::Customer),
            "TRAVEL_AGENT" => Ok(Self::TravelAgent),
            "EMPLOYEE" => Ok(Self::Employee),
            "ADMIN" => Ok(Self::Admin),
            "SERVICE" => Ok(Self::Service),
            other => Err(DomainError::validation(format!("Unknown role '{}'", other))),
        }
    }
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    email: String,
    /// Never exposed in serialization
    #[serde(skip_serializing)]
    password_digest: String,
    role: UserRole,
    confirmed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new, unconfirmed account with the `Default` role
    pub fn new(email: impl Into<String>, password_digest: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            id: AccountId::generate(),
            email: email.into(),
            password_digest: password_digest.into(),
            role: UserRole::Default,
            confirmed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild an account from persisted fields
    pub fn restore(
        id: AccountId,
        email: String,
        password_digest: String,
        role: UserRole,
        confirmed: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            password_digest,
            role,
            confirmed,
            created_at,
            updated_at,
        }
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_digest(&self) -> &str {
        &self.password_digest
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Authority strings carried in bearer tokens
    pub fn authorities(&self) -> Vec<String> {
        vec![self.role.as_str().to_string()]
    }

    /// Mark the account confirmed, promoting `Default` to `Customer`
    pub fn confirm(&mut self) {
        self.confirmed = true;

        if self.role == UserRole::Default {
            self.role = UserRole::Customer;
        }

        self.touch();
    }

    pub fn set_password_digest(&mut self, digest: impl Into<String>) {
        self.password_digest = digest.into();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_defaults() {
        let account = Account::new("a@test.com", "digest");

        assert_eq!(account.email(), "a@test.com");
        assert_eq!(account.role(), UserRole::Default);
        assert!(!account.is_confirmed());
        assert_eq!(account.authorities(), vec!["DEFAULT".to_string()]);
    }

    #[test]
    fn test_confirm_promotes_default_to_customer() {
        let mut account = Account::new("a@test.com", "digest");

        account.confirm();

        assert!(account.is_confirmed());
        assert_eq!(account.role(), UserRole::Customer);
    }

    #[test]
    fn test_confirm_keeps_elevated_role() {
        let mut account = Account::new("staff@test.com", "digest").with_role(UserRole::Employee);

        account.confirm();

        assert!(account.is_confirmed());
        assert_eq!(account.role(), UserRole::Employee);
    }

    #[test]
    fn test_role_round_trip_through_str() {
        for role in [
            UserRole::Default,
            UserRole::Customer,
            UserRole::TravelAgent,
            UserRole::Employee,
            UserRole::Admin,
            UserRole::Service,
        ] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }

        assert!("ROOT".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_customer_or_default() {
        assert!(UserRole::Default.is_customer_or_default());
        assert!(UserRole::Customer.is_customer_or_default());
        assert!(!UserRole::Admin.is_customer_or_default());
        assert!(!UserRole::TravelAgent.is_customer_or_default());
    }

    #[test]
    fn test_serialization_excludes_password_digest() {
        let account = Account::new("a@test.com", "secret-digest");

        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("secret-digest"));
        assert!(!json.contains("password_digest"));
        assert!(json.contains("\"role\":\"DEFAULT\""));
    }

    #[test]
    fn test_account_id_parse() {
        let id = AccountId::generate();
        assert_eq!(AccountId::parse(&id.to_string()).unwrap(), id);
        assert!(AccountId::parse("not-a-uuid").is_err());
    }
}
