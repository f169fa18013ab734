use thiserror::Error;

/// Core domain errors
///
/// Every failure in the account and token flows is reported through one of
/// these variants so callers can match on the kind instead of parsing messages.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// The token exists but is inactive, expired, or used for the wrong action
    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    #[error("Token expired")]
    TokenExpired,

    /// Bearer token failed signature, structure, issuer or algorithm checks
    #[error("Token invalid: {message}")]
    TokenInvalid { message: String },

    #[error("Bad credentials")]
    BadCredentials,

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Duplicate email, account already exists: {email}")]
    DuplicateEmail { email: String },

    #[error("Account '{account_id}' is not eligible for customer account deletion")]
    IllegalCustomerAccountDeletion { account_id: String },

    #[error("Notification failed: {message}")]
    NotificationFailed { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    pub fn token_invalid(message: impl Into<String>) -> Self {
        Self::TokenInvalid {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }

    pub fn illegal_deletion(account_id: impl ToString) -> Self {
        Self::IllegalCustomerAccountDeletion {
            account_id: account_id.to_string(),
        }
    }

    pub fn notification_failed(message: impl Into<String>) -> Self {
        Self::NotificationFailed {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for the token-usability failures (action or bearer token)
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken { .. } | Self::TokenExpired | Self::TokenInvalid { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Action token not found");
        assert_eq!(error.to_string(), "Not found: Action token not found");
    }

    #[test]
    fn test_invalid_token_error() {
        let error = DomainError::invalid_token("token is expired");
        assert_eq!(error.to_string(), "Invalid token: token is expired");
        assert!(error.is_token_error());
    }

    #[test]
    fn test_duplicate_email_error() {
        let error = DomainError::duplicate_email("a@test.com");
        assert_eq!(
            error.to_string(),
            "Duplicate email, account already exists: a@test.com"
        );
        assert!(!error.is_token_error());
    }

    #[test]
    fn test_not_found_is_not_token_error() {
        assert!(!DomainError::not_found("x").is_token_error());
        assert!(DomainError::TokenExpired.is_token_error());
    }
}
