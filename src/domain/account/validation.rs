//! Account input validation

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Errors that can occur during account validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AccountValidationError {
    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Email '{0}' is not a valid address")]
    InvalidEmail(String),

    #[error("Password must be between 10 and 128 characters")]
    PasswordLength,

    #[error("Password must contain at least one lowercase letter")]
    PasswordMissingLowercase,

    #[error("Password must contain at least one uppercase letter")]
    PasswordMissingUppercase,

    #[error("Password must contain at least one number")]
    PasswordMissingDigit,

    #[error("Password must contain at least one special character from the following: !@#$%^&*-_=+,.?")]
    PasswordMissingSpecial,

    #[error("Password contains invalid character: '{0}'")]
    PasswordInvalidCharacter(char),
}

pub const MIN_PASSWORD_LENGTH: usize = 10;
pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*-_=+,.?";

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), AccountValidationError> {
    if email.trim().is_empty() {
        return Err(AccountValidationError::EmptyEmail);
    }

    if !EMAIL_PATTERN.is_match(email) {
        return Err(AccountValidationError::InvalidEmail(email.to_string()));
    }

    Ok(())
}

/// Validate a password against the account password policy
///
/// Rules:
/// - 10 to 128 characters
/// - at least one lowercase, one uppercase, one digit
/// - at least one special character from `!@#$%^&*-_=+,.?`
/// - no characters outside those classes
pub fn validate_password(password: &str) -> Result<(), AccountValidationError> {
    let length = password.chars().count();

    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        return Err(AccountValidationError::PasswordLength);
    }

    let mut lower = false;
    let mut upper = false;
    let mut digit = false;
    let mut special = false;

    for c in password.chars() {
        if c.is_ascii_lowercase() {
            lower = true;
        } else if c.is_ascii_uppercase() {
            upper = true;
        } else if c.is_ascii_digit() {
            digit = true;
        } else if SPECIAL_CHARACTERS.contains(c) {
            special = true;
        } else {
            return Err(AccountValidationError::PasswordInvalidCharacter(c));
        }
    }

    if !lower {
        return Err(AccountValidationError::PasswordMissingLowercase);
    }

    if !upper {
        return Err(AccountValidationError::PasswordMissingUppercase);
    }

    if !digit {
        return Err(AccountValidationError::PasswordMissingDigit);
    }

    if !special {
        return Err(AccountValidationError::PasswordMissingSpecial);
    }

    Ok(())
}
