//! Tolerant parsing of duration settings
//!
//! Durations may be written as integers or as strings such as `"86_400_000"`
//! or `" 10 "`. Underscores are stripped, surrounding whitespace is trimmed and
//! the result must be a positive integer.

use chrono::Duration;
use serde::{Deserialize, Deserializer};

use crate::domain::action_token::AccountAction;

/// Parse a positive integer setting
pub fn parse_positive_int(raw: &str) -> Result<i64, String> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != '_').collect();

    let value: i64 = cleaned
        .parse()
        .map_err(|_| format!("'{}' is not an integer", raw))?;

    if value <= 0 {
        return Err(format!("'{}' must be greater than zero", raw));
    }

    Ok(value)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInt {
    Int(i64),
    Text(String),
}

/// Serde adapter for [`parse_positive_int`]
pub fn deserialize_positive_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawInt::deserialize(deserializer)? {
        RawInt::Int(value) if value > 0 => Ok(value),
        RawInt::Int(value) => Err(serde::de::Error::custom(format!(
            "'{}' must be greater than zero",
            value
        ))),
        RawInt::Text(text) => parse_positive_int(&text).map_err(serde::de::Error::custom),
    }
}

/// Longest accepted token lifetime, one year
pub const MAX_TTL_MINUTES: i64 = 525_600;

/// Per-action token lifetimes, in minutes
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokenTtlConfig {
    #[serde(deserialize_with = "deserialize_positive_int")]
    pub password_reset_minutes: i64,
    #[serde(deserialize_with = "deserialize_positive_int")]
    pub confirmation_minutes: i64,
    #[serde(deserialize_with = "deserialize_positive_int")]
    pub deletion_minutes: i64,
}

impl Default for TokenTtlConfig {
    fn default() -> Self {
        Self {
            password_reset_minutes: 10,
            confirmation_minutes: 60,
            deletion_minutes: 60,
        }
    }
}

impl TokenTtlConfig {
    pub fn ttl_for(&self, action: AccountAction) -> Duration {
        let minutes = match action {
            AccountAction::PasswordReset => self.password_reset_minutes,
            AccountAction::Confirmation => self.confirmation_minutes,
            AccountAction::Deletion => self.deletion_minutes,
        };
        Duration::try_minutes(minutes).unwrap_or(Duration::MAX)
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("password_reset_minutes", self.password_reset_minutes),
            ("confirmation_minutes", self.confirmation_minutes),
            ("deletion_minutes", self.deletion_minutes),
        ] {
            if value <= 0 {
                return Err(format!("token_ttl.{} must be greater than zero", name));
            }
            if value > MAX_TTL_MINUTES {
                return Err(format!(
                    "token_ttl.{} must be at most {} minutes",
                    name, MAX_TTL_MINUTES
                ));
            }
        }
        Ok(())
    }
}
