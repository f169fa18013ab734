//! Credential digests using Argon2

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Argon2,
};
use std::fmt::Debug;

use crate::domain::DomainError;

/// One-way password digest capability
pub trait PasswordHasher: Send + Sync + Debug {
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Compare a plaintext against a stored digest; malformed digests never match
    fn verify(&self, password: &str, digest: &str) -> bool;
}

/// Argon2id hasher with a random salt per digest
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Reversible stand-in so tests do not pay for Argon2
    #[derive(Debug, Default, Clone)]
    pub struct PlainTextHasher;

    impl PasswordHasher for PlainTextHasher {
        fn hash(&self, password: &str) -> Result<String, DomainError> {
            Ok(format!("plain:{}", password))
        }

        fn verify(&self, password: &str, digest: &str) -> bool {
            digest == format!("plain:{}", password)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2Hasher::new();
        let digest = hasher.hash("Abcd1234!@").unwrap();

        assert!(hasher.verify("Abcd1234!@", &digest));
        assert!(!hasher.verify("Abcd1234!#", &digest));
    }

    #[test]
    fn test_digest_is_salted() {
        let hasher = Argon2Hasher::new();

        let first = hasher.hash("Abcd1234!@").unwrap();
        let second = hasher.hash("Abcd1234!@").unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("$argon2"));
    }

    #[test]
    fn test_malformed_digest_never_matches() {
        let hasher = Argon2Hasher::new();

        assert!(!hasher.verify("Abcd1234!@", "not-a-digest"));
        assert!(!hasher.verify("", ""));
    }
}
