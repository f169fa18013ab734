//! Account infrastructure module
//!
//! Password hashing with Argon2, in-memory and PostgreSQL account stores, and
//! the account lifecycle service.

mod password;
mod postgres_repository;
mod repository;
mod service;

pub use password::{Argon2Hasher, PasswordHasher};
pub use postgres_repository::PostgresAccountRepository;
pub use repository::InMemoryAccountRepository;
pub use service::AccountService;

#[cfg(test)]
pub use password::mock::PlainTextHasher;
