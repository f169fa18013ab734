//! Action token infrastructure
//!
//! Storage adapters and the lifecycle service for account action tokens.

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresActionTokenRepository;
pub use repository::InMemoryActionTokenRepository;
pub use service::ActionTokenService;
