//! Account domain
//!
//! Account entity, roles, input validation and the repository trait used by
//! the lifecycle service.

mod entity;
mod repository;
mod validation;

pub use entity::{Account, AccountId, UserRole};
pub use repository::AccountRepository;
pub use validation::{validate_email, validate_password, AccountValidationError};

#[cfg(test)]
pub use repository::mock::MockAccountRepository;
