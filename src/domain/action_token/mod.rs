//! Account action token domain

mod entity;
mod repository;

pub use entity::{AccountAction, ActionToken, ActionTokenId};
pub use repository::ActionTokenRepository;

#[cfg(test)]
pub use repository::MockActionTokenRepository;
