//! Domain layer - Core business logic and entities

pub mod account;
pub mod action_token;
pub mod authorization;
pub mod clock;
pub mod error;
pub mod notification;

pub use account::{Account, AccountId, AccountRepository, UserRole};
pub use action_token::{AccountAction, ActionToken, ActionTokenId, ActionTokenRepository};
pub use authorization::{authorize, AccessDecision};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::DomainError;
pub use notification::NotificationSender;
