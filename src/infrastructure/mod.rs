//! Infrastructure layer - External service implementations

pub mod account;
pub mod action_token;
pub mod auth;
pub mod logging;
pub mod notification;
pub mod observability;
pub mod storage;
