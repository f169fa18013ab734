//! Notification adapters

mod email;
mod http_sender;
mod log_sender;

pub use email::{action_link, EmailMessage};
pub use http_sender::HttpNotificationSender;
pub use log_sender::LogNotificationSender;
