//! Application configuration

mod app_config;
mod token_ttl;

pub use app_config::{
    AppConfig, AuthConfig, EmailConfig, LogFormat, LoggingConfig, MetricsConfig, ServerConfig,
    StorageBackend, StorageConfig,
};
pub use token_ttl::{deserialize_positive_int, parse_positive_int, TokenTtlConfig};
