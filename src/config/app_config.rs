use serde::Deserialize;
use tracing::warn;

use super::token_ttl::{deserialize_positive_int, TokenTtlConfig};

/// Minimum recommended HS512 secret length in bytes
const RECOMMENDED_SECRET_BYTES: usize = 64;

/// Longest accepted bearer token lifetime, one year
pub const MAX_JWT_EXPIRATION_MS: i64 = 31_536_000_000;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub token_ttl: TokenTtlConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Bearer authentication settings
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Login path
    pub endpoint: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_header_name: String,
    pub jwt_header_prefix: String,
    #[serde(deserialize_with = "deserialize_positive_int")]
    pub jwt_expiration_ms: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("endpoint", &self.endpoint)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_header_name", &self.jwt_header_name)
            .field("jwt_header_prefix", &self.jwt_header_prefix)
            .field("jwt_expiration_ms", &self.jwt_expiration_ms)
            .finish()
    }
}

/// Email delivery settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Delivery endpoint; notifications are only logged when unset
    pub endpoint: Option<String>,
    pub confirmation_base_url: String,
    pub password_reset_base_url: String,
    pub deletion_base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            endpoint: "/authenticate".to_string(),
            jwt_secret: String::new(),
            jwt_issuer: "utopia".to_string(),
            jwt_header_name: "Authorization".to_string(),
            jwt_header_prefix: "Bearer ".to_string(),
            jwt_expiration_ms: 86_400_000,
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            confirmation_base_url: "http://localhost:4200/accounts/confirm".to_string(),
            password_reset_base_url: "http://localhost:4200/accounts/new-password".to_string(),
            deletion_base_url: "http://localhost:4200/accounts/deletion".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: 5,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "auth.jwt_secret must be set".to_string(),
            ));
        }

        if self.auth.jwt_secret.len() < RECOMMENDED_SECRET_BYTES {
            warn!(
                secret_bytes = self.auth.jwt_secret.len(),
                recommended = RECOMMENDED_SECRET_BYTES,
                "auth.jwt_secret is shorter than recommended for HS512"
            );
        }

        if self.auth.jwt_expiration_ms <= 0 {
            return Err(config::ConfigError::Message(
                "auth.jwt_expiration_ms must be greater than zero".to_string(),
            ));
        }

        if self.auth.jwt_expiration_ms > MAX_JWT_EXPIRATION_MS {
            return Err(config::ConfigError::Message(format!(
                "auth.jwt_expiration_ms must be at most {}",
                MAX_JWT_EXPIRATION_MS
            )));
        }

        if !self.auth.endpoint.starts_with('/') {
            return Err(config::ConfigError::Message(
                "auth.endpoint must start with '/'".to_string(),
            ));
        }

        if axum::http::HeaderName::from_bytes(self.auth.jwt_header_name.as_bytes()).is_err() {
            return Err(config::ConfigError::Message(format!(
                "auth.jwt_header_name '{}' is not a valid header name",
                self.auth.jwt_header_name
            )));
        }

        if !self.auth.jwt_header_prefix.ends_with(' ') {
            warn!(
                prefix = %self.auth.jwt_header_prefix,
                "auth.jwt_header_prefix does not end with a space"
            );
        }

        self.token_ttl
            .validate()
            .map_err(config::ConfigError::Message)?;

        if self.storage.backend == StorageBackend::Postgres && self.storage.database_url.is_none() {
            return Err(config::ConfigError::Message(
                "storage.database_url is required for the postgres backend".to_string(),
            ));
        }

        Ok(())
    }
}
