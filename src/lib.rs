//! Utopia Auth
//!
//! Account lifecycle and bearer authentication service:
//! - Signup with emailed confirmation links
//! - Password reset and self-service deletion through single-use action tokens
//! - HS512 JWT login and a gate for protected routes
//! - In-memory or PostgreSQL storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::{AccountServiceTrait, AppState};
use config::{EmailConfig, StorageBackend};
use domain::account::{AccountRepository, UserRole};
use domain::action_token::ActionTokenRepository;
use domain::{Clock, NotificationSender, SystemClock};
use infrastructure::{
    account::{
        AccountService, Argon2Hasher, InMemoryAccountRepository, PasswordHasher,
        PostgresAccountRepository,
    },
    action_token::{ActionTokenService, InMemoryActionTokenRepository, PostgresActionTokenRepository},
    auth::{JwtConfig, JwtGenerator, JwtService},
    notification::{HttpNotificationSender, LogNotificationSender},
    storage::{connect_pool, run_migrations},
};
use rand::Rng;
use tracing::{info, warn};

const DEFAULT_ADMIN_EMAIL: &str = "admin@utopia.local";

/// Create the application state for the configured storage backend
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let notifier = create_notifier(&config.email)?;
    let jwt_service: Arc<dyn JwtGenerator> = Arc::new(JwtService::new(
        JwtConfig::from(&config.auth),
        clock.clone(),
    ));

    let account_service = match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            build_account_service(
                Arc::new(InMemoryAccountRepository::new()),
                Arc::new(InMemoryActionTokenRepository::new()),
                config,
                clock,
                notifier,
            )
            .await?
        }
        StorageBackend::Postgres => {
            info!("Using PostgreSQL storage");
            let pool = connect_pool(&config.storage).await?;
            run_migrations(&pool).await?;

            build_account_service(
                Arc::new(PostgresAccountRepository::new(pool.clone())),
                Arc::new(PostgresActionTokenRepository::new(pool)),
                config,
                clock,
                notifier,
            )
            .await?
        }
    };

    Ok(AppState::new(account_service, jwt_service))
}

async fn build_account_service<A, T>(
    accounts: Arc<A>,
    tokens: Arc<T>,
    config: &AppConfig,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn NotificationSender>,
) -> anyhow::Result<Arc<dyn AccountServiceTrait>>
where
    A: AccountRepository + 'static,
    T: ActionTokenRepository + 'static,
{
    let token_service = Arc::new(ActionTokenService::new(
        tokens,
        config.token_ttl.clone(),
        clock,
    ));

    let service = AccountService::new(
        accounts,
        token_service,
        Arc::new(Argon2Hasher::new()),
        notifier,
    );

    bootstrap_admin(&service).await?;

    Ok(Arc::new(service))
}

/// HTTP delivery when an endpoint is configured, log output otherwise
fn create_notifier(config: &EmailConfig) -> anyhow::Result<Arc<dyn NotificationSender>> {
    match config.endpoint.as_deref().map(str::trim) {
        Some(endpoint) if !endpoint.is_empty() => {
            info!(endpoint, "Sending account emails over HTTP");
            Ok(Arc::new(HttpNotificationSender::new(endpoint, config.clone())?))
        }
        _ => {
            warn!("No email endpoint configured; account links will only be logged");
            Ok(Arc::new(LogNotificationSender::new(config.clone())))
        }
    }
}

/// Generate a random password that satisfies the password policy
fn generate_random_password() -> String {
    use rand::distributions::Alphanumeric;

    let random: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(20)
        .map(char::from)
        .collect();

    format!("{}Aa1!", random)
}

/// Create an initial ADMIN account if no accounts exist
async fn bootstrap_admin<A, T, H>(service: &AccountService<A, T, H>) -> anyhow::Result<()>
where
    A: AccountRepository,
    T: ActionTokenRepository,
    H: PasswordHasher,
{
    if service.count_accounts().await? > 0 {
        return Ok(());
    }

    let email = match std::env::var("ADMIN_DEFAULT_EMAIL") {
        Ok(e) if !e.trim().is_empty() => e,
        _ => DEFAULT_ADMIN_EMAIL.to_string(),
    };

    // Use ADMIN_DEFAULT_PASSWORD env var if set, otherwise generate random password
    let (password, is_default) = match std::env::var("ADMIN_DEFAULT_PASSWORD") {
        Ok(p) if !p.is_empty() => (p, true),
        _ => (generate_random_password(), false),
    };

    service
        .create_privileged_account(&email, &password, UserRole::Admin)
        .await?;

    info!("===========================================");
    info!("Initial admin account created!");
    info!("Email: {}", email);

    if is_default {
        info!("Password: (set via ADMIN_DEFAULT_PASSWORD)");
    } else {
        info!("Password: {}", password);
    }

    info!("Please change this password after first login.");
    info!("===========================================");

    Ok(())
}
