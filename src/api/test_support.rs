//! In-memory application wiring for handler and router tests

use std::sync::Arc;

use chrono::Duration;

use crate::config::TokenTtlConfig;
use crate::domain::account::{Account, UserRole};
use crate::domain::notification::mock::RecordingNotificationSender;
use crate::domain::ManualClock;
use crate::infrastructure::account::{AccountService, InMemoryAccountRepository, PlainTextHasher};
use crate::infrastructure::action_token::{ActionTokenService, InMemoryActionTokenRepository};
use crate::infrastructure::auth::{JwtConfig, JwtGenerator, JwtService};

use super::state::AppState;

pub const PASSWORD: &str = "Abcd1234!@";
const SECRET: &str = "router-test-secret-that-is-at-least-sixty-four-bytes-long-0123456789";

type TestAccountService =
    AccountService<InMemoryAccountRepository, InMemoryActionTokenRepository, PlainTextHasher>;

pub struct TestApp {
    pub state: AppState,
    pub service: Arc<TestAccountService>,
    pub notifier: RecordingNotificationSender,
    pub clock: ManualClock,
    pub tokens: Arc<InMemoryActionTokenRepository>,
}

impl TestApp {
    pub fn new() -> Self {
        let clock = ManualClock::starting_now();
        let notifier = RecordingNotificationSender::new();
        let tokens = Arc::new(InMemoryActionTokenRepository::new());
        let token_service = Arc::new(ActionTokenService::new(
            tokens.clone(),
            TokenTtlConfig::default(),
            Arc::new(clock.clone()),
        ));

        let service = Arc::new(AccountService::new(
            Arc::new(InMemoryAccountRepository::new()),
            token_service,
            Arc::new(PlainTextHasher),
            Arc::new(notifier.clone()),
        ));

        let jwt = JwtService::new(
            JwtConfig::new(SECRET, "utopia", Duration::days(1)),
            Arc::new(clock.clone()),
        );

        let state = AppState::new(service.clone(), Arc::new(jwt));

        Self {
            state,
            service,
            notifier,
            clock,
            tokens,
        }
    }

    /// Confirmed CUSTOMER account with [`PASSWORD`]
    pub async fn customer(&self, email: &str) -> Account {
        self.privileged(email, UserRole::Customer).await
    }

    pub async fn privileged(&self, email: &str, role: UserRole) -> Account {
        self.service
            .create_privileged_account(email, PASSWORD, role)
            .await
            .unwrap()
    }

    /// Full `Authorization` header value for an account
    pub fn bearer_for(&self, account: &Account) -> String {
        let issued = self.state.jwt_service.issue_for_account(account).unwrap();
        format!("{}{}", self.state.jwt_service.header_prefix(), issued.token)
    }
}
