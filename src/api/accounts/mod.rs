//! Account lifecycle endpoints
//!
//! Public routes start the flows that end in a mailed link; the link's token
//! is then presented back here to finish them. Authenticated routes act on
//! the caller's own account and staff routes on any account.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

use crate::api::middleware::{authenticate, require_staff, Authenticated, STAFF_ROLES};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, ValidatedJson};
use crate::domain::account::{Account, AccountId};
use crate::domain::action_token::ActionTokenId;
use crate::domain::DomainError;

pub const ACCOUNTS_PATH: &str = "/api/v0.1/accounts";

/// Create the accounts router, to be nested at [`ACCOUNTS_PATH`]
pub fn create_accounts_router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", post(create_account))
        .route("/confirm/{token}", put(confirm_account))
        .route("/password-reset", post(initiate_password_reset))
        .route("/new-password/{token}", get(check_password_reset_token))
        .route("/new-password", post(complete_password_reset));

    let staff = Router::new()
        .route("/", get(list_accounts))
        .route("/{id}", delete(delete_account))
        .route_layer(middleware::from_fn(require_staff));

    let authenticated = Router::new()
        .route("/confirm/resend", post(resend_confirmation))
        .route(
            "/deletion",
            post(initiate_deletion).delete(complete_deletion),
        )
        .route("/{id}", get(get_account))
        .merge(staff)
        .route_layer(middleware::from_fn_with_state(state, authenticate));

    public.merge(authenticated)
}

// ============================================================================
// Request / response types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    #[validate(email(message = "must be a well-formed email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AccountCreatedResponse {
    pub id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email(message = "must be a well-formed email address"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewPasswordRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub token: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

/// Credentials re-entered to start a deletion
#[derive(Debug, Deserialize, Validate)]
pub struct DeletionRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DeletionConfirmationRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub token: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

/// Account as exposed over HTTP; the password digest never leaves the service
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub role: String,
    pub confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id().to_string(),
            email: account.email().to_string(),
            role: account.role().to_string(),
            confirmed: account.is_confirmed(),
            created_at: account.created_at(),
            updated_at: account.updated_at(),
        }
    }
}

// ============================================================================
// Public handlers
// ============================================================================

/// POST /api/v0.1/accounts
pub async fn create_account(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateAccountRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AccountCreatedResponse>), ApiError> {
    let account = state
        .account_service
        .create_account(&request.email, &request.password)
        .await?;

    let id = account.id().to_string();
    let location = HeaderValue::from_str(&format!("{}/{}", ACCOUNTS_PATH, id))
        .map_err(|_| ApiError::internal("Internal server error"))?;

    let mut headers = HeaderMap::new();
    headers.insert(header::LOCATION, location);

    Ok((StatusCode::CREATED, headers, Json(AccountCreatedResponse { id })))
}

/// PUT /api/v0.1/accounts/confirm/{token}
pub async fn confirm_account(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<StatusCode, ApiError> {
    let token_id = ActionTokenId::parse(&token)?;
    state.account_service.confirm_account(&token_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v0.1/accounts/password-reset
///
/// Answers 202 for unknown addresses too, so the endpoint cannot be used to
/// probe which emails have accounts.
pub async fn initiate_password_reset(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<PasswordResetRequest>,
) -> Result<StatusCode, ApiError> {
    match state
        .account_service
        .initiate_password_reset(&request.email)
        .await
    {
        Ok(()) => Ok(StatusCode::ACCEPTED),
        Err(DomainError::NotFound { .. }) => {
            debug!("Password reset requested for unknown email");
            Ok(StatusCode::ACCEPTED)
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /api/v0.1/accounts/new-password/{token}
pub async fn check_password_reset_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<StatusCode, ApiError> {
    let token_id = ActionTokenId::parse(&token)?;
    state
        .account_service
        .check_password_reset_token(&token_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v0.1/accounts/new-password
pub async fn complete_password_reset(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<NewPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let token_id = ActionTokenId::parse(&request.token)?;
    state
        .account_service
        .complete_password_reset(&token_id, &request.password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Authenticated handlers
// ============================================================================

/// POST /api/v0.1/accounts/confirm/resend
pub async fn resend_confirmation(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
) -> Result<StatusCode, ApiError> {
    state
        .account_service
        .resend_confirmation(&principal.user_id)
        .await?;

    Ok(StatusCode::ACCEPTED)
}

/// POST /api/v0.1/accounts/deletion
pub async fn initiate_deletion(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ValidatedJson(request): ValidatedJson<DeletionRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .account_service
        .initiate_deletion(&principal.user_id, &request.email, &request.password)
        .await?;

    Ok(StatusCode::ACCEPTED)
}

/// DELETE /api/v0.1/accounts/deletion
pub async fn complete_deletion(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ValidatedJson(request): ValidatedJson<DeletionConfirmationRequest>,
) -> Result<StatusCode, ApiError> {
    let token_id = ActionTokenId::parse(&request.token)?;
    let deleted = state
        .account_service
        .complete_deletion(&token_id, &request.email, &request.password)
        .await?;

    info!(account_id = %deleted, caller = %principal.user_id, "Account deleted by owner");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v0.1/accounts/{id}
///
/// Staff may read any account, everyone else only their own.
pub async fn get_account(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let id = AccountId::parse(&id)?;

    if principal.user_id != id && !principal.is_allowed(STAFF_ROLES) {
        return Err(ApiError::forbidden("Access denied"));
    }

    let account = state.account_service.get_account(&id).await?;

    Ok(Json(AccountResponse::from(&account)))
}

// ============================================================================
// Staff handlers
// ============================================================================

/// GET /api/v0.1/accounts
pub async fn list_accounts(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    let accounts = state.account_service.list_accounts().await?;

    Ok(Json(accounts.iter().map(AccountResponse::from).collect()))
}

/// DELETE /api/v0.1/accounts/{id}
pub async fn delete_account(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = AccountId::parse(&id)?;
    state.account_service.delete_account(&id).await?;

    info!(account_id = %id, caller = %principal.user_id, "Account deleted by staff");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{TestApp, PASSWORD};
    use crate::domain::account::UserRole;
    use crate::domain::action_token::AccountAction;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request},
        response::Response,
    };
    use chrono::Duration;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router(app: &TestApp) -> Router {
        Router::new()
            .nest(ACCOUNTS_PATH, create_accounts_router(app.state.clone()))
            .with_state(app.state.clone())
    }

    async fn call(
        app: &TestApp,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(bearer) = bearer {
            builder = builder.header("Authorization", bearer);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        router(app)
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    async fn json_of(response: Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn uri(suffix: &str) -> String {
        format!("{}{}", ACCOUNTS_PATH, suffix)
    }

    #[tokio::test]
    async fn test_signup_and_confirm() {
        let app = TestApp::new();

        let response = call(
            &app,
            Method::POST,
            ACCOUNTS_PATH,
            None,
            Some(json!({"email": "a@test.com", "password": PASSWORD})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let location = response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_string();
        let id = json_of(response).await["id"].as_str().unwrap().to_string();
        assert_eq!(location, uri(&format!("/{}", id)));

        let token = app
            .notifier
            .last_token(AccountAction::Confirmation)
            .await
            .unwrap();

        let response = call(
            &app,
            Method::PUT,
            &uri(&format!("/confirm/{}", token)),
            None,
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let account = app
            .service
            .get_account(&AccountId::parse(&id).unwrap())
            .await
            .unwrap();
        assert!(account.is_confirmed());
        assert_eq!(account.role(), UserRole::Customer);

        // Consumed
        let response = call(
            &app,
            Method::PUT,
            &uri(&format!("/confirm/{}", token)),
            None,
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_signup_rejects_bad_email_with_details() {
        let app = TestApp::new();

        let response = call(
            &app,
            Method::POST,
            ACCOUNTS_PATH,
            None,
            Some(json!({"email": "not-an-email", "password": PASSWORD})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_of(response).await["details"]["email"].is_array());
    }

    #[tokio::test]
    async fn test_duplicate_signup_conflicts() {
        let app = TestApp::new();
        app.customer("a@test.com").await;

        let response = call(
            &app,
            Method::POST,
            ACCOUNTS_PATH,
            None,
            Some(json!({"email": "a@test.com", "password": PASSWORD})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_malformed_confirmation_token_is_not_found() {
        let app = TestApp::new();

        let response = call(&app, Method::PUT, &uri("/confirm/garbage"), None, None).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let app = TestApp::new();
        app.customer("a@test.com").await;

        let response = call(
            &app,
            Method::POST,
            &uri("/password-reset"),
            None,
            Some(json!({"email": "a@test.com"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let token = app
            .notifier
            .last_token(AccountAction::PasswordReset)
            .await
            .unwrap();

        let response = call(
            &app,
            Method::GET,
            &uri(&format!("/new-password/{}", token)),
            None,
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = call(
            &app,
            Method::POST,
            &uri("/new-password"),
            None,
            Some(json!({"token": token.to_string(), "password": "Newpass1234!@"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        assert!(app
            .service
            .authenticate("a@test.com", "Newpass1234!@")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_password_reset_for_unknown_email_is_accepted_silently() {
        let app = TestApp::new();

        let response = call(
            &app,
            Method::POST,
            &uri("/password-reset"),
            None,
            Some(json!({"email": "nobody@test.com"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(app.notifier.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_password_reset_delivery_failure_is_reported() {
        let app = TestApp::new();
        app.customer("a@test.com").await;
        app.notifier.set_should_fail(true).await;

        let response = call(
            &app,
            Method::POST,
            &uri("/password-reset"),
            None,
            Some(json!({"email": "a@test.com"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_expired_reset_token_is_bad_request() {
        let app = TestApp::new();
        app.customer("a@test.com").await;
        app.service
            .initiate_password_reset("a@test.com")
            .await
            .unwrap();
        let token = app
            .notifier
            .last_token(AccountAction::PasswordReset)
            .await
            .unwrap();

        app.clock.advance(Duration::minutes(11));

        let response = call(
            &app,
            Method::GET,
            &uri(&format!("/new-password/{}", token)),
            None,
            None,
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unusable_action_tokens_get_identical_answers() {
        use crate::domain::account::AccountId;
        use crate::domain::action_token::{ActionToken, ActionTokenRepository};
        use crate::domain::Clock;

        let app = TestApp::new();
        let caller = app.customer("a@test.com").await;
        let other = app.customer("b@test.com").await;

        async fn new_password(app: &TestApp, token: String) -> Response {
            call(
                app,
                Method::POST,
                &uri("/new-password"),
                None,
                Some(json!({"token": token, "password": "Newpass123!"})),
            )
            .await
        }

        // Expired reset link
        app.service
            .initiate_password_reset("a@test.com")
            .await
            .unwrap();
        let expired = app
            .notifier
            .last_token(AccountAction::PasswordReset)
            .await
            .unwrap();
        app.clock.advance(Duration::minutes(11));
        let expired = new_password(&app, expired.to_string()).await;

        // Deletion link used as a reset link
        app.service
            .initiate_deletion(caller.id(), "a@test.com", PASSWORD)
            .await
            .unwrap();
        let wrong_kind = app
            .notifier
            .last_token(AccountAction::Deletion)
            .await
            .unwrap();
        let wrong_kind = new_password(&app, wrong_kind.to_string()).await;

        // Another account's deletion link
        app.service
            .initiate_deletion(other.id(), "b@test.com", PASSWORD)
            .await
            .unwrap();
        let foreign = app
            .notifier
            .last_token(AccountAction::Deletion)
            .await
            .unwrap();
        let foreign = call(
            &app,
            Method::DELETE,
            &uri("/deletion"),
            Some(&app.bearer_for(&caller)),
            Some(json!({"token": foreign.to_string(), "email": "a@test.com", "password": PASSWORD})),
        )
        .await;

        // Reset link whose account is gone
        let orphan = app
            .tokens
            .insert(ActionToken::new(
                AccountId::generate(),
                AccountAction::PasswordReset,
                app.clock.now(),
            ))
            .await
            .unwrap();
        let orphaned = new_password(&app, orphan.id().to_string()).await;

        for response in [expired, wrong_kind, foreign, orphaned] {
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                json_of(response).await,
                json!({"error": "Invalid or expired token", "status": 400})
            );
        }

        assert!(app.service.get_account(other.id()).await.is_ok());
    }

    #[tokio::test]
    async fn test_deletion_flow() {
        let app = TestApp::new();
        let account = app.customer("a@test.com").await;
        let bearer = app.bearer_for(&account);
        let credentials = json!({"email": "a@test.com", "password": PASSWORD});

        let response = call(
            &app,
            Method::POST,
            &uri("/deletion"),
            Some(&bearer),
            Some(credentials),
        )
        .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let token = app
            .notifier
            .last_token(AccountAction::Deletion)
            .await
            .unwrap();

        let response = call(
            &app,
            Method::DELETE,
            &uri("/deletion"),
            Some(&bearer),
            Some(json!({"token": token.to_string(), "email": "a@test.com", "password": PASSWORD})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        assert!(app.service.get_account(account.id()).await.is_err());
    }

    #[tokio::test]
    async fn test_deletion_requires_token() {
        let app = TestApp::new();

        let response = call(
            &app,
            Method::POST,
            &uri("/deletion"),
            None,
            Some(json!({"email": "a@test.com", "password": PASSWORD})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_cannot_request_self_deletion() {
        let app = TestApp::new();
        let admin = app.privileged("admin@test.com", UserRole::Admin).await;
        let bearer = app.bearer_for(&admin);

        let response = call(
            &app,
            Method::POST,
            &uri("/deletion"),
            Some(&bearer),
            Some(json!({"email": "admin@test.com", "password": PASSWORD})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_resend_confirmation_for_confirmed_account_is_rejected() {
        let app = TestApp::new();
        let account = app.customer("a@test.com").await;
        let bearer = app.bearer_for(&account);

        let response = call(&app, Method::POST, &uri("/confirm/resend"), Some(&bearer), None).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_accounts_is_staff_only() {
        let app = TestApp::new();
        let customer = app.customer("a@test.com").await;
        let admin = app.privileged("admin@test.com", UserRole::Admin).await;

        let response = call(
            &app,
            Method::GET,
            ACCOUNTS_PATH,
            Some(&app.bearer_for(&customer)),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = call(
            &app,
            Method::GET,
            ACCOUNTS_PATH,
            Some(&app.bearer_for(&admin)),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_of(response).await;
        assert_eq!(json.as_array().unwrap().len(), 2);
        assert!(json[0].get("passwordDigest").is_none());
    }

    #[tokio::test]
    async fn test_get_account_self_or_staff() {
        let app = TestApp::new();
        let alice = app.customer("alice@test.com").await;
        let bob = app.customer("bob@test.com").await;
        let service = app.privileged("svc@test.com", UserRole::Service).await;
        let alice_uri = uri(&format!("/{}", alice.id()));

        let response = call(&app, Method::GET, &alice_uri, Some(&app.bearer_for(&alice)), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_of(response).await["email"], "alice@test.com");

        let response = call(&app, Method::GET, &alice_uri, Some(&app.bearer_for(&bob)), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response =
            call(&app, Method::GET, &alice_uri, Some(&app.bearer_for(&service)), None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_staff_delete_account() {
        let app = TestApp::new();
        let customer = app.customer("a@test.com").await;
        let admin = app.privileged("admin@test.com", UserRole::Admin).await;
        let target = uri(&format!("/{}", customer.id()));

        let response = call(
            &app,
            Method::DELETE,
            &target,
            Some(&app.bearer_for(&customer)),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = call(&app, Method::DELETE, &target, Some(&app.bearer_for(&admin)), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = call(&app, Method::DELETE, &target, Some(&app.bearer_for(&admin)), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
