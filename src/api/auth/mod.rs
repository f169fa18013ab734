//! Login endpoint
//!
//! Exchanges email and password for a signed bearer token. Every failure to
//! authenticate, including an unreadable body, gets the same answer.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::state::AppState;
use crate::api::types::error::BAD_CREDENTIALS;
use crate::api::types::{ApiError, Json};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_authentication_failure, record_jwt_issued};

/// Create the login router mounted at the configured endpoint
pub fn create_auth_router(endpoint: &str) -> Router<AppState> {
    Router::new().route(endpoint, post(login))
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: String,
    /// Header-ready value, prefix included
    pub token: String,
    /// Epoch milliseconds
    pub expires_at: i64,
}

/// POST {auth.endpoint}
pub async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(HeaderMap, Json<LoginResponse>), ApiError> {
    let request: LoginRequest = serde_json::from_slice(&body).map_err(|e| {
        debug!(error = %e, "Unreadable login body");
        bad_credentials()
    })?;

    let account = state
        .account_service
        .authenticate(&request.email, &request.password)
        .await
        .map_err(|err| match err {
            DomainError::BadCredentials => bad_credentials(),
            other => ApiError::from(other),
        })?;

    let jwt = state.jwt_service.as_ref();
    let issued = jwt.issue_for_account(&account)?;
    let token = format!("{}{}", jwt.header_prefix(), issued.token);

    let mut headers = HeaderMap::new();
    headers.insert(header_name(jwt.header_name())?, header_value(&token)?);

    record_jwt_issued();
    info!(user_id = %account.id(), "Login succeeded");

    Ok((
        headers,
        Json(LoginResponse {
            user_id: account.id().to_string(),
            token,
            expires_at: issued.expires_at.timestamp_millis(),
        }),
    ))
}

fn bad_credentials() -> ApiError {
    record_authentication_failure("bad_credentials");
    ApiError::unauthorized(BAD_CREDENTIALS)
}

fn header_name(name: &str) -> Result<HeaderName, ApiError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ApiError::from(DomainError::configuration("Invalid JWT header name")))
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value)
        .map_err(|_| ApiError::from(DomainError::internal("Token is not a valid header value")))
}
