//! Bearer token gate and role checks for protected routes

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::error::MISSING_TOKEN;
use crate::api::types::ApiError;
use crate::domain::account::AccountId;
use crate::domain::{authorize, AccessDecision, DomainError};
use crate::infrastructure::auth::BearerClaims;
use crate::infrastructure::observability::record_authentication_failure;

/// Roles allowed on administrative routes
pub const STAFF_ROLES: &[&str] = &["ADMIN", "SERVICE"];

/// Caller identity established by the gate
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub user_id: AccountId,
    pub email: String,
    pub authorities: Vec<String>,
}

impl Principal {
    pub fn from_claims(claims: BearerClaims) -> Result<Self, DomainError> {
        Ok(Self {
            user_id: claims.account_id()?,
            email: claims.sub,
            authorities: claims.authorities,
        })
    }

    pub fn is_allowed(&self, required_roles: &[&str]) -> bool {
        authorize(required_roles, &self.authorities).is_allowed()
    }
}

/// Extract the raw token from the configured header
///
/// The header must start with `prefix`; anything else counts as missing.
pub fn extract_bearer_token<'a>(
    headers: &'a HeaderMap,
    header_name: &str,
    prefix: &str,
) -> Result<&'a str, ApiError> {
    headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(prefix))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized(MISSING_TOKEN))
}

/// Gate middleware: verifies the bearer token and stores the [`Principal`]
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let jwt = state.jwt_service.as_ref();

    let token = extract_bearer_token(request.headers(), jwt.header_name(), jwt.header_prefix())
        .inspect_err(|_| record_authentication_failure("missing_token"))?;

    let claims = jwt.verify(token).map_err(|err| {
        let reason = match err {
            DomainError::TokenExpired => "token_expired",
            _ => "token_invalid",
        };
        debug!(reason, "Rejected bearer token");
        record_authentication_failure(reason);
        ApiError::from(err)
    })?;

    let principal = Principal::from_claims(claims).map_err(|err| {
        record_authentication_failure("token_invalid");
        ApiError::from(err)
    })?;

    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Role check for a route group; must run after [`authenticate`]
pub async fn require_roles(
    required_roles: &'static [&'static str],
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = request
        .extensions()
        .get::<Principal>()
        .ok_or_else(|| ApiError::unauthorized(MISSING_TOKEN))?;

    if authorize(required_roles, &principal.authorities) == AccessDecision::Deny {
        debug!(user_id = %principal.user_id, "Access denied");
        record_authentication_failure("forbidden");
        return Err(ApiError::forbidden("Access denied"));
    }

    Ok(next.run(request).await)
}

/// Role check for [`STAFF_ROLES`]
pub async fn require_staff(request: Request, next: Next) -> Result<Response, ApiError> {
    require_roles(STAFF_ROLES, request, next).await
}

/// Extractor for the [`Principal`] stored by the gate
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Authenticated)
            .ok_or_else(|| ApiError::unauthorized(MISSING_TOKEN))
    }
}
