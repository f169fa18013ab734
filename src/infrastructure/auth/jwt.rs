//! Bearer token issuing and verification (HS512)

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::domain::account::{Account, AccountId};
use crate::domain::{Clock, DomainError};

/// Claims carried by a bearer token
///
/// `iat` and `exp` are seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BearerClaims {
    /// Account email
    pub sub: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "Authorities", default)]
    pub authorities: Vec<String>,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl BearerClaims {
    pub fn account_id(&self) -> Result<AccountId, DomainError> {
        AccountId::parse(&self.user_id)
            .map_err(|_| DomainError::token_invalid("userId claim is not an account id"))
    }
}

/// A freshly signed token and when it stops being accepted
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Configuration for JWT service
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub header_name: String,
    /// Prefix in front of the token in the header value, usually `"Bearer "`
    pub header_prefix: String,
    pub expiration: Duration,
}

impl Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[hidden]")
            .field("issuer", &self.issuer)
            .field("header_name", &self.header_name)
            .field("header_prefix", &self.header_prefix)
            .field("expiration", &self.expiration)
            .finish()
    }
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, issuer: impl Into<String>, expiration: Duration) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            header_name: "Authorization".to_string(),
            header_prefix: "Bearer ".to_string(),
            expiration,
        }
    }
}

impl From<&AuthConfig> for JwtConfig {
    fn from(auth: &AuthConfig) -> Self {
        Self {
            secret: auth.jwt_secret.clone(),
            issuer: auth.jwt_issuer.clone(),
            header_name: auth.jwt_header_name.clone(),
            header_prefix: auth.jwt_header_prefix.clone(),
            expiration: Duration::milliseconds(auth.jwt_expiration_ms),
        }
    }
}

/// Signs and verifies bearer tokens
pub trait JwtGenerator: Send + Sync + Debug {
    fn issue(
        &self,
        subject: &str,
        user_id: &AccountId,
        authorities: &[String],
        expires_at: DateTime<Utc>,
    ) -> Result<String, DomainError>;

    /// Issue a token for an account expiring after the configured duration
    fn issue_for_account(&self, account: &Account) -> Result<IssuedToken, DomainError>;

    /// `TokenExpired` once the clock passes `exp`, `TokenInvalid` for any
    /// signature, structure, issuer or algorithm problem
    fn verify(&self, token: &str) -> Result<BearerClaims, DomainError>;

    fn header_name(&self) -> &str;

    fn header_prefix(&self) -> &str;
}

/// HS512 implementation of [`JwtGenerator`]
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    clock: Arc<dyn Clock>,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    pub fn new(config: JwtConfig, clock: Arc<dyn Clock>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
            clock,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS512);
        // Expiry is checked against the injected clock instead
        validation.validate_exp = false;
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation
    }
}

impl JwtGenerator for JwtService {
    fn issue(
        &self,
        subject: &str,
        user_id: &AccountId,
        authorities: &[String],
        expires_at: DateTime<Utc>,
    ) -> Result<String, DomainError> {
        let claims = BearerClaims {
            sub: subject.to_string(),
            user_id: user_id.to_string(),
            authorities: authorities.to_vec(),
            iss: self.config.issuer.clone(),
            iat: self.clock.now().timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS512), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to sign JWT: {}", e)))
    }

    fn issue_for_account(&self, account: &Account) -> Result<IssuedToken, DomainError> {
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(self.config.expiration)
            .ok_or_else(|| DomainError::configuration("JWT expiration is out of range"))?;
        let token = self.issue(
            account.email(),
            account.id(),
            &account.authorities(),
            expires_at,
        )?;

        Ok(IssuedToken { token, expires_at })
    }

    fn verify(&self, token: &str) -> Result<BearerClaims, DomainError> {
        let data = decode::<BearerClaims>(token, &self.decoding_key, &self.validation())
            .map_err(|e| DomainError::token_invalid(e.to_string()))?;

        if self.clock.now().timestamp() > data.claims.exp {
            return Err(DomainError::TokenExpired);
        }

        Ok(data.claims)
    }

    fn header_name(&self) -> &str {
        &self.config.header_name
    }

    fn header_prefix(&self) -> &str {
        &self.config.header_prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::UserRole;
    use crate::domain::ManualClock;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    const SECRET: &str = "an-hs512-secret-that-is-long-enough-for-tests-0123456789abcdefghij";

    fn service() -> (JwtService, ManualClock) {
        let clock = ManualClock::starting_now();
        let config = JwtConfig::new(SECRET, "utopia", Duration::hours(24));
        (JwtService::new(config, Arc::new(clock.clone())), clock)
    }

    fn customer() -> Account {
        Account::new("a@test.com", "digest").with_role(UserRole::Customer)
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let (service, _) = service();
        let account = customer();

        let issued = service.issue_for_account(&account).unwrap();
        let claims = service.verify(&issued.token).unwrap();

        assert_eq!(claims.sub, "a@test.com");
        assert_eq!(claims.account_id().unwrap(), *account.id());
        assert_eq!(claims.authorities, vec!["CUSTOMER".to_string()]);
        assert_eq!(claims.iss, "utopia");
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn test_out_of_range_expiration_is_an_error() {
        let config = JwtConfig::new(SECRET, "utopia", Duration::MAX);
        let service = JwtService::new(config, Arc::new(ManualClock::starting_now()));

        let result = service.issue_for_account(&customer());
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_token_expires_after_configured_duration() {
        let (service, clock) = service();
        let issued = service.issue_for_account(&customer()).unwrap();

        clock.advance(Duration::hours(24));
        assert!(service.verify(&issued.token).is_ok());

        clock.advance(Duration::seconds(1));
        assert!(matches!(
            service.verify(&issued.token),
            Err(DomainError::TokenExpired)
        ));
    }

    #[test]
    fn test_tampered_signature_is_invalid() {
        let (service, _) = service();
        let token = service.issue_for_account(&customer()).unwrap().token;

        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[sig_start] = if bytes[sig_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(matches!(
            service.verify(&tampered),
            Err(DomainError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_tampered_payload_is_invalid() {
        let (service, _) = service();
        let token = service.issue_for_account(&customer()).unwrap().token;
        let parts: Vec<&str> = token.split('.').collect();

        let forged = URL_SAFE_NO_PAD.encode(
            r#"{"sub":"a@test.com","userId":"x","Authorities":["ADMIN"],"iss":"utopia","iat":0,"exp":9999999999}"#,
        );
        let tampered = format!("{}.{}.{}", parts[0], forged, parts[2]);

        assert!(matches!(
            service.verify(&tampered),
            Err(DomainError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let (service, clock) = service();
        let other = JwtService::new(
            JwtConfig::new("another-secret", "utopia", Duration::hours(24)),
            Arc::new(clock),
        );

        let token = other.issue_for_account(&customer()).unwrap().token;

        assert!(matches!(
            service.verify(&token),
            Err(DomainError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_wrong_issuer_is_invalid() {
        let (service, clock) = service();
        let other = JwtService::new(
            JwtConfig::new(SECRET, "someone-else", Duration::hours(24)),
            Arc::new(clock),
        );

        let token = other.issue_for_account(&customer()).unwrap().token;

        assert!(matches!(
            service.verify(&token),
            Err(DomainError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_other_algorithm_is_invalid() {
        let (service, clock) = service();
        let account = customer();
        let claims = BearerClaims {
            sub: account.email().to_string(),
            user_id: account.id().to_string(),
            authorities: account.authorities(),
            iss: "utopia".to_string(),
            iat: clock.now().timestamp(),
            exp: (clock.now() + Duration::hours(1)).timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            service.verify(&token),
            Err(DomainError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_malformed_token_is_invalid() {
        let (service, _) = service();

        for token in ["", "abc", "a.b.c", "Bearer x.y.z"] {
            assert!(matches!(
                service.verify(token),
                Err(DomainError::TokenInvalid { .. })
            ));
        }
    }

    #[test]
    fn test_payload_uses_wire_claim_names() {
        let (service, _) = service();
        let token = service.issue_for_account(&customer()).unwrap().token;

        let payload = token.split('.').nth(1).unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();

        assert_eq!(json["sub"], "a@test.com");
        assert_eq!(json["Authorities"][0], "CUSTOMER");
        assert!(json["userId"].is_string());
        assert_eq!(json["iss"], "utopia");
        assert!(json["iat"].is_i64());
        assert!(json["exp"].is_i64());

        let header = token.split('.').next().unwrap();
        let header: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header).unwrap()).unwrap();
        assert_eq!(header["alg"], "HS512");
    }

    #[test]
    fn test_config_from_auth_settings() {
        let auth = AuthConfig {
            jwt_secret: SECRET.to_string(),
            jwt_expiration_ms: 90_000,
            ..AuthConfig::default()
        };

        let config = JwtConfig::from(&auth);

        assert_eq!(config.expiration, Duration::seconds(90));
        assert_eq!(config.header_prefix, "Bearer ");
        assert!(!format!("{:?}", config).contains(SECRET));
    }
}
