//! Identity provider: issues credentials on login/signup and resolves an API
//! bearer token back to the user it was issued for.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Audience of bearer tokens accepted by `/api`.
pub const API_AUDIENCE: &str = "taskboard-api";
/// Audience of the session cookie checked by the page gate.
pub const SESSION_AUDIENCE: &str = "taskboard-session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("token rejected: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("invalid subject: {0}")]
    Subject(String),

    #[error("token lifetime of {0} hours is out of range")]
    Lifetime(i64),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn validate_token(&self, token: &str) -> Result<Identity, IdentityError>;
}

/// HS256 tokens signed with the configured secret.
pub struct JwtIdentityProvider {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_hours: i64,
}

impl JwtIdentityProvider {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_hours,
        }
    }

    pub fn issue(&self, user_id: Uuid, audience: &str) -> Result<String, IdentityError> {
        let now = Utc::now();
        let exp = Duration::try_hours(self.ttl_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(IdentityError::Lifetime(self.ttl_hours))?;
        let claims = Claims {
            sub: user_id.to_string(),
            aud: audience.to_string(),
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn issue_api_token(&self, user_id: Uuid) -> Result<String, IdentityError> {
        self.issue(user_id, API_AUDIENCE)
    }

    pub fn issue_session_token(&self, user_id: Uuid) -> Result<String, IdentityError> {
        self.issue(user_id, SESSION_AUDIENCE)
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn validate_token(&self, token: &str) -> Result<Identity, IdentityError> {
        let id = decode_subject(token, &self.decoding, API_AUDIENCE)?;
        Ok(Identity { id })
    }
}

/// Checks signature, expiry and audience, then parses `sub` as a user id.
pub fn decode_subject(
    token: &str,
    key: &DecodingKey,
    audience: &str,
) -> Result<Uuid, IdentityError> {
    let mut validation = Validation::default();
    validation.set_audience(&[audience]);

    let sub = decode::<Claims>(token, key, &validation)?.claims.sub;
    match Uuid::parse_str(&sub) {
        Ok(id) => Ok(id),
        Err(_) => Err(IdentityError::Subject(sub)),
    }
}

/// Fixed token table for tests.
#[cfg(test)]
pub struct StaticIdentityProvider {
    tokens: std::collections::HashMap<String, Uuid>,
}

#[cfg(test)]
impl StaticIdentityProvider {
    pub fn new<'a>(tokens: impl IntoIterator<Item = (&'a str, Uuid)>) -> Self {
        Self {
            tokens: tokens
                .into_iter()
                .map(|(token, id)| (token.to_string(), id))
                .collect(),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn validate_token(&self, token: &str) -> Result<Identity, IdentityError> {
        self.tokens
            .get(token)
            .map(|&id| Identity { id })
            .ok_or_else(|| IdentityError::Subject(token.to_string()))
    }
}

/// Never answers, for exercising the authentication timeout.
#[cfg(test)]
pub struct StalledIdentityProvider;

#[cfg(test)]
#[async_trait]
impl IdentityProvider for StalledIdentityProvider {
    async fn validate_token(&self, _token: &str) -> Result<Identity, IdentityError> {
        std::future::pending().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn issued_api_token_validates() {
        let provider = JwtIdentityProvider::new("test-secret", 1);
        let user = Uuid::new_v4();
        let token = provider.issue_api_token(user).unwrap();

        let identity = provider.validate_token(&token).await.unwrap();
        assert_eq!(identity.id, user);
    }

    #[tokio::test]
    async fn session_token_is_not_a_bearer_token() {
        let provider = JwtIdentityProvider::new("test-secret", 1);
        let token = provider.issue_session_token(Uuid::new_v4()).unwrap();

        assert!(provider.validate_token(&token).await.is_err());
    }

    #[tokio::test]
    async fn token_from_other_secret_is_rejected() {
        let other = JwtIdentityProvider::new("other-secret", 1);
        let token = other.issue_api_token(Uuid::new_v4()).unwrap();

        let provider = JwtIdentityProvider::new("test-secret", 1);
        assert!(matches!(
            provider.validate_token(&token).await,
            Err(IdentityError::Token(_))
        ));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let provider = JwtIdentityProvider::new("test-secret", -2);
        let token = provider.issue_api_token(Uuid::new_v4()).unwrap();

        assert!(provider.validate_token(&token).await.is_err());
    }

    #[test]
    fn oversized_lifetime_is_an_error() {
        for hours in [i64::MAX, 1_000_000_000_000] {
            let provider = JwtIdentityProvider::new("test-secret", hours);
            assert!(matches!(
                provider.issue_api_token(Uuid::new_v4()),
                Err(IdentityError::Lifetime(h)) if h == hours
            ));
        }
    }

    #[tokio::test]
    async fn non_uuid_subject_is_rejected() {
        let key = EncodingKey::from_secret(b"test-secret");
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: "not-a-uuid".into(),
            aud: API_AUDIENCE.into(),
            exp: now + 3600,
            iat: now,
        };
        let token = encode(&Header::default(), &claims, &key).unwrap();

        let provider = JwtIdentityProvider::new("test-secret", 1);
        assert!(matches!(
            provider.validate_token(&token).await,
            Err(IdentityError::Subject(_))
        ));
    }
}
