use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{config::JwtConfig, state::AppState};

/// Bearer token payload: the owning user and the usual timestamps. Tokens
/// are not recorded server-side, so a token cannot be revoked before `exp`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The token could not be parsed at all.
    #[error("malformed token")]
    Malformed,
    /// Parsed fine but the signature is wrong or the token has expired.
    #[error("invalid or expired token")]
    Invalid,
}

/// Signing/verification keys derived from the startup config.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig { secret, ttl_days } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(ttl_days),
        }
    }
}

impl JwtKeys {
    pub fn sign(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + self.ttl;
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => TokenError::Malformed,
                _ => TokenError::Invalid,
            },
        )?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, ttl_days: i64) -> JwtKeys {
        JwtKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(ttl_days),
        }
    }

    #[test]
    fn sign_and_verify_resolves_to_the_same_user() {
        let keys = make_keys("dev-secret", 7);
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn keys_from_state_sign_verifiable_tokens() {
        let state = crate::state::AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id).expect("sign");
        assert_eq!(keys.verify(&token).expect("verify").sub, user_id);
    }

    #[test]
    fn wrong_secret_is_invalid_not_malformed() {
        let token = make_keys("secret-a", 7).sign(Uuid::new_v4()).expect("sign");
        let err = make_keys("secret-b", 7).verify(&token).unwrap_err();
        assert_eq!(err, TokenError::Invalid);
    }

    #[test]
    fn expired_token_is_invalid() {
        // Negative ttl puts exp in the past, beyond the default leeway.
        let keys = make_keys("dev-secret", -1);
        let token = keys.sign(Uuid::new_v4()).expect("sign");
        assert_eq!(keys.verify(&token).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn garbage_is_malformed() {
        let keys = make_keys("dev-secret", 7);
        assert_eq!(keys.verify("not-a-jwt").unwrap_err(), TokenError::Malformed);
    }
}
