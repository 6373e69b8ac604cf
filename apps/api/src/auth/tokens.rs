//! JWT issuing and verification.
//!
//! Access and refresh tokens share one HS256 secret and are told apart by the
//! `token_type` claim, so a refresh token can never be used as an access token
//! (and vice versa).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::user::User;

pub const TOKEN_TYPE_BEARER: &str = "Bearer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub token_type: TokenKind,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &Config) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret)),
            decoding: Arc::new(DecodingKey::from_secret(secret)),
            access_ttl: Duration::seconds(config.jwt_access_expires),
            refresh_ttl: Duration::seconds(config.jwt_refresh_expires),
        }
    }

    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    pub fn issue(&self, user: &User, kind: TokenKind) -> Result<String, AppError> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            token_type: kind,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Token encoding failed: {e}")))
    }

    /// Decodes and checks signature, expiry and token kind.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(|e| {
            debug!("Rejected token: {e}");
            AppError::Unauthorized
        })?;

        if data.claims.token_type != expected {
            debug!(
                "Rejected token: expected {:?}, got {:?}",
                expected, data.claims.token_type
            );
            return Err(AppError::Unauthorized);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "ada@example.com".into(),
            password_hash: String::new(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            role: "candidate".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = TokenService::new(&Config::for_tests());
        let user = make_user();
        let token = service.issue(&user, TokenKind::Access).unwrap();

        let claims = service.verify(&token, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.role, "candidate");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let service = TokenService::new(&Config::for_tests());
        let user = make_user();
        let refresh = service.issue(&user, TokenKind::Refresh).unwrap();
        let access = service.issue(&user, TokenKind::Access).unwrap();

        assert!(matches!(
            service.verify(&refresh, TokenKind::Access),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            service.verify(&access, TokenKind::Refresh),
            Err(AppError::Unauthorized)
        ));
        assert!(service.verify(&refresh, TokenKind::Refresh).is_ok());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let mut config = Config::for_tests();
        // Well past the default 60s validation leeway.
        config.jwt_access_expires = -3600;
        let service = TokenService::new(&config);
        let token = service.issue(&make_user(), TokenKind::Access).unwrap();

        assert!(matches!(
            service.verify(&token, TokenKind::Access),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let service = TokenService::new(&Config::for_tests());
        let mut other_config = Config::for_tests();
        other_config.jwt_secret = "another-secret".into();
        let other = TokenService::new(&other_config);

        let token = other.issue(&make_user(), TokenKind::Access).unwrap();
        assert!(service.verify(&token, TokenKind::Access).is_err());
        assert!(service.verify("not.a.jwt", TokenKind::Access).is_err());
    }
}
