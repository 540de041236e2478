use super::{config::JwtConfig, roles::Role};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Claims carried by every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// User id
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl JwtClaims {
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|e| TokenError::Invalid(e.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("failed to sign token: {0}")]
    Signing(String),
}

struct Keys {
    encoding: EncodingKey,
    /// Current key first, then rotated-out keys.
    decoding: Vec<DecodingKey>,
    validation: Validation,
    ttl: Duration,
}

/// Stateless HS256 token issuer and verifier.
#[derive(Clone)]
pub struct JwtAuth {
    keys: Arc<Keys>,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        let decoding = std::iter::once(&config.secret)
            .chain(config.previous_secrets.iter())
            .map(|secret| DecodingKey::from_secret(secret.as_bytes()))
            .collect();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        tracing::info!(
            previous_keys = config.previous_secrets.len(),
            ttl_secs = config.ttl_secs,
            "JWT auth initialized"
        );

        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(config.secret.as_bytes()),
                decoding,
                validation,
                ttl: Duration::seconds(config.ttl_secs),
            }),
        }
    }

    /// Sign a token with the configured lifetime.
    pub fn issue(&self, user_id: Uuid, username: &str, role: Role) -> Result<String, TokenError> {
        self.issue_with_ttl(user_id, username, role, self.keys.ttl)
    }

    pub fn issue_with_ttl(
        &self,
        user_id: Uuid,
        username: &str,
        role: Role,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.keys.encoding,
        )
        .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Check signature and expiry against the current key, then each
    /// rotated-out key.
    pub fn verify(&self, token: &str) -> Result<JwtClaims, TokenError> {
        let mut last_error = String::from("no verification key configured");

        for key in &self.keys.decoding {
            match decode::<JwtClaims>(token, key, &self.keys.validation) {
                Ok(data) => return Ok(data.claims),
                Err(e) => match e.kind() {
                    ErrorKind::InvalidSignature => last_error = e.to_string(),
                    ErrorKind::ExpiredSignature => return Err(TokenError::Expired),
                    _ => return Err(TokenError::Invalid(e.to_string())),
                },
            }
        }

        Err(TokenError::Invalid(last_error))
    }
}
