// Admin credential check and bearer token handling
use crate::config::AppConfig;
use crate::model::AuthError;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const ADMIN_SUBJECT: &str = "admin";
pub const ADMIN_ROLE: &str = "ADMIN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub iat: u64,
    pub exp: u64,
}

/// Single-admin authentication: one bcrypt password hash, HS256 tokens.
pub struct AdminAuth {
    password_hash: String,
    jwt_secret: String,
    token_ttl_seconds: u64,
}

impl AdminAuth {
    pub fn new(password_hash: String, jwt_secret: String, token_ttl_seconds: u64) -> Self {
        Self {
            password_hash,
            jwt_secret,
            token_ttl_seconds,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.admin_password_hash.clone(),
            config.jwt_secret.clone(),
            config.token_ttl_seconds,
        )
    }

    /// Checks `password` against the configured hash.
    pub fn verify_password(&self, password: &str) -> Result<(), AuthError> {
        if self.password_hash.trim().is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        if bcrypt::verify(password, &self.password_hash)? {
            Ok(())
        } else {
            Err(AuthError::InvalidPassword)
        }
    }

    pub fn issue_token(&self) -> Result<String, AuthError> {
        let now = now_secs();
        let claims = Claims {
            sub: ADMIN_SUBJECT.to_string(),
            role: ADMIN_ROLE.to_string(),
            iat: now,
            exp: now + self.token_ttl_seconds,
        };

        let key = EncodingKey::from_secret(self.jwt_secret.as_bytes());
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &key)?)
    }

    /// Validates signature, expiry and role of a bearer token.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let data = decode::<Claims>(token, &key, &Validation::new(Algorithm::HS256)).map_err(|e| {
            debug!("Rejected token: {}", e);
            AuthError::InvalidToken
        })?;

        if data.claims.role != ADMIN_ROLE {
            return Err(AuthError::InvalidToken);
        }
        Ok(data.claims)
    }
}

fn now_secs() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}
