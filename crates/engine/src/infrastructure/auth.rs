//! Token issuing and password hashing.

use std::sync::Arc;
use std::time::Duration;

use grimoire_domain::{User, UserId};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::infrastructure::ports::ClockPort;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Token encoding failed: {0}")]
    Encoding(String),
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// JWT claims.
///
/// The snake_case names are part of the token format that existing clients
/// decode; do not rename them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
    pub preferred_edition_id: Option<i64>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> UserId {
        UserId::new(self.id)
    }
}

/// Issues and verifies HS256 tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn ClockPort>,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            clock,
        }
    }

    /// Sign a token carrying the user's current role and preferences.
    pub fn issue(&self, user: &User) -> Result<String, CredentialError> {
        let iat = self.clock.now().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            id: user.id.get(),
            username: user.username.clone(),
            is_admin: user.is_admin,
            preferred_edition_id: user.preferred_edition_id,
            iat,
            exp: iat.saturating_add(ttl),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| CredentialError::Encoding(e.to_string()))
    }

    /// Check the signature of a token, and its expiry against the clock that
    /// issued it.
    pub fn verify(&self, token: &str) -> Result<Claims, CredentialError> {
        let mut validation = Validation::default();
        validation.validate_exp = false;
        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected token");
                CredentialError::InvalidToken
            })?;
        if claims.exp <= self.clock.now().timestamp() {
            tracing::debug!(user_id = claims.id, "Rejected expired token");
            return Err(CredentialError::InvalidToken);
        }
        Ok(claims)
    }
}

/// bcrypt hashing, run on the blocking pool.
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let password = password.to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| CredentialError::Hashing(e.to_string()))?
            .map_err(|e| CredentialError::Hashing(e.to_string()))
    }

    /// `Ok(false)` on mismatch. A malformed stored hash is also a mismatch.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialError> {
        let password = password.to_string();
        let hash = hash.to_string();
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| CredentialError::Hashing(e.to_string()))?;
        match verified {
            Ok(matches) => Ok(matches),
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is unreadable");
                Ok(false)
            }
        }
    }
}
