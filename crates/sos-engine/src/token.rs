//! Signed bearer tokens for users and devices.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{EngineError, Result};

/// Token signing settings.
#[derive(Clone)]
pub struct TokenConfig {
    /// HS256 secret.
    pub signing_secret: String,
    /// Lifetime of issued tokens.
    pub ttl: Duration,
}

impl TokenConfig {
    pub fn new(signing_secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            ttl,
        }
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("signing_secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Token payload. User tokens carry `id`/`email`, device tokens `device_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    pub exp: usize,
}

/// Issues and verifies tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    config: TokenConfig,
}

impl TokenIssuer {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    fn expiry(&self) -> usize {
        let now = Utc::now().timestamp().max(0) as u64;
        (now + self.config.ttl.as_secs()) as usize
    }

    fn sign(&self, claims: &Claims) -> Result<String> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.config.signing_secret.as_bytes()),
        )
        .map_err(|e| {
            warn!(error = %e, "Token signing failed");
            EngineError::Internal("Could not issue token".to_string())
        })
    }

    /// Issue a token identifying a user.
    pub fn issue_for_user(&self, user_id: &str, email: &str) -> Result<String> {
        self.sign(&Claims {
            id: Some(user_id.to_string()),
            email: Some(email.to_string()),
            device_id: None,
            exp: self.expiry(),
        })
    }

    /// Issue a token identifying a device.
    pub fn issue_for_device(&self, device_id: &str) -> Result<String> {
        self.sign(&Claims {
            id: None,
            email: None,
            device_id: Some(device_id.to_string()),
            exp: self.expiry(),
        })
    }

    /// Verify signature and expiry, returning the payload.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.signing_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            warn!(error = %e, "Token rejected");
            EngineError::Unauthenticated("Invalid token".to_string())
        })
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.config.ttl)
            .finish()
    }
}
