//! Registration, login and profiles.

use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use store::{user, NewUser, User};
use tracing::{info, warn};

use crate::devices::DeviceRegistry;
use crate::error::{EngineError, Result, StoreResultExt};
use crate::token::TokenIssuer;
use crate::SharedStore;

/// A user as shown to other users. Never carries the password digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            user_name: user.user_name,
            user_email: user.user_email,
        }
    }
}

/// Successful login.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
}

fn digest_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// User and device sign-in.
#[derive(Clone)]
pub struct Accounts {
    store: SharedStore,
    tokens: TokenIssuer,
    devices: DeviceRegistry,
}

impl Accounts {
    pub fn new(store: SharedStore, tokens: TokenIssuer, devices: DeviceRegistry) -> Self {
        Self {
            store,
            tokens,
            devices,
        }
    }

    /// Register a new user. Emails are case-folded and must be unique.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<UserProfile> {
        let store = self.store.as_ref();
        let email = email.trim().to_lowercase();

        if name.trim().is_empty() || email.is_empty() || password.is_empty() {
            return Err(EngineError::Validation("Missing fields".to_string()));
        }

        let existing = user::get_user_by_email(store, &email)
            .await
            .or_upstream("Failed to check email")?;
        if existing.is_some() {
            return Err(EngineError::Conflict("Email already being used".to_string()));
        }

        let created = user::create_user(
            store,
            &NewUser {
                user_name: name.trim().to_string(),
                user_email: email,
                user_password: digest_password(password),
            },
        )
        .await
        .map_err(|err| {
            if err.is_conflict() {
                EngineError::Conflict("Email already being used".to_string())
            } else {
                EngineError::Upstream {
                    context: "Failed to create user",
                    source: err,
                }
            }
        })?;

        info!(user_id = %created.user_id, "User registered");
        Ok(created.into())
    }

    /// Check credentials and issue a user token.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim().to_lowercase();

        let found = user::get_user_by_email(self.store.as_ref(), &email)
            .await
            .or_upstream("Failed to load user")?;

        let Some(found) = found else {
            warn!("Login for unknown email");
            return Err(EngineError::Unauthenticated("Invalid credentials".to_string()));
        };

        if digest_password(password) != found.user_password {
            warn!(user_id = %found.user_id, "Login with wrong password");
            return Err(EngineError::Unauthenticated("Invalid credentials".to_string()));
        }

        let token = self.tokens.issue_for_user(&found.user_id, &found.user_email)?;
        info!(user_id = %found.user_id, "User logged in");

        Ok(Session {
            token,
            user_id: found.user_id,
        })
    }

    /// The caller's own profile.
    pub async fn profile(&self, user_id: &str) -> Result<UserProfile> {
        user::get_user(self.store.as_ref(), user_id)
            .await
            .or_upstream("Failed to load user")?
            .map(UserProfile::from)
            .ok_or_else(|| EngineError::NotFound("User not found".to_string()))
    }

    /// Issue a token for a registered device.
    pub async fn device_login(&self, device_id: &str) -> Result<String> {
        let device = self.devices.get(device_id).await?;
        let token = self.tokens.issue_for_device(&device.device_id)?;

        self.devices.mark_seen(&device.device_id, Utc::now()).await?;
        info!(device_id = %device.device_id, "Device logged in");

        Ok(token)
    }
}
