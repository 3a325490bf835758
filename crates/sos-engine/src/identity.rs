//! Resolving credentials to the acting principal.

use store::device;
use tracing::{debug, warn};

use crate::error::{EngineError, Result, StoreResultExt};
use crate::token::TokenIssuer;
use crate::SharedStore;

/// The actor on whose behalf a request executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// A logged-in person.
    User { user_id: String },
    /// A registered device acting for its owner.
    Device { device_id: String, owner_id: String },
}

impl Principal {
    /// The user the request acts for. For devices this is the owner.
    pub fn acting_user_id(&self) -> &str {
        match self {
            Principal::User { user_id } => user_id,
            Principal::Device { owner_id, .. } => owner_id,
        }
    }

    /// The device, when the request came from one.
    pub fn device_id(&self) -> Option<&str> {
        match self {
            Principal::User { .. } => None,
            Principal::Device { device_id, .. } => Some(device_id),
        }
    }

    pub fn is_device(&self) -> bool {
        matches!(self, Principal::Device { .. })
    }
}

/// Turns bearer credentials into a [`Principal`]. Read-only.
#[derive(Clone)]
pub struct IdentityResolver {
    tokens: TokenIssuer,
    store: SharedStore,
}

impl IdentityResolver {
    pub fn new(tokens: TokenIssuer, store: SharedStore) -> Self {
        Self { tokens, store }
    }

    /// Resolve an `Authorization` header value.
    ///
    /// User tokens resolve without touching the store, so a token for a
    /// deleted user still resolves. Device tokens require the device to
    /// exist.
    pub async fn resolve(&self, credential: Option<&str>) -> Result<Principal> {
        let raw = credential
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| EngineError::Unauthenticated("Token is missing".to_string()))?;
        let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();

        let claims = self.tokens.decode(token)?;

        if let Some(user_id) = claims.id {
            debug!(user_id = %user_id, "Resolved user principal");
            return Ok(Principal::User { user_id });
        }

        if let Some(device_id) = claims.device_id {
            return self.resolve_device(&device_id).await;
        }

        warn!("Token carries neither a user nor a device identity");
        Err(EngineError::Unauthenticated("Invalid token".to_string()))
    }

    /// Resolve a device acting by its own identifier.
    pub async fn resolve_device(&self, device_id: &str) -> Result<Principal> {
        let found = device::get_device(self.store.as_ref(), device_id)
            .await
            .or_upstream("Failed to look up device")?;

        match found {
            Some(device) => {
                debug!(device_id = %device.device_id, owner_id = %device.owner_id, "Resolved device principal");
                Ok(Principal::Device {
                    device_id: device.device_id,
                    owner_id: device.owner_id,
                })
            }
            None => {
                warn!(device_id = %device_id, "Unknown device credential");
                Err(EngineError::Unauthenticated("Unknown device".to_string()))
            }
        }
    }
}
