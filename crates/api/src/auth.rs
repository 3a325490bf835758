//! Request extractors for authenticated callers.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use sos_engine::{EngineError, Principal};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// Raw `Authorization` header value, if any.
pub fn credential(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok())
}

/// A caller holding a user token. Device tokens are rejected.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let principal = state.engine.identity.resolve(credential(&parts.headers)).await?;

        match principal {
            Principal::User { user_id } => Ok(AuthUser(user_id)),
            Principal::Device { device_id, .. } => {
                warn!(device_id = %device_id, "Device token used on a user route");
                Err(EngineError::Unauthenticated("Invalid token".to_string()).into())
            }
        }
    }
}
