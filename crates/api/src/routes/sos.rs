//! SOS toggle and listings.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use sos_engine::{ActiveSos, EngineError, EventFilter, Principal, ToggleOutcome};
use store::SosEvent;

use crate::auth::{credential, AuthUser};
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Body sent by devices that trigger without a token.
#[derive(Debug, Default, Deserialize)]
pub struct DeviceTrigger {
    pub device_id: Option<String>,
}

#[derive(Serialize)]
pub struct ToggleResponse {
    pub message: String,
    pub active: bool,
    #[serde(flatten)]
    pub outcome: ToggleOutcome,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub triggered_by: Option<String>,
    pub device_id: Option<String>,
    pub triggered_email: Option<String>,
}

/// Start or stop an SOS for the caller.
///
/// A token in `Authorization` wins. Without one, the body must name a
/// registered device, which then acts for its owner.
pub async fn toggle(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<ToggleResponse>)> {
    let principal = match credential(&headers) {
        Some(token) => state.engine.identity.resolve(Some(token)).await?,
        None => device_principal(&state, &body).await?,
    };

    let outcome = state.engine.sos.toggle(&principal).await?;

    let (status, message) = if outcome.is_active() {
        (StatusCode::CREATED, "SOS triggered")
    } else {
        (StatusCode::OK, "SOS stopped")
    };

    Ok((
        status,
        Json(ToggleResponse {
            message: message.to_string(),
            active: outcome.is_active(),
            outcome,
        }),
    ))
}

async fn device_principal(state: &AppState, body: &[u8]) -> Result<Principal> {
    let trigger: DeviceTrigger = if body.iter().all(u8::is_ascii_whitespace) {
        DeviceTrigger::default()
    } else {
        serde_json::from_slice(body).map_err(|err| ApiError::BadBody(err.to_string()))?
    };

    let device_id = trigger
        .device_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| EngineError::Validation("Missing device_id".to_string()))?;

    Ok(state.engine.identity.resolve_device(&device_id).await?)
}

/// Events selected by one of the filter parameters, newest first.
pub async fn events(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Query(params): Query<EventsQuery>,
) -> Result<Json<Vec<SosEvent>>> {
    let filter = EventFilter::from_params(params.triggered_by, params.device_id, params.triggered_email)?;
    Ok(Json(state.engine.history.events(&filter).await?))
}

pub async fn active(State(state): State<AppState>, AuthUser(_): AuthUser) -> Result<Json<Vec<ActiveSos>>> {
    Ok(Json(state.engine.history.active().await?))
}
