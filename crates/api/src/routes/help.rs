//! Caregiver help toggle.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sos_engine::{EngineError, HelpOutcome};

use crate::auth::AuthUser;
use crate::error::Result;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct HelpRequest {
    pub device_id: Option<String>,
}

#[derive(Serialize)]
pub struct HelpResponse {
    pub message: String,
    pub help: bool,
    #[serde(flatten)]
    pub outcome: HelpOutcome,
}

#[derive(Serialize)]
pub struct HelpState {
    pub help: bool,
}

pub async fn toggle(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: std::result::Result<Json<HelpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<HelpResponse>)> {
    let Json(req) = payload?;
    let device_id = req
        .device_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| EngineError::Validation("Missing device_id".to_string()))?;

    let outcome = state.engine.help.toggle(&device_id, &user_id).await?;

    let (status, message) = if outcome.is_active() {
        (StatusCode::CREATED, "Help is on the way")
    } else {
        (StatusCode::OK, "Help closed")
    };

    Ok((
        status,
        Json(HelpResponse {
            message: message.to_string(),
            help: outcome.is_active(),
            outcome,
        }),
    ))
}

/// Whether a device has an open help acknowledgment. Unauthenticated.
pub async fn state(State(state): State<AppState>, Path(device_id): Path<String>) -> Result<Json<HelpState>> {
    let help = state.engine.help.state(&device_id).await?;
    Ok(Json(HelpState { help }))
}
