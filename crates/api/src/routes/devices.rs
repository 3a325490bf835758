//! Device routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sos_engine::EngineError;
use store::Device;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::state::AppState;

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub device_id: String,
    pub owner_id: String,
}

#[derive(Deserialize)]
pub struct DeviceLoginRequest {
    pub device_id: Option<String>,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Register a new device for the caller.
pub async fn register(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let device = state.engine.devices.register(&user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Device registered".to_string(),
            device_id: device.device_id,
            owner_id: device.owner_id,
        }),
    ))
}

/// Issue a device token.
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DeviceLoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>> {
    let Json(req) = payload?;
    let device_id = req
        .device_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| EngineError::Validation("Missing device_id".to_string()))?;

    let token = state.engine.accounts.device_login(&device_id).await?;
    Ok(Json(TokenResponse { token }))
}

pub async fn list(State(state): State<AppState>, AuthUser(user_id): AuthUser) -> Result<Json<Vec<Device>>> {
    Ok(Json(state.engine.devices.list_for_owner(&user_id).await?))
}

pub async fn show(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(device_id): Path<String>,
) -> Result<Json<Device>> {
    Ok(Json(state.engine.devices.get(&device_id).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(device_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.engine.devices.delete_owned(&user_id, &device_id).await?;

    Ok(Json(MessageResponse {
        message: "Device removed".to_string(),
    }))
}
