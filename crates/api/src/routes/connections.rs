//! Connection routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sos_engine::ConnectionSummary;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ConnectRequest {
    #[serde(default)]
    pub other_user_id: String,
}

#[derive(Serialize)]
pub struct ConnectResponse {
    pub message: String,
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: std::result::Result<Json<ConnectRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ConnectResponse>)> {
    let Json(req) = payload?;
    state
        .engine
        .connections
        .connect(&user_id, &req.other_user_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ConnectResponse {
            message: "Connection created".to_string(),
        }),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<ConnectionSummary>>> {
    Ok(Json(state.engine.connections.list(&user_id).await?))
}
