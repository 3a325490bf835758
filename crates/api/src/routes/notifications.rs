//! Notification inbox and manual fan-out.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use store::Notification;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::state::AppState;

#[derive(Serialize)]
pub struct NotifyResponse {
    pub message: String,
    pub notified: usize,
}

#[derive(Serialize)]
pub struct StopResponse {
    pub message: String,
}

/// Notifications addressed to the caller, newest first.
pub async fn list(State(state): State<AppState>, AuthUser(user_id): AuthUser) -> Result<Json<Vec<Notification>>> {
    Ok(Json(state.engine.notifier.inbox(&user_id).await?))
}

/// Fan `event_id` out to the caller's connections.
pub async fn notify_start(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(event_id): Path<String>,
) -> Result<Json<NotifyResponse>> {
    let notified = state.engine.notifier.notify_start(&event_id, &user_id).await?;

    Ok(Json(NotifyResponse {
        message: "Notifications sent".to_string(),
        notified,
    }))
}

pub async fn notify_stop(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(event_id): Path<String>,
) -> Result<Json<StopResponse>> {
    state.engine.notifier.notify_stop(&event_id).await?;

    Ok(Json(StopResponse {
        message: "Notifications marked as seen".to_string(),
    }))
}
