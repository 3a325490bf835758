//! Registration, login and profile routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sos_engine::{EngineError, Session, UserProfile};

use crate::auth::AuthUser;
use crate::error::Result;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_password: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub user_email: Option<String>,
    pub user_password: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: String,
}

pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let Json(req) = payload?;
    let (Some(name), Some(email), Some(password)) = (req.user_name, req.user_email, req.user_password) else {
        return Err(EngineError::Validation("Missing fields".to_string()).into());
    };

    let profile = state.engine.accounts.register(&name, &email, &password).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created".to_string(),
            user_id: profile.user_id,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Session>> {
    let Json(req) = payload?;
    let (Some(email), Some(password)) = (req.user_email, req.user_password) else {
        return Err(EngineError::Validation("Missing credentials".to_string()).into());
    };

    let session = state.engine.accounts.login(&email, &password).await?;
    Ok(Json(session))
}

/// The authenticated user's profile.
pub async fn me(State(state): State<AppState>, AuthUser(user_id): AuthUser) -> Result<Json<UserProfile>> {
    let profile = state.engine.accounts.profile(&user_id).await?;
    Ok(Json(profile))
}
