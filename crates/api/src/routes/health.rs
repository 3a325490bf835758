//! Liveness endpoints.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct Health {
    pub status: String,
}

#[derive(Serialize)]
pub struct Welcome {
    pub message: String,
}

/// Health check endpoint.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
    })
}

pub async fn welcome() -> Json<Welcome> {
    Json(Welcome {
        message: "Welcome to the SOS API".to_string(),
    })
}
