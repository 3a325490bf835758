//! Route handlers.

pub mod connections;
pub mod devices;
pub mod health;
pub mod help;
pub mod notifications;
pub mod sos;
pub mod users;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health::welcome))
        .route("/health", get(health::health))
        // Accounts
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/user/me", get(users::me))
        .route("/connections", post(connections::create).get(connections::list))
        // Devices
        .route("/devices", post(devices::register).get(devices::list))
        .route("/devices/login", post(devices::login))
        .route("/devices/:device_id", get(devices::show).delete(devices::remove))
        // SOS
        .route("/sos", post(sos::toggle))
        .route("/sos/events", get(sos::events))
        .route("/sos/active", get(sos::active))
        .route("/sos/notify/:event_id", post(notifications::notify_start))
        .route("/sos/notify_stop/:event_id", post(notifications::notify_stop))
        // Notifications
        .route("/notifications", get(notifications::list))
        .route("/notifications/:event_id", post(notifications::notify_start))
        // Help
        .route("/help/toggle", post(help::toggle))
        .route("/help/state/:device_id", get(help::state))
}
