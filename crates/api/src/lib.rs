//! HTTP surface of the SOS service.
//!
//! [`app`] builds the axum router over an [`Engine`](sos_engine::Engine);
//! the `sos-api` binary wires it to a [`RestStore`](store::RestStore).

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use state::AppState;

/// Router with every route and request tracing.
pub fn app(state: AppState) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
