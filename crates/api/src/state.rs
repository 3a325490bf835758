//! Application state shared across handlers.

use sos_engine::Engine;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Engine components wired to the store.
    pub engine: Engine,
}

impl AppState {
    /// Create new application state.
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }
}
