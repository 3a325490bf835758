//! Error types for engine operations.

use store::StoreError;
use thiserror::Error;

/// Errors that can occur while handling a request.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// Missing, malformed or expired credential.
    #[error("{0}")]
    Unauthenticated(String),

    /// A referenced device, event or user does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate registration or connection.
    #[error("{0}")]
    Conflict(String),

    /// Local failure unrelated to the store.
    #[error("{0}")]
    Internal(String),

    /// The store failed or answered with something unexpected.
    #[error("{context}: {source}")]
    Upstream {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl EngineError {
    /// Short message safe to show to callers.
    pub fn public_message(&self) -> String {
        match self {
            EngineError::Upstream { context, .. } => context.to_string(),
            other => other.to_string(),
        }
    }

    /// Upstream diagnostic text for failures where callers are shown it.
    pub fn upstream_details(&self) -> Option<String> {
        match self {
            EngineError::Upstream { context, source } if EXPOSED_CONTEXTS.contains(context) => {
                Some(source.upstream_body().map_or_else(|| source.to_string(), str::to_string))
            }
            _ => None,
        }
    }
}

/// Contexts whose upstream text is echoed back to the caller.
const EXPOSED_CONTEXTS: &[&str] = &["Failed to create SOS event"];

/// Attach a caller-facing context to store failures.
pub trait StoreResultExt<T> {
    fn or_upstream(self, context: &'static str) -> Result<T>;
}

impl<T> StoreResultExt<T> for std::result::Result<T, StoreError> {
    fn or_upstream(self, context: &'static str) -> Result<T> {
        self.map_err(|source| EngineError::Upstream { context, source })
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
