//! Store error types.

use thiserror::Error;

use crate::table::Table;

/// Errors that can occur when talking to the data store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A row could not be decoded into its model.
    #[error("failed to decode {table} row: {source}")]
    Decode {
        table: Table,
        #[source]
        source: serde_json::Error,
    },

    /// An insert or patch payload could not be serialized.
    #[error("failed to encode {table} payload: {source}")]
    Encode {
        table: Table,
        #[source]
        source: serde_json::Error,
    },

    /// The store rejected a write because of a uniqueness constraint.
    #[error("{table} conflict: {message}")]
    Conflict { table: Table, message: String },

    /// The store answered with an unexpected status code.
    #[error("{table} request failed with status {status}: {body}")]
    Status {
        table: Table,
        status: u16,
        body: String,
    },

    /// The store returned no rows where one was expected.
    #[error("{table} returned an empty representation")]
    EmptyResponse { table: Table },

    /// The store is unreachable (also used for injected faults).
    #[error("{table} unavailable")]
    Unavailable { table: Table },
}

impl StoreError {
    /// Whether this error is a uniqueness conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }

    /// Upstream diagnostic text, when the store supplied one.
    pub fn upstream_body(&self) -> Option<&str> {
        match self {
            StoreError::Status { body, .. } => Some(body),
            StoreError::Conflict { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
