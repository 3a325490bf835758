//! Caregiver connections.

use serde::Serialize;
use store::{connection, device, sos_event, user, Connection};
use tracing::{info, warn};

use crate::error::{EngineError, Result, StoreResultExt};
use crate::SharedStore;

/// A connection seen from one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionSummary {
    pub other_user_id: String,
    pub other_user_name: String,
    pub other_user_email: String,
    /// The other party's first device, if they have one.
    pub device_id: Option<String>,
    /// `on_at` of their latest SOS event, or `"-"`.
    pub last_sos: String,
}

#[derive(Clone)]
pub struct Connections {
    store: SharedStore,
}

impl Connections {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Connect `user_id` with `other_user_id`.
    pub async fn connect(&self, user_id: &str, other_user_id: &str) -> Result<Connection> {
        if other_user_id.trim().is_empty() {
            return Err(EngineError::Validation("Missing other_user_id".to_string()));
        }
        if other_user_id == user_id {
            return Err(EngineError::Validation(
                "User cannot connect to themselves".to_string(),
            ));
        }

        let created = connection::create_connection(self.store.as_ref(), user_id, other_user_id)
            .await
            .map_err(|err| {
                if err.is_conflict() {
                    EngineError::Conflict("Connection already exists".to_string())
                } else {
                    EngineError::Upstream {
                        context: "Failed to create connection",
                        source: err,
                    }
                }
            })?;

        info!(user_id = %user_id, other_user_id = %other_user_id, "Connection created");
        Ok(created)
    }

    /// Everyone connected to `user_id`, with their latest SOS.
    ///
    /// Parties whose user row cannot be loaded are skipped.
    pub async fn list(&self, user_id: &str) -> Result<Vec<ConnectionSummary>> {
        let store = self.store.as_ref();
        let connections = connection::list_for_user(store, user_id)
            .await
            .or_upstream("Failed to load connections")?;

        let mut summaries = Vec::with_capacity(connections.len());
        for conn in &connections {
            let other_id = conn.other_party(user_id);

            let other = match user::get_user(store, other_id).await {
                Ok(Some(other)) => other,
                Ok(None) => continue,
                Err(err) => {
                    warn!(other_user_id = %other_id, error = %err, "Skipping connection");
                    continue;
                }
            };

            let last_sos = match sos_event::latest_for_user(store, other_id).await {
                Ok(Some(event)) => event.on_at.to_rfc3339(),
                _ => "-".to_string(),
            };
            let device_id = device::first_for_owner(store, other_id)
                .await
                .ok()
                .flatten()
                .map(|d| d.device_id);

            summaries.push(ConnectionSummary {
                other_user_id: other.user_id,
                other_user_name: other.user_name,
                other_user_email: other.user_email,
                device_id,
                last_sos,
            });
        }

        Ok(summaries)
    }
}
