//! Read-only views over SOS events.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use store::{sos_event, user, SosEvent};

use crate::error::{EngineError, Result, StoreResultExt};
use crate::SharedStore;

/// How to select events for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventFilter {
    TriggeredBy(String),
    Device(String),
    TriggeredEmail(String),
}

impl EventFilter {
    /// Build a filter from exactly one non-blank parameter.
    pub fn from_params(
        triggered_by: Option<String>,
        device_id: Option<String>,
        triggered_email: Option<String>,
    ) -> Result<Self> {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let mut given = [
            present(triggered_by).map(EventFilter::TriggeredBy),
            present(device_id).map(EventFilter::Device),
            present(triggered_email).map(EventFilter::TriggeredEmail),
        ]
        .into_iter()
        .flatten();

        match (given.next(), given.next()) {
            (Some(filter), None) => Ok(filter),
            (None, _) => Err(EngineError::Validation(
                "Missing triggered_by, device_id or triggered_email parameter".to_string(),
            )),
            (Some(_), Some(_)) => Err(EngineError::Validation(
                "Only one of triggered_by, device_id or triggered_email may be given".to_string(),
            )),
        }
    }
}

/// A user with an unhandled SOS event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveSos {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub event_id: String,
    pub device_id: Option<String>,
    pub on_at: DateTime<Utc>,
    pub handled_by: Option<String>,
}

#[derive(Clone)]
pub struct History {
    store: SharedStore,
}

impl History {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Events matching `filter`, newest first.
    pub async fn events(&self, filter: &EventFilter) -> Result<Vec<SosEvent>> {
        let store = self.store.as_ref();

        let events = match filter {
            EventFilter::TriggeredBy(user_id) => sos_event::list_for_user(store, user_id).await,
            EventFilter::Device(device_id) => sos_event::list_for_device(store, device_id).await,
            EventFilter::TriggeredEmail(email) => {
                let found = user::get_user_by_email(store, &email.trim().to_lowercase())
                    .await
                    .or_upstream("Failed to retrieve events")?;
                match found {
                    Some(u) => sos_event::list_for_user(store, &u.user_id).await,
                    None => return Ok(Vec::new()),
                }
            }
        };

        events.or_upstream("Failed to retrieve events")
    }

    /// Every user currently in distress, with their open event.
    pub async fn active(&self) -> Result<Vec<ActiveSos>> {
        let store = self.store.as_ref();

        let events = sos_event::list_unhandled(store)
            .await
            .or_upstream("Failed to fetch active SOS users")?;
        if events.is_empty() {
            return Ok(Vec::new());
        }

        let mut user_ids: Vec<String> = events.iter().map(|e| e.triggered_by.clone()).collect();
        user_ids.sort();
        user_ids.dedup();

        let users: HashMap<String, _> = user::get_users(store, &user_ids)
            .await
            .or_upstream("Failed to fetch users")?
            .into_iter()
            .map(|u| (u.user_id.clone(), u))
            .collect();

        Ok(events
            .into_iter()
            .filter_map(|event| {
                let u = users.get(&event.triggered_by)?;
                Some(ActiveSos {
                    user_id: u.user_id.clone(),
                    user_name: u.user_name.clone(),
                    user_email: u.user_email.clone(),
                    event_id: event.event_id,
                    device_id: event.device_id,
                    on_at: event.on_at,
                    handled_by: event.handled_by,
                })
            })
            .collect())
    }
}
