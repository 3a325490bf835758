//! SOS event row operations.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::client::{create, fetch, fetch_first, patch, Store};
use crate::error::Result;
use crate::models::{NewSosEvent, SosEvent};
use crate::query::Query;
use crate::table::Table;

/// Create an event.
pub async fn create_event(store: &dyn Store, event: &NewSosEvent) -> Result<SosEvent> {
    create(store, Table::SosEvent, event).await
}

/// Get an event by ID.
pub async fn get_event(store: &dyn Store, event_id: &str) -> Result<Option<SosEvent>> {
    fetch_first(store, Table::SosEvent, &Query::new().eq("event_id", event_id)).await
}

/// Unhandled events triggered by `user_id`, in store order.
pub async fn unhandled_for_user(store: &dyn Store, user_id: &str) -> Result<Vec<SosEvent>> {
    let query = Query::new().eq("triggered_by", user_id).is("handled", false);
    fetch(store, Table::SosEvent, &query).await
}

/// First unhandled event raised on `device_id`, in store order.
pub async fn unhandled_for_device(store: &dyn Store, device_id: &str) -> Result<Option<SosEvent>> {
    let query = Query::new().eq("device_id", device_id).is("handled", false);
    fetch_first(store, Table::SosEvent, &query).await
}

/// Every unhandled event.
pub async fn list_unhandled(store: &dyn Store) -> Result<Vec<SosEvent>> {
    let query = Query::new().is("handled", false).order_desc("on_at");
    fetch(store, Table::SosEvent, &query).await
}

/// Events triggered by `user_id`, newest first.
pub async fn list_for_user(store: &dyn Store, user_id: &str) -> Result<Vec<SosEvent>> {
    let query = Query::new().eq("triggered_by", user_id).order_desc("on_at");
    fetch(store, Table::SosEvent, &query).await
}

/// Events raised on `device_id`, newest first.
pub async fn list_for_device(store: &dyn Store, device_id: &str) -> Result<Vec<SosEvent>> {
    let query = Query::new().eq("device_id", device_id).order_desc("on_at");
    fetch(store, Table::SosEvent, &query).await
}

/// Most recent event triggered by `user_id`.
pub async fn latest_for_user(store: &dyn Store, user_id: &str) -> Result<Option<SosEvent>> {
    let query = Query::new()
        .eq("triggered_by", user_id)
        .order_desc("on_at")
        .limit(1);
    fetch_first(store, Table::SosEvent, &query).await
}

/// Close an event: stamp `off_at` and mark it handled.
pub async fn close(store: &dyn Store, event_id: &str, off_at: DateTime<Utc>) -> Result<Vec<SosEvent>> {
    patch(
        store,
        Table::SosEvent,
        &Query::new().eq("event_id", event_id),
        json!({ "off_at": off_at, "handled": true }),
    )
    .await
}

/// Close an event on behalf of a responder.
pub async fn resolve(
    store: &dyn Store,
    event_id: &str,
    off_at: DateTime<Utc>,
    handled_by: &str,
) -> Result<Vec<SosEvent>> {
    patch(
        store,
        Table::SosEvent,
        &Query::new().eq("event_id", event_id),
        json!({ "off_at": off_at, "handled": true, "handled_by": handled_by }),
    )
    .await
}

/// Record who is responding without closing the event.
pub async fn set_responder(store: &dyn Store, event_id: &str, handled_by: &str) -> Result<Vec<SosEvent>> {
    patch(
        store,
        Table::SosEvent,
        &Query::new().eq("event_id", event_id),
        json!({ "handled_by": handled_by }),
    )
    .await
}
