//! Notification row operations.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::client::{create, fetch, patch, Store};
use crate::error::Result;
use crate::models::{NewNotification, Notification};
use crate::query::Query;
use crate::table::Table;

/// Record one notification.
pub async fn create_notification(store: &dyn Store, notification: &NewNotification) -> Result<Notification> {
    create(store, Table::Notification, notification).await
}

/// Notifications addressed to `user_id`, newest first.
pub async fn list_for_user(store: &dyn Store, user_id: &str) -> Result<Vec<Notification>> {
    let query = Query::new().eq("notified_user", user_id).order_desc("sent_at");
    fetch(store, Table::Notification, &query).await
}

/// Notifications emitted for `event_id`, in the order they were sent.
pub async fn list_for_event(store: &dyn Store, event_id: &str) -> Result<Vec<Notification>> {
    let query = Query::new().eq("event_id", event_id).order_asc("sent_at");
    fetch(store, Table::Notification, &query).await
}

/// Stamp `seen_at` on every notification for `event_id`.
pub async fn mark_seen(store: &dyn Store, event_id: &str, seen_at: DateTime<Utc>) -> Result<Vec<Notification>> {
    patch(
        store,
        Table::Notification,
        &Query::new().eq("event_id", event_id),
        json!({ "seen_at": seen_at }),
    )
    .await
}
