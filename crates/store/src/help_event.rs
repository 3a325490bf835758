//! Help event row operations.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::client::{create, fetch_first, patch, Store};
use crate::error::Result;
use crate::models::{HelpEvent, NewHelpEvent};
use crate::query::Query;
use crate::table::Table;

/// Create a help event.
pub async fn create_help(store: &dyn Store, help: &NewHelpEvent) -> Result<HelpEvent> {
    create(store, Table::HelpEvent, help).await
}

/// The active help event on `device_id`, if any.
pub async fn active_for_device(store: &dyn Store, device_id: &str) -> Result<Option<HelpEvent>> {
    let query = Query::new().eq("device_id", device_id).is("active", true);
    fetch_first(store, Table::HelpEvent, &query).await
}

/// Close a help event, recording the closing responder.
pub async fn close(
    store: &dyn Store,
    help_id: &str,
    off_at: DateTime<Utc>,
    handled_by: &str,
) -> Result<Vec<HelpEvent>> {
    patch(
        store,
        Table::HelpEvent,
        &Query::new().eq("help_id", help_id),
        json!({ "active": false, "help_off_at": off_at, "handled_by": handled_by }),
    )
    .await
}

/// Close every active help event on `device_id`.
pub async fn close_all_for_device(
    store: &dyn Store,
    device_id: &str,
    off_at: DateTime<Utc>,
) -> Result<Vec<HelpEvent>> {
    patch(
        store,
        Table::HelpEvent,
        &Query::new().eq("device_id", device_id).is("active", true),
        json!({ "active": false, "help_off_at": off_at }),
    )
    .await
}
